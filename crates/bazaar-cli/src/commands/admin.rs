use anyhow::{Context, anyhow};
use bazaar_api_models::SystemConfig;

use crate::cli::{AdminCommand, SystemConfigCommand, SystemConfigSetArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    render_admin_dashboard, render_analytics, render_mod_dashboard, render_system_config,
};

pub(crate) async fn handle(ctx: &mut AppContext, command: AdminCommand) -> CliResult<()> {
    ctx.require_token()?;
    match command {
        AdminCommand::ModDashboard => {
            let stats = ctx.client().mod_dashboard().await?;
            render_mod_dashboard(&stats, ctx.output)
        }
        AdminCommand::Dashboard => {
            let stats = ctx.client().admin_dashboard().await?;
            render_admin_dashboard(&stats, ctx.output)
        }
        AdminCommand::Analytics => {
            let overview = ctx.client().analytics_overview().await?;
            render_analytics(&overview, ctx.output)
        }
        AdminCommand::Config(SystemConfigCommand::Get) => {
            let config = ctx.client().system_config().await?;
            render_system_config(&config, ctx.output)
        }
        AdminCommand::Config(SystemConfigCommand::Set(args)) => handle_config_set(ctx, args).await,
    }
}

async fn handle_config_set(ctx: &AppContext, args: SystemConfigSetArgs) -> CliResult<()> {
    let payload = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))
        .map_err(CliError::failure)?;
    let config: SystemConfig = serde_json::from_str(&payload)
        .map_err(|err| CliError::failure(anyhow!("system config file is not valid JSON: {err}")))?;
    ctx.client().update_system_config(&config).await?;
    let saved = ctx.client().system_config().await?;
    render_system_config(&saved, ctx.output)
}
