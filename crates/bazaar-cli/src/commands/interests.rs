use serde_json::json;

use crate::cli::{ExpressArgs, InterestCommand, RespondArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render, render_interests};

pub(crate) async fn handle(ctx: &mut AppContext, command: InterestCommand) -> CliResult<()> {
    ctx.require_token()?;
    match command {
        InterestCommand::Express(args) => handle_express(ctx, args).await,
        InterestCommand::Check(args) => {
            let shown = ctx.client().has_shown_interest(args.listing_id.trim()).await?;
            render(
                ctx.output,
                &json!({ "listingId": args.listing_id, "hasShownInterest": shown }),
                || {
                    if shown {
                        "interest already shown".to_string()
                    } else {
                        "no interest shown yet".to_string()
                    }
                },
            )
        }
        InterestCommand::Sent => {
            ctx.session.refresh_session_lists().await;
            failed_list(ctx.session.sent_interests().last_error(), "sent")?;
            render_interests(ctx.session.sent_interests().items(), ctx.output)
        }
        InterestCommand::Received => {
            ctx.session.refresh_session_lists().await;
            failed_list(ctx.session.received_interests().last_error(), "received")?;
            render_interests(ctx.session.received_interests().items(), ctx.output)
        }
        InterestCommand::Respond(args) => handle_respond(ctx, args).await,
    }
}

fn failed_list(error: Option<&str>, which: &str) -> CliResult<()> {
    error.map_or(Ok(()), |error| {
        Err(CliError::failure(anyhow::anyhow!(
            "failed to load {which} interests: {error}"
        )))
    })
}

async fn handle_express(ctx: &mut AppContext, args: ExpressArgs) -> CliResult<()> {
    let listing_id = args.listing_id.trim();
    if listing_id.is_empty() {
        return Err(CliError::validation("listing id must not be empty"));
    }
    ctx.session
        .express_interest(listing_id, args.kind, &args.message)
        .await?;
    render_interests(ctx.session.sent_interests().items(), ctx.output)
}

async fn handle_respond(ctx: &mut AppContext, args: RespondArgs) -> CliResult<()> {
    ctx.session.refresh_session_lists().await;
    let id = args.interest_id.trim();
    ctx.session
        .respond_to_interest(id, args.decision.into(), args.message)
        .await?;
    render_interests(ctx.session.received_interests().items(), ctx.output)
}
