//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use bazaar_api_models::{InterestDecision, ListingKind, ModerationAction, Role, Status, StatusFilter};
use bazaar_client::ClientConfig;
use bazaar_client::config::{DEFAULT_BASE_URL, ENV_BASE_URL, ENV_TIMEOUT_SECS};
use bazaar_telemetry::{LogFormat, LoggingConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::{AppContext, CliResult, default_session_path, parse_pair};
use crate::commands::{admin, auth, interests, listings, moderation, notifications, pincode};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Parses CLI arguments, executes the requested command, and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(&cli);

    let command = command_label(&cli.command);
    let result = execute(cli).await;
    match result {
        Ok(()) => {
            tracing::debug!(command, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn init_logging(cli: &Cli) {
    let format = cli.log_format.map_or_else(LogFormat::infer, LogFormat::from);
    let config = LoggingConfig {
        level: &cli.log_level,
        format,
        ..LoggingConfig::default()
    };
    if let Err(err) = bazaar_telemetry::init_logging(&config) {
        eprintln!("warning: {err}");
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let config = cli.client_config();
    let session_file = cli.session_file.clone().unwrap_or_else(default_session_path);
    let mut ctx = AppContext::with_session_file(config, &session_file, cli.output)?;
    dispatch(&mut ctx, cli.command).await
}

pub(crate) async fn dispatch(ctx: &mut AppContext, command: Command) -> CliResult<()> {
    match command {
        Command::Auth(command) => auth::handle(ctx, command).await,
        Command::Listings(command) => listings::handle(ctx, command).await,
        Command::Interests(command) => interests::handle(ctx, command).await,
        Command::Moderation(args) => moderation::handle(ctx, args).await,
        Command::Admin(command) => admin::handle(ctx, command).await,
        Command::Notifications(command) => notifications::handle(ctx, command).await,
        Command::Pincode(args) => pincode::handle(ctx, args).await,
        Command::Route(args) => auth::handle_route(ctx, args).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Auth(_) => "auth",
        Command::Listings(_) => "listings",
        Command::Interests(_) => "interests",
        Command::Moderation(_) => "moderation",
        Command::Admin(_) => "admin",
        Command::Notifications(_) => "notifications",
        Command::Pincode(_) => "pincode",
        Command::Route(_) => "route",
    }
}

#[derive(Parser)]
#[command(name = "bazaar", about = "Command-line client for the Bazaar marketplace")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = ENV_BASE_URL,
        default_value = DEFAULT_BASE_URL
    )]
    pub(crate) api_url: String,
    #[arg(
        long,
        global = true,
        env = ENV_TIMEOUT_SECS,
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "BAZAAR_PINCODE_URL",
        help = "Override the postal lookup origin"
    )]
    pub(crate) pincode_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = "BAZAAR_SESSION_FILE",
        help = "Where the bearer token is persisted (defaults to ~/.bazaar-session.json)"
    )]
    pub(crate) session_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "BAZAAR_LOG_LEVEL",
        default_value = bazaar_telemetry::DEFAULT_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "BAZAAR_LOG_FORMAT", value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_base_url(self.api_url.trim());
        config.timeout = Duration::from_secs(self.timeout.max(1));
        if let Some(url) = self.pincode_url.as_deref() {
            config.pincode_base_url = url.trim().to_string();
        }
        config
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[command(subcommand)]
    Auth(AuthCommand),
    #[command(subcommand)]
    Listings(ListingCommand),
    #[command(subcommand)]
    Interests(InterestCommand),
    Moderation(ModerationArgs),
    #[command(subcommand)]
    Admin(AdminCommand),
    #[command(subcommand)]
    Notifications(NotificationCommand),
    Pincode(PincodeArgs),
    /// Check whether the current session may open a client route.
    Route(RouteArgs),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum AuthCommand {
    Login(LoginArgs),
    Register(RegisterArgs),
    VerifyOtp(VerifyOtpArgs),
    Logout,
    Profile,
    UpdateProfile(UpdateProfileArgs),
    ChangePassword(ChangePasswordArgs),
    UploadImage(UploadImageArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "BAZAAR_PASSWORD")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) first_name: String,
    #[arg(long)]
    pub(crate) last_name: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) phone: String,
    #[arg(long, default_value = "")]
    pub(crate) gender: String,
    #[arg(long)]
    pub(crate) pincode: String,
    #[arg(long, help = "State; looked up from the PIN code when omitted")]
    pub(crate) state: Option<String>,
    #[arg(long, help = "City; looked up from the PIN code when omitted")]
    pub(crate) city: Option<String>,
    #[arg(long)]
    pub(crate) password: Option<String>,
    #[arg(long)]
    pub(crate) confirm_password: Option<String>,
}

#[derive(Args)]
pub(crate) struct VerifyOtpArgs {
    #[arg(long)]
    pub(crate) user_id: String,
    #[arg(help = "Six-digit code sent during registration")]
    pub(crate) otp: String,
}

#[derive(Args)]
pub(crate) struct UpdateProfileArgs {
    #[arg(
        long = "field",
        value_parser = parse_pair,
        help = "Profile field as name=value (repeatable)"
    )]
    pub(crate) fields: Vec<(String, String)>,
    #[arg(long)]
    pub(crate) image: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ChangePasswordArgs {
    #[arg(long)]
    pub(crate) old_password: Option<String>,
    #[arg(long)]
    pub(crate) new_password: Option<String>,
}

#[derive(Args)]
pub(crate) struct UploadImageArgs {
    pub(crate) path: PathBuf,
}

#[derive(Args)]
pub(crate) struct RouteArgs {
    #[arg(help = "Client path such as /admin/users or /productDetail/42")]
    pub(crate) path: String,
}

#[derive(Subcommand)]
pub(crate) enum ListingCommand {
    Browse(BrowseArgs),
    Show(ListingRefArgs),
    Search(SearchArgs),
    Post(PostArgs),
    Edit(EditArgs),
    Deactivate(ListingRefArgs),
    Mine,
}

#[derive(Args)]
pub(crate) struct BrowseArgs {
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: ListingKind,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    #[arg(long)]
    pub(crate) limit: Option<u32>,
    #[arg(
        long = "filter",
        value_parser = parse_pair,
        help = "Server-side filter as name=value, e.g. religion=Hindu (repeatable)"
    )]
    pub(crate) filters: Vec<(String, String)>,
}

#[derive(Args)]
pub(crate) struct ListingRefArgs {
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: ListingKind,
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    #[arg(long)]
    pub(crate) state: String,
    #[arg(long)]
    pub(crate) query: String,
}

#[derive(Args)]
pub(crate) struct PostArgs {
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: ListingKind,
    #[arg(long = "field", value_parser = parse_pair, help = "Ad field as name=value (repeatable)")]
    pub(crate) fields: Vec<(String, String)>,
    #[arg(long = "image", help = "Image file to attach (repeatable)")]
    pub(crate) images: Vec<PathBuf>,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: ListingKind,
    pub(crate) id: String,
    #[arg(long = "field", value_parser = parse_pair)]
    pub(crate) fields: Vec<(String, String)>,
    #[arg(long = "image")]
    pub(crate) images: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum InterestCommand {
    Express(ExpressArgs),
    Check(CheckArgs),
    Sent,
    Received,
    Respond(RespondArgs),
}

#[derive(Args)]
pub(crate) struct ExpressArgs {
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: ListingKind,
    pub(crate) listing_id: String,
    #[arg(long, default_value = "")]
    pub(crate) message: String,
}

#[derive(Args)]
pub(crate) struct CheckArgs {
    pub(crate) listing_id: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum DecisionArg {
    Accept,
    Reject,
}

impl From<DecisionArg> for InterestDecision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Accept => Self::Accept,
            DecisionArg::Reject => Self::Reject,
        }
    }
}

#[derive(Args)]
pub(crate) struct RespondArgs {
    pub(crate) interest_id: String,
    #[arg(value_enum)]
    pub(crate) decision: DecisionArg,
    #[arg(long)]
    pub(crate) message: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PanelArg {
    #[value(alias = "mod")]
    Moderator,
    Admin,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum EntityArg {
    Listings,
    Interests,
    Users,
}

#[derive(Args)]
pub(crate) struct ModerationArgs {
    #[arg(value_enum)]
    pub(crate) panel: PanelArg,
    #[arg(value_enum)]
    pub(crate) entity: EntityArg,
    #[command(subcommand)]
    pub(crate) action: ModerationCommand,
}

#[derive(Args)]
pub(crate) struct BoardArgs {
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    #[arg(long, value_parser = parse_status_filter, help = "pending, active, rejected, inactive, suspended or all")]
    pub(crate) status: Option<StatusFilter>,
    #[arg(long = "type", value_parser = parse_kind)]
    pub(crate) kind: Option<ListingKind>,
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: Option<Role>,
}

#[derive(Subcommand)]
pub(crate) enum ModerationCommand {
    /// List one page of the board.
    List(BoardArgs),
    /// Approve rows by id; `--all` selects every actionable row on the page.
    Approve(DecisionTargets),
    /// Reject rows by id; `--all` selects every actionable row on the page.
    Reject(DecisionTargets),
    /// Admin listing board only: delete rows by id or `--all` on the page.
    Delete(DecisionTargets),
    /// Admin user board only: set the account status.
    SetStatus(SetStatusArgs),
    /// Admin user board only: set the account role.
    SetRole(SetRoleArgs),
}

#[derive(Args)]
pub(crate) struct DecisionTargets {
    pub(crate) ids: Vec<String>,
    #[arg(long, conflicts_with = "ids")]
    pub(crate) all: bool,
    #[arg(long)]
    pub(crate) reason: Option<String>,
    #[command(flatten)]
    pub(crate) board: BoardArgs,
}

#[derive(Args)]
pub(crate) struct SetStatusArgs {
    #[arg(value_parser = parse_status)]
    pub(crate) status: Status,
    #[arg(required = true)]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct SetRoleArgs {
    #[arg(value_parser = parse_role)]
    pub(crate) role: Role,
    #[arg(required = true)]
    pub(crate) ids: Vec<String>,
}

impl ModerationCommand {
    pub(crate) const fn decision(&self) -> Option<(ModerationAction, &DecisionTargets)> {
        match self {
            Self::Approve(targets) => Some((ModerationAction::Approve, targets)),
            Self::Reject(targets) => Some((ModerationAction::Reject, targets)),
            Self::Delete(targets) => Some((ModerationAction::Delete, targets)),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum AdminCommand {
    /// Moderator dashboard counts.
    ModDashboard,
    /// Admin dashboard counts.
    Dashboard,
    /// Listing, user, and interest trends.
    Analytics,
    #[command(subcommand)]
    Config(SystemConfigCommand),
}

#[derive(Subcommand)]
pub(crate) enum SystemConfigCommand {
    Get,
    Set(SystemConfigSetArgs),
}

#[derive(Args)]
pub(crate) struct SystemConfigSetArgs {
    #[arg(short = 'f', long = "file", help = "JSON document with the full system config")]
    pub(crate) file: PathBuf,
}

#[derive(Subcommand)]
pub(crate) enum NotificationCommand {
    List,
    Count,
    Read(ReadArgs),
    Cleanup,
    /// Poll the unread count until interrupted.
    Watch(WatchArgs),
}

#[derive(Args)]
pub(crate) struct ReadArgs {
    #[arg(required_unless_present = "all")]
    pub(crate) ids: Vec<String>,
    #[arg(long, conflicts_with = "ids")]
    pub(crate) all: bool,
}

#[derive(Args)]
pub(crate) struct WatchArgs {
    #[arg(long, help = "Seconds between polls (defaults to 60)")]
    pub(crate) interval_secs: Option<u64>,
    #[arg(long, help = "Stop after this many changes")]
    pub(crate) limit: Option<usize>,
}

#[derive(Args)]
pub(crate) struct PincodeArgs {
    pub(crate) pincode: String,
}

fn parse_kind(input: &str) -> Result<ListingKind, String> {
    input.parse().map_err(|err| format!("{err}"))
}

fn parse_role(input: &str) -> Result<Role, String> {
    input.parse().map_err(|err| format!("{err}"))
}

fn parse_status(input: &str) -> Result<Status, String> {
    input.parse().map_err(|err| format!("{err}"))
}

fn parse_status_filter(input: &str) -> Result<StatusFilter, String> {
    input.parse().map_err(|err| format!("{err}"))
}
