//! Shared context, error types, and notice rendering for the CLI.

use std::fmt::{self, Display, Formatter};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use bazaar_client::{
    ApiClient, ApiError, ClientConfig, FileSessionStore, Notice, NoticeLevel, Notifier,
    SessionContext, SessionStore,
};

use crate::cli::OutputFormat;

/// Default session file name, relative to the home directory.
pub(crate) const SESSION_FILE_NAME: &str = ".bazaar-session.json";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { message } => Self::Validation(message),
            other => Self::Failure(other.into()),
        }
    }
}

/// Writes notices to stderr so stdout stays clean for rendered output.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = notice.level.as_str(), "notice emitted");
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Warning | NoticeLevel::Error => eprintln!("{notice}"),
        }
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) config: ClientConfig,
    pub(crate) session: SessionContext,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    pub(crate) fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let client = ApiClient::new(&config, store, notifier)
            .map_err(|err| CliError::failure(anyhow!("failed to build API client: {err}")))?;
        Ok(Self {
            config,
            session: SessionContext::new(client),
            output,
        })
    }

    /// Context backed by the session file at `path` and console notices.
    pub(crate) fn with_session_file(
        config: ClientConfig,
        path: &Path,
        output: OutputFormat,
    ) -> CliResult<Self> {
        Self::new(
            config,
            Arc::new(FileSessionStore::new(path)),
            Arc::new(ConsoleNotifier),
            output,
        )
    }

    pub(crate) const fn client(&self) -> &ApiClient {
        self.session.client()
    }

    /// Fail early for commands that need a signed-in user.
    pub(crate) fn require_token(&self) -> CliResult<()> {
        if self.client().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::validation(
                "not signed in (run `bazaar auth login` first)",
            ))
        }
    }
}

/// Session file used when neither the flag nor the environment names one.
pub(crate) fn default_session_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from(SESSION_FILE_NAME), |home| {
            PathBuf::from(home).join(SESSION_FILE_NAME)
        })
}

/// Use `provided`, or prompt without echo when attached to a terminal.
pub(crate) fn resolve_secret(provided: Option<String>, prompt: &str) -> CliResult<String> {
    if let Some(value) = provided {
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        let secret = rpassword::prompt_password(prompt).map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if secret.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(secret)
    } else {
        Err(CliError::validation(
            "password required; supply via --password when running non-interactively",
        ))
    }
}

/// Split `key=value` arguments.
pub(crate) fn parse_pair(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{input}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
