//! Error types for telemetry operations.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed, usually because one is
    /// already installed.
    #[error("failed to install tracing subscriber: {source}")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// The log format label was not recognised.
    #[error("unknown log format '{value}' (expected 'json' or 'pretty')")]
    UnknownFormat {
        /// Rejected label.
        value: String,
    },
}
