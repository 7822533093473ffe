//! Client configuration.
//!
//! # Design
//! - Defaults match the hosted deployment's local development setup.
//! - Environment parsing goes through a lookup closure so tests never mutate
//!   process-wide state.

use std::time::Duration;

use crate::error::ApiError;

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002/";
/// Default postal lookup origin.
pub const DEFAULT_PINCODE_BASE_URL: &str = "https://api.postalpincode.in/";
/// Environment variable overriding the API origin.
pub const ENV_BASE_URL: &str = "BAZAAR_BASE_URL";
/// Environment variable overriding the request timeout (seconds).
pub const ENV_TIMEOUT_SECS: &str = "BAZAAR_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_PINCODE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Runtime settings shared by every client component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin; relative endpoint paths are joined onto it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Interval between unread-notification polls.
    pub poll_interval: Duration,
    /// Quiet period before a pincode lookup fires.
    pub pincode_debounce: Duration,
    /// Postal lookup origin.
    pub pincode_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            pincode_debounce: DEFAULT_PINCODE_DEBOUNCE,
            pincode_base_url: DEFAULT_PINCODE_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration targeting `base_url` with default timings.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the timeout is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the timeout is not a positive
    /// integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or_else(|| {
                    ApiError::validation(format!(
                        "{ENV_TIMEOUT_SECS} must be a positive number of seconds, got '{raw}'"
                    ))
                })?;
            config.timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }
}
