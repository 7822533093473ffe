//! Indian postal PIN code lookup with input debouncing.
//!
//! # Design
//! - Lookups go to the public postal API, not the marketplace API, so they
//!   skip the bearer token and the 401 handling in [`ApiClient::send`].
//! - The debouncer keeps at most one pending lookup. New input aborts the
//!   pending task before scheduling another, so only the final value of a
//!   burst reaches the network.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, parse_base_url};
use crate::notice::Notice;

/// Digits in a PIN code.
pub const PINCODE_LENGTH: usize = 6;

/// Notice shown when the postal API does not recognise a PIN code.
pub const INVALID_PINCODE_MESSAGE: &str = "Invalid PIN code. Please try again.";

/// Whether `pincode` is exactly six ASCII digits.
#[must_use]
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == PINCODE_LENGTH && pincode.bytes().all(|byte| byte.is_ascii_digit())
}

/// Location derived from a PIN code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PincodeDetails {
    /// Looked-up PIN code.
    pub pincode: String,
    /// State name.
    pub state: String,
    /// District, used as the city.
    pub district: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostalResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PostOffice {
    #[serde(default)]
    state: String,
    #[serde(default)]
    district: String,
}

/// Client for `GET {base}pincode/{pin}`.
#[derive(Debug, Clone)]
pub struct PincodeResolver {
    client: ApiClient,
    base_url: Url,
}

impl PincodeResolver {
    /// Resolver sharing `client`'s connection pool and notifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for a malformed `base_url`.
    pub fn new(client: ApiClient, base_url: &str) -> ApiResult<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Look up `pincode`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for malformed input,
    /// [`ApiError::Rejected`] when the postal API does not know the code, and
    /// [`ApiError::Network`] / [`ApiError::Timeout`] on transport failures.
    pub async fn resolve(&self, pincode: &str) -> ApiResult<PincodeDetails> {
        let pincode = pincode.trim();
        if !is_valid_pincode(pincode) {
            return Err(ApiError::validation("PIN code must be 6 digits"));
        }
        let url = self.base_url.join(&format!("pincode/{pincode}"))?;
        tracing::debug!(pincode, "pincode lookup dispatched");
        let response = self
            .client
            .http()
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &bytes));
        }
        let body: Vec<PostalResponse> = serde_json::from_slice(&bytes)?;
        body.into_iter()
            .next()
            .filter(|entry| entry.status.eq_ignore_ascii_case("success"))
            .and_then(|entry| entry.post_office)
            .and_then(|offices| offices.into_iter().next())
            .map(|office| PincodeDetails {
                pincode: pincode.to_string(),
                state: office.state,
                district: office.district,
            })
            .ok_or_else(|| ApiError::Rejected {
                message: Some(INVALID_PINCODE_MESSAGE.to_string()),
            })
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network {
            detail: err.to_string(),
        }
    }
}

/// State of the debounced lookup as seen by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PincodeLookup {
    /// Input is incomplete; state and district are cleared.
    #[default]
    Idle,
    /// A lookup for this PIN code is scheduled or in flight.
    Pending(String),
    /// The lookup succeeded.
    Resolved(PincodeDetails),
    /// The lookup failed with this user-facing message.
    Failed(String),
}

/// Debounces PIN code input and publishes lookup results.
#[derive(Debug)]
pub struct PincodeDebouncer {
    resolver: Arc<PincodeResolver>,
    delay: Duration,
    sender: Arc<watch::Sender<PincodeLookup>>,
    pending: Option<JoinHandle<()>>,
}

impl PincodeDebouncer {
    /// Debouncer waiting `delay` after the last keystroke.
    #[must_use]
    pub fn new(resolver: PincodeResolver, delay: Duration) -> Self {
        let (sender, _) = watch::channel(PincodeLookup::Idle);
        Self {
            resolver: Arc::new(resolver),
            delay,
            sender: Arc::new(sender),
            pending: None,
        }
    }

    /// Receiver observing every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PincodeLookup> {
        self.sender.subscribe()
    }

    /// Current lookup state.
    #[must_use]
    pub fn current(&self) -> PincodeLookup {
        self.sender.borrow().clone()
    }

    /// Feed the latest field value.
    ///
    /// Anything other than six digits cancels the pending lookup and clears
    /// the derived fields. Must be called from within a tokio runtime.
    pub fn input(&mut self, value: &str) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let pincode = value.trim().to_string();
        if !is_valid_pincode(&pincode) {
            self.sender.send_replace(PincodeLookup::Idle);
            return;
        }
        self.sender
            .send_replace(PincodeLookup::Pending(pincode.clone()));

        let resolver = Arc::clone(&self.resolver);
        let sender = Arc::clone(&self.sender);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let next = match resolver.resolve(&pincode).await {
                Ok(details) => PincodeLookup::Resolved(details),
                Err(err) => {
                    tracing::warn!(pincode = %pincode, error = %err, "pincode lookup failed");
                    let message = err.user_message(INVALID_PINCODE_MESSAGE);
                    resolver.client.notify(Notice::error(message.clone()));
                    PincodeLookup::Failed(message)
                }
            };
            sender.send_replace(next);
        }));
    }
}

impl Drop for PincodeDebouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
