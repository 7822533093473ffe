//! Bearer-token HTTP client shared by every API call.
//!
//! # Design
//! - The token is read from the [`SessionStore`] on every request, so a
//!   session written by one component is visible to all others.
//! - A 401 clears the persisted session unless the failing call was the login
//!   call itself.
//! - Transport failures (no response, timeout) are announced here once; call
//!   sites only announce HTTP-level failures.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bazaar_api_models::Envelope;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, NETWORK_ERROR_MESSAGE, TIMEOUT_MESSAGE};
use crate::notice::{Notice, Notifier};
use crate::storage::SessionStore;

/// Header carrying a per-request correlation id.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

const LOGIN_PATH: &str = "api/auth/login";

/// Cloneable handle to the API; clones share the connection pool, the
/// session store, and the notifier.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for a malformed base URL and
    /// [`ApiError::Network`] when the HTTP client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Network {
                detail: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            store,
            notifier,
        })
    }

    /// API origin.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying reqwest client, for calls to third-party origins.
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    /// Persisted session store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// Whether a bearer token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Deliver a notice to the user.
    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Announce a failed operation.
    ///
    /// Transport failures were already announced when they happened and are
    /// skipped; everything else shows the server's message or `fallback`.
    pub fn report(&self, error: &ApiError, fallback: &str) {
        if !error.is_transport() {
            self.notify(Notice::error(error.user_message(fallback)));
        }
    }

    /// Resolve a relative endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// `GET` and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::GET, path, |request| request).await
    }

    /// `GET` with query parameters and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |request| request.query(query))
            .await
    }

    /// `POST` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |request| request.json(body))
            .await
    }

    /// `PUT` a JSON body and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, |request| request.json(body))
            .await
    }

    /// `DELETE` and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::DELETE, path, |request| request).await
    }

    /// Send a multipart form with `method` and decode.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> ApiResult<T> {
        self.send(method, path, |request| request.multipart(form))
            .await
    }

    /// Issue a request against the API and decode its body.
    ///
    /// Attaches the bearer token and a fresh request id, then lets `build`
    /// add the body or query. An empty success body decodes as `{}`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] / [`ApiError::Timeout`] when no response
    ///   arrived (the user is notified here).
    /// - [`ApiError::Unauthorized`], [`ApiError::Client`],
    ///   [`ApiError::Server`] for non-success statuses.
    /// - [`ApiError::Decode`] when the body does not match `T`.
    pub async fn send<T, F>(&self, method: Method, path: &str, build: F) -> ApiResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(path)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(HEADER_REQUEST_ID, Uuid::new_v4().to_string());
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        let request = build(request);

        tracing::debug!(%method, path, "request dispatched");
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(&method, path, &err)),
        };
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.transport_failure(&method, path, &err)),
        };
        tracing::debug!(%method, path, status = status.as_u16(), "response received");

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16(), &bytes);
            if status == StatusCode::UNAUTHORIZED && !path.contains(LOGIN_PATH) {
                self.invalidate_session(path);
            }
            return Err(error);
        }
        decode_body(&bytes)
    }

    fn transport_failure(&self, method: &Method, path: &str, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            tracing::warn!(%method, path, error = %err, "request timed out");
            self.notify(Notice::error(TIMEOUT_MESSAGE));
            ApiError::Timeout
        } else {
            tracing::warn!(%method, path, error = %err, "request failed without a response");
            self.notify(Notice::error(NETWORK_ERROR_MESSAGE));
            ApiError::Network {
                detail: err.to_string(),
            }
        }
    }

    fn invalidate_session(&self, path: &str) {
        tracing::warn!(path, "unauthorized response; clearing persisted session");
        if let Err(err) = self.store.clear() {
            tracing::error!(error = %err, "failed to clear persisted session");
        }
    }
}

/// Parse `raw` as the API origin, ensuring a trailing slash so relative
/// joins append instead of replacing the last segment.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUrl`] when `raw` is not an absolute URL.
pub fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::from_value(Value::Object(serde_json::Map::new()))?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Fail when a 2xx envelope reports `success: false`.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] carrying the envelope's message.
pub fn ensure_success<T>(envelope: Envelope<T>) -> ApiResult<Envelope<T>> {
    if envelope.success {
        Ok(envelope)
    } else {
        Err(ApiError::Rejected {
            message: envelope.message,
        })
    }
}

/// Unwrap the `data` payload of a successful envelope.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] for `success: false` or a missing payload.
pub fn require_data<T>(envelope: Envelope<T>) -> ApiResult<T> {
    let envelope = ensure_success(envelope)?;
    envelope.data.ok_or(ApiError::Rejected {
        message: envelope
            .message
            .or_else(|| Some("response carried no data".to_string())),
    })
}

/// Multipart form with text fields in order.
#[must_use]
pub fn text_form<'a, I>(fields: I) -> Form
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.to_string(), value.to_string())
        })
}

/// Read `path` into a multipart file part.
///
/// # Errors
///
/// Returns [`ApiError::File`] when the file cannot be read.
pub async fn file_part(path: &Path) -> ApiResult<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    let part = Part::bytes(bytes).file_name(name);
    match mime_for(path) {
        Some(mime) => part.mime_str(mime).map_err(|err| ApiError::Network {
            detail: format!("invalid content type '{mime}': {err}"),
        }),
        None => Ok(part),
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
