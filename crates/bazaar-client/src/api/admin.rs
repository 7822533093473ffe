//! Dashboards, analytics, and site configuration.

use bazaar_api_models::{
    Ack, AdminDashboard, AnalyticsOverview, Envelope, ModDashboard, SystemConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::listings::ensure_body_success;
use crate::error::ApiResult;
use crate::http::{ApiClient, ensure_success, require_data};

impl ApiClient {
    /// `GET api/mod/dashboard`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn mod_dashboard(&self) -> ApiResult<ModDashboard> {
        let envelope: Envelope<ModDashboard> = self.get("api/mod/dashboard").await?;
        Ok(ensure_success(envelope)?.data.unwrap_or_default())
    }

    /// `GET api/admin/dashboard`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Rejected`] when the payload is missing.
    pub async fn admin_dashboard(&self) -> ApiResult<AdminDashboard> {
        let envelope: Envelope<AdminDashboard> = self.get("api/admin/dashboard").await?;
        require_data(envelope)
    }

    /// `GET api/admin/analytics/overview`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn analytics_overview(&self) -> ApiResult<AnalyticsOverview> {
        let body: Value = self.get("api/admin/analytics/overview").await?;
        unwrap_payload(body)
    }

    /// `GET api/admin/system-config`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn system_config(&self) -> ApiResult<SystemConfig> {
        let body: Value = self.get("api/admin/system-config").await?;
        unwrap_payload(body)
    }

    /// `PUT api/admin/system-config`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn update_system_config(&self, config: &SystemConfig) -> ApiResult<Ack> {
        let ack: Ack = self.put_json("api/admin/system-config", config).await?;
        ensure_success(ack)
    }
}

/// Decode a payload that may or may not be wrapped in `{success, data}`.
fn unwrap_payload<T: DeserializeOwned>(mut body: Value) -> ApiResult<T> {
    ensure_body_success(&body)?;
    let payload = match body.get_mut("data") {
        Some(data) if data.is_object() => data.take(),
        _ => body,
    };
    Ok(serde_json::from_value(payload)?)
}
