//! Notification endpoints under `api/notifications`.

use bazaar_api_models::{Ack, MarkReadRequest, Notification, Page, UnreadCount};
use serde_json::Value;

use crate::api::listings::ensure_body_success;
use crate::error::ApiResult;
use crate::http::{ApiClient, ensure_success};

impl ApiClient {
    /// `GET api/notifications`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn notifications(&self) -> ApiResult<Vec<Notification>> {
        let body: Value = self.get("api/notifications").await?;
        ensure_body_success(&body)?;
        Ok(Page::from_body(body, "notifications", 1)?.items)
    }

    /// `GET api/notifications/count`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let count: UnreadCount = self.get("api/notifications/count").await?;
        Ok(count.count)
    }

    /// `PUT api/notifications/mark-read`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn mark_notifications_read(&self, ids: Vec<String>) -> ApiResult<Ack> {
        let body = MarkReadRequest {
            notification_ids: ids,
        };
        let ack: Ack = self.put_json("api/notifications/mark-read", &body).await?;
        ensure_success(ack)
    }

    /// `DELETE api/notifications/cleanup`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn cleanup_notifications(&self) -> ApiResult<Ack> {
        let ack: Ack = self.delete("api/notifications/cleanup").await?;
        ensure_success(ack)
    }
}
