//! Interest endpoints under `api/interests`.

use bazaar_api_models::{
    Ack, ExpressInterestRequest, Interest, InterestCheckResponse, InterestDecision, ListingKind,
    Page, RespondRequest,
};
use serde_json::Value;

use crate::api::listings::ensure_body_success;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ensure_success};

impl ApiClient {
    /// `POST api/interests`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn express_interest(
        &self,
        listing_id: &str,
        kind: ListingKind,
        message: &str,
    ) -> ApiResult<Ack> {
        let request = ExpressInterestRequest {
            listing_id: listing_id.to_string(),
            listing_type: kind,
            message: message.to_string(),
        };
        let ack: Ack = self.post_json("api/interests", &request).await?;
        ensure_success(ack)
    }

    /// `GET api/interests/check?listingId=&userId=`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when no user id is known.
    pub async fn has_shown_interest(&self, listing_id: &str) -> ApiResult<bool> {
        let user_id = self
            .store()
            .user_id()
            .ok_or_else(|| ApiError::validation("Sign in to check interest status"))?;
        let response: InterestCheckResponse = self
            .get_query(
                "api/interests/check",
                &[("listingId", listing_id), ("userId", user_id.as_str())],
            )
            .await?;
        Ok(response.has_shown_interest)
    }

    /// `GET api/interests/sent`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn sent_interests(&self) -> ApiResult<Page<Interest>> {
        self.interest_page("api/interests/sent").await
    }

    /// `GET api/interests/received`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn received_interests(&self) -> ApiResult<Page<Interest>> {
        self.interest_page("api/interests/received").await
    }

    /// `PUT api/interests/{id}/respond`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn respond_to_interest(
        &self,
        interest_id: &str,
        decision: InterestDecision,
        reply: Option<String>,
    ) -> ApiResult<Ack> {
        let body = RespondRequest::new(decision, reply);
        let ack: Ack = self
            .put_json(&format!("api/interests/{interest_id}/respond"), &body)
            .await?;
        ensure_success(ack)
    }

    async fn interest_page(&self, path: &str) -> ApiResult<Page<Interest>> {
        let body: Value = self.get(path).await?;
        ensure_body_success(&body)?;
        Ok(Page::from_body(body, "interests", 1)?)
    }
}
