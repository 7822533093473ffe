//! Listing endpoints under `api/listings`.

use std::path::PathBuf;

use bazaar_api_models::{Ack, Envelope, Listing, ListingKind, MyListings, Page};
use reqwest::Method;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ensure_success, file_part, require_data, text_form};

/// Page and filter parameters for browsing one listing variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// One-based page.
    pub page: u32,
    /// Page size, when the caller wants to override the server default.
    pub limit: Option<u32>,
    /// Extra filters in insertion order (`minAge`, `religion`, ...).
    pub filters: Vec<(String, String)>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: None,
            filters: Vec::new(),
        }
    }
}

impl ListingQuery {
    /// Query for `page` with no filters.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    /// Add a filter; blank values are skipped.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.filters.push((key.into(), value));
        }
        self
    }

    /// Add a `min<Name>` / `max<Name>` pair.
    #[must_use]
    pub fn range(self, name: &str, min: impl ToString, max: impl ToString) -> Self {
        self.filter(format!("min{name}"), min.to_string())
            .filter(format!("max{name}"), max.to_string())
    }

    /// Add a multi-valued filter joined with commas.
    #[must_use]
    pub fn any_of<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|value| value.as_ref().trim().to_string())
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(key, joined)
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("page".to_string(), self.page.to_string())];
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// Text fields and image files for posting or editing an ad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    /// Text fields in submission order.
    pub fields: Vec<(String, String)>,
    /// Image files uploaded under the `images` field.
    pub images: Vec<PathBuf>,
}

impl ListingForm {
    /// Add a text field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Attach an image.
    #[must_use]
    pub fn image(mut self, path: impl Into<PathBuf>) -> Self {
        self.images.push(path.into());
        self
    }

    async fn into_multipart(self, accept_terms: bool) -> ApiResult<reqwest::multipart::Form> {
        let mut form = text_form(
            self.fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        if accept_terms {
            form = form.text("termsAccepted", "true");
        }
        for image in &self.images {
            form = form.part("images", file_part(image).await?);
        }
        Ok(form)
    }
}

impl ApiClient {
    /// `GET api/listings/{kind}` with paging and filters.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn browse_listings(
        &self,
        kind: ListingKind,
        query: &ListingQuery,
    ) -> ApiResult<Page<Listing>> {
        let body: Value = self
            .get_query(&format!("api/listings/{kind}"), &query.pairs())
            .await?;
        ensure_body_success(&body)?;
        Ok(Page::from_body(body, "listings", query.page)?)
    }

    /// `GET api/listings/{kind}/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the payload is missing.
    pub async fn listing(&self, kind: ListingKind, id: &str) -> ApiResult<Listing> {
        let envelope: Envelope<Listing> = self.get(&format!("api/listings/{kind}/{id}")).await?;
        let mut listing = require_data(envelope)?;
        listing.kind = listing.kind.or(Some(kind));
        Ok(listing)
    }

    /// `GET api/listings/search?state=&query=`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when either term is blank, otherwise
    /// propagates transport, HTTP, and decode failures.
    pub async fn search_listings(&self, state: &str, query: &str) -> ApiResult<Vec<Listing>> {
        let (state, query) = (state.trim(), query.trim());
        if state.is_empty() || query.is_empty() {
            return Err(ApiError::validation(
                "Please select a state and enter a search term",
            ));
        }
        let body: Value = self
            .get_query("api/listings/search", &[("state", state), ("query", query)])
            .await?;
        ensure_body_success(&body)?;
        Ok(Page::<Listing>::from_body(body, "listings", 1)?.items)
    }

    /// `POST api/listings/{kind}` as multipart; terms are always accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] when an image cannot be read, otherwise
    /// propagates transport and HTTP failures.
    pub async fn post_listing(&self, kind: ListingKind, form: ListingForm) -> ApiResult<Ack> {
        let form = form.into_multipart(true).await?;
        let ack: Ack = self
            .send_form(Method::POST, &format!("api/listings/{kind}"), form)
            .await?;
        ensure_success(ack)
    }

    /// `PUT api/listings/{kind}/{id}` as multipart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] when an image cannot be read, otherwise
    /// propagates transport and HTTP failures.
    pub async fn update_listing(
        &self,
        kind: ListingKind,
        id: &str,
        form: ListingForm,
    ) -> ApiResult<Ack> {
        let form = form.into_multipart(false).await?;
        let ack: Ack = self
            .send_form(Method::PUT, &format!("api/listings/{kind}/{id}"), form)
            .await?;
        ensure_success(ack)
    }

    /// `DELETE api/listings/{kind}/{id}` (owner soft delete).
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP failures.
    pub async fn deactivate_listing(&self, kind: ListingKind, id: &str) -> ApiResult<Ack> {
        let ack: Ack = self.delete(&format!("api/listings/{kind}/{id}")).await?;
        ensure_success(ack)
    }

    /// `GET api/listings/my-listings`, grouped by variant.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn my_listings(&self) -> ApiResult<MyListings> {
        let envelope: Envelope<MyListings> = self.get("api/listings/my-listings").await?;
        Ok(ensure_success(envelope)?.data.unwrap_or_default())
    }
}

/// Reject list bodies whose envelope reports `success: false`.
pub(crate) fn ensure_body_success(body: &Value) -> ApiResult<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected {
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    Ok(())
}
