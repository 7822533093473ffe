//! Response envelopes and server-side pagination metadata.
//!
//! The API wraps most payloads as `{ success, data, message }`, but list
//! endpoints disagree on where the rows and the page counters live. [`Page`]
//! absorbs those variations in one place.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Standard `{ success, data, message }` response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    /// Server-reported outcome; absent means the HTTP status is authoritative.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Payload when present.
    pub data: Option<T>,
    /// Human-readable message accompanying the response.
    #[serde(default)]
    pub message: Option<String>,
}

const fn default_success() -> bool {
    true
}

/// Body-less acknowledgement returned by mutating endpoints.
pub type Ack = Envelope<Value>;

/// One page of rows plus the server's pagination counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Total number of pages reported by the server (at least 1).
    pub total_pages: u32,
    /// Total number of rows across all pages.
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
            total: 0,
        }
    }
}

impl<T> Page<T> {
    /// Whether the page carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Extract a page from a raw response body.
    ///
    /// Rows are read from `data` when it is an array, from `data.<collection>`
    /// when `data` is an object, or from the body itself when the body is an
    /// array. Counters come from the top-level `totalPages` / `total` /
    /// `totalListings` / `currentPage` fields or `data.pagination`, trusting
    /// the server verbatim; `requested_page` fills in when neither is present.
    ///
    /// # Errors
    ///
    /// Returns an error when the located rows do not deserialize as `T`.
    pub fn from_body(
        body: Value,
        collection: &str,
        requested_page: u32,
    ) -> Result<Self, serde_json::Error> {
        let pagination = body
            .get("data")
            .and_then(|data| data.get("pagination"))
            .cloned()
            .unwrap_or(Value::Null);

        let total_pages = read_u64(&body, "totalPages")
            .or_else(|| read_u64(&pagination, "pages"))
            .map_or(1, |pages| u32::try_from(pages).unwrap_or(u32::MAX))
            .max(1);
        let page = read_u64(&body, "currentPage")
            .or_else(|| read_u64(&pagination, "page"))
            .map_or(requested_page, |page| {
                u32::try_from(page).unwrap_or(requested_page)
            })
            .max(1);
        let reported_total = read_u64(&pagination, "total")
            .or_else(|| read_u64(&body, "total"))
            .or_else(|| read_u64(&body, "totalListings"));

        let rows = match body {
            Value::Array(rows) => Value::Array(rows),
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(rows)) => Value::Array(rows),
                Some(Value::Object(mut data)) => {
                    data.remove(collection).unwrap_or(Value::Array(Vec::new()))
                }
                _ => Value::Array(Vec::new()),
            },
            _ => Value::Array(Vec::new()),
        };
        let rows = if rows.is_null() {
            Value::Array(Vec::new())
        } else {
            rows
        };

        let items: Vec<T> = serde_json::from_value(rows)?;
        let total = reported_total.unwrap_or(items.len() as u64);
        Ok(Self {
            items,
            page,
            total_pages,
            total,
        })
    }
}

fn read_u64(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(|field| match field {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Deserialize a field that may be `null`, substituting `T::default()`.
///
/// # Errors
///
/// Propagates the inner deserializer's error for malformed values.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize an optional string that the server sometimes sends as a number.
///
/// # Errors
///
/// Returns an error for values that are neither strings, numbers, nor null.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        name: String,
    }

    #[test]
    fn envelope_defaults_success_when_absent() {
        let envelope: Envelope<Vec<Row>> =
            serde_json::from_value(json!({"data": [{"name": "a"}]})).expect("envelope");
        assert!(envelope.success);
        assert_eq!(envelope.data.map(|rows| rows.len()), Some(1));

        let failed: Ack = serde_json::from_value(json!({"success": false, "message": "nope"}))
            .expect("ack");
        assert!(!failed.success);
        assert_eq!(failed.message.as_deref(), Some("nope"));
    }

    #[test]
    fn envelope_without_data_needs_no_default_payload() {
        let envelope: Envelope<crate::listing::Listing> =
            serde_json::from_value(json!({"success": true, "message": "gone"})).expect("envelope");
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("gone"));
    }

    #[test]
    fn page_reads_flat_data_with_top_level_counters() {
        let body = json!({
            "success": true,
            "data": [{"name": "a"}, {"name": "b"}],
            "totalPages": 4,
            "total": 31,
            "currentPage": 2
        });
        let page = Page::<Row>::from_body(body, "listings", 1).expect("page");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.total, 31);
    }

    #[test]
    fn page_reads_nested_collection_and_pagination() {
        let body = json!({
            "success": true,
            "data": {
                "listings": [{"name": "a"}],
                "pagination": {"pages": 3, "total": 21}
            }
        });
        let page = Page::<Row>::from_body(body, "listings", 3).expect("page");
        assert_eq!(page.items, vec![Row { name: "a".into() }]);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 21);
    }

    #[test]
    fn page_defaults_when_counters_missing() {
        let page = Page::<Row>::from_body(json!({"data": null}), "users", 1).expect("page");
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total, 0);

        let bare = Page::<Row>::from_body(json!([{"name": "x"}]), "users", 1).expect("page");
        assert_eq!(bare.total, 1);
    }

    #[test]
    fn page_rejects_malformed_rows() {
        let body = json!({"data": [{"title": "missing name"}]});
        assert!(Page::<Row>::from_body(body, "listings", 1).is_err());
    }
}
