//! Server-generated notifications addressed to the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::listing::{ListingKind, ListingRef};

/// Notification category tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Two parties showed mutual interest.
    InterestMatched,
    /// A service request was accepted.
    ServiceRequest,
    /// A matrimony profile matched.
    ProfileMatched,
    /// An ad passed moderation.
    AdApproved,
    /// An ad was rejected by moderation.
    AdRejected,
    /// Someone showed interest in a product.
    ProductInterest,
    /// Someone applied to a job.
    JobInterest,
    /// Listing approval sent from the admin panel.
    ListingApproval,
    /// Listing rejection sent from the admin panel.
    ListingRejection,
    /// A tag this client does not know about.
    Other(String),
}

impl NotificationKind {
    /// Wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InterestMatched => "interest_matched",
            Self::ServiceRequest => "service_request",
            Self::ProfileMatched => "profile_matched",
            Self::AdApproved => "ad_approved",
            Self::AdRejected => "ad_rejected",
            Self::ProductInterest => "product_interest",
            Self::JobInterest => "job_interest",
            Self::ListingApproval => "listing_approval",
            Self::ListingRejection => "listing_rejection",
            Self::Other(tag) => tag,
        }
    }

    /// Heading shown above the notification message.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::InterestMatched => "Interest Matched".to_string(),
            Self::ServiceRequest => "Service request accepted".to_string(),
            Self::ProfileMatched => "Profile Matched".to_string(),
            Self::AdApproved => "Ad Approved".to_string(),
            Self::AdRejected => "Ad Rejected".to_string(),
            Self::ProductInterest => "Product Interest".to_string(),
            Self::JobInterest => "Job Application".to_string(),
            Self::ListingApproval | Self::ListingRejection | Self::Other(_) => {
                title_case(self.as_str())
            }
        }
    }
}

fn title_case(tag: &str) -> String {
    let words: Vec<String> = tag
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect();
    if words.is_empty() {
        "Notification".to_string()
    } else {
        words.join(" ")
    }
}

impl From<&str> for NotificationKind {
    fn from(tag: &str) -> Self {
        match tag {
            "interest_matched" => Self::InterestMatched,
            "service_request" => Self::ServiceRequest,
            "profile_matched" => Self::ProfileMatched,
            "ad_approved" => Self::AdApproved,
            "ad_rejected" => Self::AdRejected,
            "product_interest" => Self::ProductInterest,
            "job_interest" => Self::JobInterest,
            "listing_approval" => Self::ListingApproval,
            "listing_rejection" => Self::ListingRejection,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Self::from(tag.as_str()))
    }
}

/// A notification row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "NotificationWire")]
pub struct Notification {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Category tag.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Server-provided title, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text.
    pub message: String,
    /// Whether the user has seen it.
    pub read: bool,
    /// Item the notification is about.
    #[serde(rename = "relatedItem", skip_serializing_if = "Option::is_none")]
    pub related_item: Option<ListingRef>,
    /// Variant of `related_item`.
    #[serde(rename = "relatedItemType", skip_serializing_if = "Option::is_none")]
    pub related_kind: Option<ListingKind>,
    /// Creation timestamp.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Server title when present, otherwise the kind's title.
    #[must_use]
    pub fn heading(&self) -> String {
        self.title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| self.kind.title())
    }

    /// Client route the notification points at.
    #[must_use]
    pub fn link(&self) -> Option<String> {
        let item = self.related_item.as_ref()?;
        Some(self.related_kind?.detail_route(item.id()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationWire {
    #[serde(rename = "_id", default)]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "unknown_kind")]
    kind: NotificationKind,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    read: Option<bool>,
    #[serde(default)]
    related_item: Option<ListingRef>,
    #[serde(default)]
    related_item_type: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

fn unknown_kind() -> NotificationKind {
    NotificationKind::Other(String::new())
}

impl From<NotificationWire> for Notification {
    fn from(wire: NotificationWire) -> Self {
        Self {
            id: wire.underscore_id.or(wire.id).unwrap_or_default(),
            kind: wire.kind,
            title: wire.title,
            message: wire.message.unwrap_or_default(),
            read: wire.read.unwrap_or(false),
            related_item: wire.related_item,
            related_kind: wire
                .related_item_type
                .as_deref()
                .and_then(|label| label.parse().ok()),
            created_at: wire.created_at,
        }
    }
}

/// `PUT api/notifications/mark-read` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    /// Notifications to flag as read.
    pub notification_ids: Vec<String>,
}

/// `GET api/notifications/count` response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    /// Unread notifications.
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_kinds_have_fixed_titles() {
        assert_eq!(NotificationKind::JobInterest.title(), "Job Application");
        assert_eq!(
            NotificationKind::ServiceRequest.title(),
            "Service request accepted"
        );
        assert_eq!(
            NotificationKind::from("listing_approval").title(),
            "Listing Approval"
        );
        assert_eq!(
            NotificationKind::from("price_drop_alert").title(),
            "Price Drop Alert"
        );
        assert_eq!(NotificationKind::from("").title(), "Notification");
    }

    #[test]
    fn notification_links_to_related_listing() {
        let notification: Notification = serde_json::from_value(json!({
            "_id": "n1",
            "type": "ad_approved",
            "message": "Your ad is live",
            "relatedItem": {"_id": "l4", "title": "Lamp"},
            "relatedItemType": "service"
        }))
        .expect("notification");
        assert!(!notification.read);
        assert_eq!(notification.kind, NotificationKind::AdApproved);
        assert_eq!(notification.heading(), "Ad Approved");
        assert_eq!(notification.link().as_deref(), Some("/serviceDetail/l4"));
    }

    #[test]
    fn notification_without_related_item_has_no_link() {
        let notification: Notification = serde_json::from_value(json!({
            "_id": "n2",
            "type": "something_new",
            "title": "Custom",
            "read": true
        }))
        .expect("notification");
        assert_eq!(notification.kind, NotificationKind::Other("something_new".into()));
        assert_eq!(notification.heading(), "Custom");
        assert!(notification.link().is_none());
    }

    #[test]
    fn mark_read_request_uses_camel_case() {
        let request = MarkReadRequest {
            notification_ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({"notificationIds": ["a", "b"]})
        );
    }
}
