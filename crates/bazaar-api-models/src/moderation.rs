//! Moderation panel vocabulary and request bodies.
//!
//! # Design
//! - Moderator and admin panels expose the same three boards but disagree on
//!   endpoint layout and body field names; each body shape gets its own
//!   struct so the wire contract is visible at the type level.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::listing::ListingKind;
use crate::status::{ParseLabelError, Role, Status};

/// Decision applied by a moderator or admin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    /// Move a pending entity to active.
    Approve,
    /// Move a pending entity to rejected.
    Reject,
    /// Remove a listing outright; admin listing board only.
    Delete,
}

impl ModerationAction {
    /// Wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }

    /// Past-tense label used in user-facing notices.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Delete => "deleted",
        }
    }

    /// Status an entity lands in once the action succeeds; `None` when the
    /// entity goes away instead.
    #[must_use]
    pub const fn target_status(self) -> Option<Status> {
        match self {
            Self::Approve => Some(Status::Active),
            Self::Reject => Some(Status::Rejected),
            Self::Delete => None,
        }
    }

    /// Notification tag the admin listing endpoint expects with the action.
    #[must_use]
    pub const fn listing_notification(self) -> &'static str {
        match self {
            Self::Approve => "listing_approval",
            Self::Reject | Self::Delete => "listing_rejection",
        }
    }
}

impl Display for ModerationAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ModerationAction {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "delete" => Ok(Self::Delete),
            _ => Err(ParseLabelError {
                kind: "moderation action",
                value: value.to_string(),
            }),
        }
    }
}

/// Which role-gated panel a board belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    /// `api/mod/*` endpoints.
    Moderator,
    /// `api/admin/*` endpoints.
    Admin,
}

impl Panel {
    /// Role needed to use the panel.
    #[must_use]
    pub const fn required_role(self) -> Role {
        match self {
            Self::Moderator => Role::Moderator,
            Self::Admin => Role::Admin,
        }
    }

    /// API path prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Moderator => "api/mod",
            Self::Admin => "api/admin",
        }
    }
}

/// Entity a board moderates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationEntity {
    /// Classified listings.
    Listings,
    /// Interests between users and listings.
    Interests,
    /// User accounts.
    Users,
}

impl ModerationEntity {
    /// Plural path segment and notice noun.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listings => "listings",
            Self::Interests => "interests",
            Self::Users => "users",
        }
    }
}

impl Display for ModerationEntity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Change applied from the admin user board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChange {
    /// Set the account status.
    Status(Status),
    /// Set the account role.
    Role(Role),
}

impl UserChange {
    /// Wire `action` label.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Role(_) => "role",
        }
    }

    /// Wire `value` label.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Status(status) => status.as_str(),
            Self::Role(role) => role.as_str(),
        }
    }
}

/// `POST api/mod/{entity}/bulk-action` and `api/mod/users/bulk-approve-reject`
/// body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModBulkRequest {
    /// Target identifiers.
    pub ids: Vec<String>,
    /// Decision to apply.
    pub action: ModerationAction,
    /// Rejection reason; empty for approvals.
    pub reason: String,
}

/// `POST api/mod/listings/{id}/approve|reject` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModListingDecision {
    /// Target listing.
    pub listing_id: String,
    /// Variant of the target listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingKind>,
    /// Decision to apply.
    pub action: ModerationAction,
    /// Rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body carrying an optional rejection reason (`api/mod/interests/{id}/*`,
/// `api/mod/users/{approve|reject}/{id}`).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReasonBody {
    /// Rejection reason; omitted for approvals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST api/admin/listings/bulk` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminListingsBulk {
    /// Target listings.
    pub listing_ids: Vec<String>,
    /// Decision to apply.
    pub action: ModerationAction,
    /// Notification tag matching `action`.
    pub notification_type: &'static str,
}

impl AdminListingsBulk {
    /// Build the body, deriving the notification tag from `action`.
    #[must_use]
    pub fn new(listing_ids: Vec<String>, action: ModerationAction) -> Self {
        Self {
            listing_ids,
            action,
            notification_type: action.listing_notification(),
        }
    }
}

/// `POST api/admin/interests/bulk` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminInterestsBulk {
    /// Target interests.
    pub interest_ids: Vec<String>,
    /// Decision to apply.
    pub action: ModerationAction,
    /// Rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST api/admin/users/bulk` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUsersBulk {
    /// Target accounts.
    pub user_ids: Vec<String>,
    /// `status` or `role`.
    pub action: &'static str,
    /// New status or role label.
    pub value: &'static str,
}

impl AdminUsersBulk {
    /// Build the body for `change`.
    #[must_use]
    pub fn new(user_ids: Vec<String>, change: UserChange) -> Self {
        Self {
            user_ids,
            action: change.action(),
            value: change.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_labels_and_targets() {
        assert_eq!(ModerationAction::Approve.target_status(), Some(Status::Active));
        assert_eq!(ModerationAction::Delete.target_status(), None);
        assert_eq!(ModerationAction::Reject.past_tense(), "rejected");
        assert_eq!("APPROVE".parse(), Ok(ModerationAction::Approve));
        assert_eq!("delete".parse(), Ok(ModerationAction::Delete));
        assert!("ban".parse::<ModerationAction>().is_err());
    }

    #[test]
    fn admin_listing_bulk_carries_notification_type() {
        let body = AdminListingsBulk::new(vec!["a".into()], ModerationAction::Reject);
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "listingIds": ["a"],
                "action": "reject",
                "notificationType": "listing_rejection"
            })
        );
    }

    #[test]
    fn admin_listing_delete_uses_rejection_notification() {
        let body = AdminListingsBulk::new(vec!["a".into(), "b".into()], ModerationAction::Delete);
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "listingIds": ["a", "b"],
                "action": "delete",
                "notificationType": "listing_rejection"
            })
        );
    }

    #[test]
    fn admin_user_bulk_encodes_role_and_status_changes() {
        let role = AdminUsersBulk::new(vec!["u1".into()], UserChange::Role(Role::Moderator));
        assert_eq!(
            serde_json::to_value(&role).expect("serialize"),
            json!({"userIds": ["u1"], "action": "role", "value": "moderator"})
        );
        let status = AdminUsersBulk::new(vec!["u2".into()], UserChange::Status(Status::Inactive));
        assert_eq!(status.action, "status");
        assert_eq!(status.value, "inactive");
    }

    #[test]
    fn optional_reasons_are_omitted() {
        assert_eq!(
            serde_json::to_value(ReasonBody::default()).expect("serialize"),
            json!({})
        );
        let decision = ModListingDecision {
            listing_id: "l1".into(),
            listing_type: Some(ListingKind::Job),
            action: ModerationAction::Approve,
            reason: None,
        };
        assert_eq!(
            serde_json::to_value(&decision).expect("serialize"),
            json!({"listingId": "l1", "listingType": "job", "action": "approve"})
        );
    }

    #[test]
    fn panels_map_to_prefix_and_role() {
        assert_eq!(Panel::Moderator.prefix(), "api/mod");
        assert_eq!(Panel::Admin.required_role(), Role::Admin);
        assert_eq!(ModerationEntity::Interests.to_string(), "interests");
    }
}
