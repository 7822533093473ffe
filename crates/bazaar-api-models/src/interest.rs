//! Interests expressed by users toward listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::null_as_default;
use crate::listing::{ListingKind, ListingRef};
use crate::status::Status;
use crate::user::UserRef;

/// A user's expressed intent toward a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "InterestWire")]
pub struct Interest {
    /// Server identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Target listing, populated or bare.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingRef>,
    /// Variant of the target listing.
    #[serde(rename = "listingType", skip_serializing_if = "Option::is_none")]
    pub listing_kind: Option<ListingKind>,
    /// User who expressed the interest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserRef>,
    /// Owner of the target listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserRef>,
    /// Message attached by the sender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Reply attached by the owner or a moderator.
    #[serde(rename = "responseMessage", skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    /// Normalised status.
    pub status: Status,
    /// Creation timestamp.
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Interest {
    /// Identifier of the target listing, when known.
    #[must_use]
    pub fn listing_id(&self) -> Option<&str> {
        self.listing.as_ref().map(ListingRef::id)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterestWire {
    #[serde(rename = "_id", default)]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    listing: Option<ListingRef>,
    #[serde(default)]
    listing_type: Option<String>,
    #[serde(default)]
    sender: Option<UserRef>,
    #[serde(default)]
    receiver: Option<UserRef>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    response_message: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: Status,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<InterestWire> for Interest {
    fn from(wire: InterestWire) -> Self {
        Self {
            id: wire.underscore_id.or(wire.id).unwrap_or_default(),
            listing: wire.listing,
            listing_kind: wire
                .listing_type
                .as_deref()
                .and_then(|label| label.parse().ok()),
            sender: wire.sender,
            receiver: wire.receiver,
            message: wire.message,
            response_message: wire.response_message.or(wire.reason),
            status: wire.status,
            created_at: wire.created_at,
        }
    }
}

/// `POST api/interests` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpressInterestRequest {
    /// Target listing.
    pub listing_id: String,
    /// Variant of the target listing.
    pub listing_type: ListingKind,
    /// Free-form note to the owner.
    pub message: String,
}

/// Owner decision on a received interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestDecision {
    /// Accept the interest.
    Accept,
    /// Reject the interest.
    Reject,
}

impl InterestDecision {
    /// Status the interest ends up in.
    #[must_use]
    pub const fn target_status(self) -> Status {
        match self {
            Self::Accept => Status::Active,
            Self::Reject => Status::Rejected,
        }
    }

    /// Default reply sent alongside the decision.
    #[must_use]
    pub const fn default_reply(self) -> &'static str {
        match self {
            Self::Accept => "Accepted by user",
            Self::Reject => "Rejected by user",
        }
    }
}

/// `PUT api/interests/{id}/respond` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    /// `accepted` or `rejected`.
    pub status: &'static str,
    /// Reply shown to the sender.
    pub response_message: String,
}

impl RespondRequest {
    /// Build the body for `decision`, using the default reply when `reply` is
    /// absent.
    #[must_use]
    pub fn new(decision: InterestDecision, reply: Option<String>) -> Self {
        Self {
            status: decision.target_status().interest_label(),
            response_message: reply.unwrap_or_else(|| decision.default_reply().to_string()),
        }
    }
}

/// `GET api/interests/check` response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterestCheckResponse {
    /// Whether the user already expressed interest in the listing.
    #[serde(default)]
    pub has_shown_interest: bool,
}
