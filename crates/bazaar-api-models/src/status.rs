//! Normalised lifecycle status and account role.
//!
//! # Design
//! - One `Status` enum covers listings, interests, and user accounts; the
//!   server spells the "approved" state three ways and all of them land on
//!   [`Status::Active`].
//! - Endpoint-specific spellings are produced by dedicated label helpers
//!   instead of leaking wire strings into callers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status shared by listings, interests, and accounts.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Awaiting a moderation decision.
    #[default]
    Pending,
    /// Approved / accepted and visible.
    #[serde(alias = "approved", alias = "accepted")]
    Active,
    /// Rejected by a moderator, admin, or listing owner.
    Rejected,
    /// Deactivated by its owner (soft delete).
    Inactive,
    /// Account suspended by an admin.
    Suspended,
    /// Label this client does not know; keeps one odd row from failing a page.
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Every status a caller can ask for, in display order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Active,
        Self::Rejected,
        Self::Inactive,
        Self::Suspended,
    ];

    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Unknown => "unknown",
        }
    }

    /// Spelling expected by the owner-side interest respond endpoint.
    #[must_use]
    pub const fn interest_label(self) -> &'static str {
        match self {
            Self::Active => "accepted",
            other => other.as_str(),
        }
    }

    /// Spelling expected by the moderator interest queue filter.
    #[must_use]
    pub const fn approval_label(self) -> &'static str {
        match self {
            Self::Active => "approved",
            other => other.as_str(),
        }
    }

    /// Whether a client-initiated action may move `self` to `next`.
    ///
    /// `pending -> active | rejected` is a moderation decision and
    /// `active -> inactive` is an owner deactivation; nothing else is legal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active | Self::Rejected) | (Self::Active, Self::Inactive)
        )
    }

    /// Whether no further client-side transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Inactive | Self::Suspended)
    }
}

impl Display for Status {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Raised when a status or role label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    /// Which enumeration failed to parse.
    pub kind: &'static str,
    /// Offending input.
    pub value: String,
}

impl FromStr for Status {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" | "approved" | "accepted" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseLabelError {
                kind: "status",
                value: value.to_string(),
            }),
        }
    }
}

/// Status filter applied to list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No status restriction.
    #[default]
    All,
    /// Restrict to a single status.
    Only(Status),
}

impl StatusFilter {
    /// Query-string value using canonical labels.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    /// Whether `status` passes the filter.
    #[must_use]
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }
}

/// Account role controlling access to the moderation panels.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular marketplace user.
    #[default]
    User,
    /// Moderator with access to the moderation panel.
    Moderator,
    /// Administrator with access to every panel.
    Admin,
}

impl Role {
    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Route a freshly authenticated user lands on.
    #[must_use]
    pub const fn landing_route(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Moderator => "/moderator",
            Self::User => "/",
        }
    }

    /// Whether this role grants everything `required` grants.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseLabelError {
                kind: "role",
                value: value.to_string(),
            }),
        }
    }
}
