#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the Bazaar classifieds API.
//!
//! The client crate and the CLI both encode requests and decode responses
//! through these types so the wire contract lives in one place. Decoding is
//! deliberately lenient: the API sends ids as `_id` or `id`, numbers as
//! strings, and spells the approved state three different ways. All of that
//! is normalised here before callers see it.

pub mod admin;
pub mod envelope;
pub mod interest;
pub mod listing;
pub mod moderation;
pub mod notification;
pub mod status;
pub mod user;

pub use admin::{
    AdminDashboard, AnalyticsOverview, EntityCounts, ListingStats, ModDashboard, SystemConfig,
    TrendPoint,
};
pub use envelope::{Ack, Envelope, Page};
pub use interest::{
    ExpressInterestRequest, Interest, InterestCheckResponse, InterestDecision, RespondRequest,
};
pub use listing::{Listing, ListingKind, ListingRef, Location, MyListings};
pub use moderation::{
    AdminInterestsBulk, AdminListingsBulk, AdminUsersBulk, ModBulkRequest, ModListingDecision,
    ModerationAction, ModerationEntity, Panel, ReasonBody, UserChange,
};
pub use notification::{MarkReadRequest, Notification, NotificationKind, UnreadCount};
pub use status::{ParseLabelError, Role, Status, StatusFilter};
pub use user::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    RegisterResponse, User, UserRef, VerifyOtpRequest, VerifyOtpResponse,
};
