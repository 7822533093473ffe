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
#![allow(clippy::multiple_crate_versions)]
//! Client SDK for the Bazaar classifieds marketplace.
//!
//! [`ApiClient`] attaches the persisted bearer token to every request and
//! clears it on a 401. [`SessionContext`] holds the signed-in user and the
//! lists the marketplace pages read from. Moderation boards, the
//! notification inbox, PIN code lookup and route guards are built on top of
//! the same client.
//!
//! Failures surface twice: as a typed [`ApiError`] to the caller, and as a
//! [`Notice`] delivered through the configured [`Notifier`]. Transport
//! failures are announced once by the client itself.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod lists;
pub mod moderation;
pub mod notice;
pub mod notifications;
pub mod pincode;
pub mod session;
pub mod storage;

pub use api::listings::{ListingForm, ListingQuery};
pub use api::moderation::{Board, BoardFilter};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use guard::{Access, AdminPage, Guard, ModeratorPage, Route, Viewer};
pub use http::ApiClient;
pub use lists::{Applied, ResourceList, Ticket};
pub use moderation::{Moderatable, ModerationBoard};
pub use notice::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use notifications::{NotificationInbox, UnreadPoller};
pub use pincode::{PincodeDebouncer, PincodeDetails, PincodeLookup, PincodeResolver};
pub use session::SessionContext;
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
