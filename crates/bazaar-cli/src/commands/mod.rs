//! Command handlers grouped by concern.

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod interests;
pub(crate) mod listings;
pub(crate) mod moderation;
pub(crate) mod notifications;
pub(crate) mod pincode;
