//! Typed endpoint wrappers, one module per API area.
//!
//! Each module extends [`ApiClient`](crate::http::ApiClient) with the calls
//! for its area. The wrappers only encode requests and decode responses;
//! notices and local state live in the session, board, and inbox types.

pub mod admin;
pub mod auth;
pub mod interests;
pub mod listings;
pub mod moderation;
pub mod notifications;
