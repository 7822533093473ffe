//! Moderator (`api/mod/*`) and admin (`api/admin/*`) board endpoints.
//!
//! # Design
//! - Both panels expose listing, interest, and user boards. A [`Board`] names
//!   one of the six and owns the path and query layout for it, so callers
//!   never assemble moderation URLs by hand.
//! - Single-row decisions on admin boards go through the bulk endpoint with a
//!   one-element id list; the admin API has no per-row route.

use bazaar_api_models::{
    Ack, AdminInterestsBulk, AdminListingsBulk, AdminUsersBulk, ListingKind, ModBulkRequest,
    ModListingDecision, ModerationAction, ModerationEntity, Page, Panel, ReasonBody, Role, Status,
    StatusFilter, UserChange,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::listings::ensure_body_success;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, ensure_success};

/// One moderation board: a panel plus the entity it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Panel the board lives on.
    pub panel: Panel,
    /// Entity the board moderates.
    pub entity: ModerationEntity,
}

impl Board {
    /// Every board, moderator panel first.
    pub const ALL: [Self; 6] = [
        Self::new(Panel::Moderator, ModerationEntity::Listings),
        Self::new(Panel::Moderator, ModerationEntity::Interests),
        Self::new(Panel::Moderator, ModerationEntity::Users),
        Self::new(Panel::Admin, ModerationEntity::Listings),
        Self::new(Panel::Admin, ModerationEntity::Interests),
        Self::new(Panel::Admin, ModerationEntity::Users),
    ];

    /// Board for `entity` on `panel`.
    #[must_use]
    pub const fn new(panel: Panel, entity: ModerationEntity) -> Self {
        Self { panel, entity }
    }

    /// List endpoint path.
    #[must_use]
    pub fn path(self) -> String {
        format!("{}/{}", self.panel.prefix(), self.entity)
    }

    /// Filter a freshly opened board starts with.
    ///
    /// Moderator queues open on pending rows; admin boards show everything.
    #[must_use]
    pub const fn default_filter(self) -> BoardFilter {
        let status = match self.panel {
            Panel::Moderator => StatusFilter::Only(Status::Pending),
            Panel::Admin => StatusFilter::All,
        };
        BoardFilter {
            status,
            kind: None,
            role: None,
        }
    }

    /// Whether role and status overrides are available on this board.
    #[must_use]
    pub fn allows_user_changes(self) -> bool {
        self == Self::new(Panel::Admin, ModerationEntity::Users)
    }

    /// Whether rows can be deleted outright from this board.
    #[must_use]
    pub fn allows_delete(self) -> bool {
        self == Self::new(Panel::Admin, ModerationEntity::Listings)
    }

    /// Refuse `action` when the board has no route for it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a delete outside the admin listing
    /// board.
    pub fn check_action(self, action: ModerationAction) -> ApiResult<()> {
        if action == ModerationAction::Delete && !self.allows_delete() {
            return Err(ApiError::validation(format!(
                "{} cannot be deleted from the {} panel",
                self.entity,
                self.panel.prefix()
            )));
        }
        Ok(())
    }

    fn query(self, page: u32, filter: &BoardFilter) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", page.max(1).to_string())];
        match (self.panel, self.entity) {
            (Panel::Moderator, ModerationEntity::Listings) => {
                query.push(("status", filter.status.as_query().to_string()));
                if let Some(kind) = filter.kind {
                    query.push(("type", kind.as_str().to_string()));
                }
            }
            (Panel::Moderator, ModerationEntity::Interests) => {
                let status = match filter.status {
                    StatusFilter::All => "all",
                    StatusFilter::Only(status) => status.approval_label(),
                };
                query.push(("status", status.to_string()));
                if let Some(kind) = filter.kind {
                    query.push(("type", kind.discriminator().to_string()));
                }
            }
            (Panel::Moderator, ModerationEntity::Users) => {
                query.push(("status", filter.status.as_query().to_string()));
            }
            (Panel::Admin, ModerationEntity::Listings) => {
                let kind = filter.kind.map_or("all", ListingKind::as_str);
                query.push(("type", kind.to_string()));
                query.push(("status", filter.status.as_query().to_string()));
            }
            (Panel::Admin, ModerationEntity::Interests) => {
                query.push(("status", filter.status.as_query().to_string()));
            }
            (Panel::Admin, ModerationEntity::Users) => {
                query.push(("role", filter.role.map_or("all", Role::as_str).to_string()));
                if let StatusFilter::Only(status) = filter.status {
                    query.push(("status", status.as_str().to_string()));
                }
            }
        }
        query
    }
}

/// Filters applied to a board's list query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardFilter {
    /// Status restriction.
    pub status: StatusFilter,
    /// Listing variant restriction (listing and interest boards).
    pub kind: Option<ListingKind>,
    /// Role restriction (admin user board).
    pub role: Option<Role>,
}

impl ApiClient {
    /// Fetch one page of `board`.
    ///
    /// # Errors
    ///
    /// Propagates transport, HTTP, and decode failures.
    pub async fn moderation_page<T: DeserializeOwned>(
        &self,
        board: Board,
        page: u32,
        filter: &BoardFilter,
    ) -> ApiResult<Page<T>> {
        let body: Value = self
            .get_query(&board.path(), &board.query(page, filter))
            .await?;
        ensure_body_success(&body)?;
        Ok(Page::from_body(body, board.entity.as_str(), page)?)
    }

    /// Apply `action` to every id in one request.
    ///
    /// On the admin user board approve and reject become status changes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty id list or an action the
    /// board does not offer, otherwise propagates transport and HTTP failures.
    pub async fn moderate(
        &self,
        board: Board,
        ids: Vec<String>,
        action: ModerationAction,
        reason: Option<String>,
    ) -> ApiResult<Ack> {
        board.check_action(action)?;
        if ids.is_empty() {
            return Err(ApiError::validation(format!("No {} selected", board.entity)));
        }
        let reason = reason.filter(|text| !text.trim().is_empty());
        tracing::info!(
            panel = board.panel.prefix(),
            entity = board.entity.as_str(),
            action = action.as_str(),
            count = ids.len(),
            "bulk moderation requested"
        );
        let ack: Ack = match (board.panel, board.entity) {
            (Panel::Moderator, ModerationEntity::Users) => {
                let body = ModBulkRequest {
                    ids,
                    action,
                    reason: reason.unwrap_or_default(),
                };
                self.post_json("api/mod/users/bulk-approve-reject", &body)
                    .await?
            }
            (Panel::Moderator, entity) => {
                let body = ModBulkRequest {
                    ids,
                    action,
                    reason: reason.unwrap_or_default(),
                };
                self.post_json(&format!("api/mod/{entity}/bulk-action"), &body)
                    .await?
            }
            (Panel::Admin, ModerationEntity::Listings) => {
                let body = AdminListingsBulk::new(ids, action);
                self.post_json("api/admin/listings/bulk", &body).await?
            }
            (Panel::Admin, ModerationEntity::Interests) => {
                let body = AdminInterestsBulk {
                    interest_ids: ids,
                    action,
                    reason: reason.filter(|_| action == ModerationAction::Reject),
                };
                self.post_json("api/admin/interests/bulk", &body).await?
            }
            (Panel::Admin, ModerationEntity::Users) => {
                let status = action.target_status().ok_or_else(|| {
                    ApiError::validation(format!("users cannot be {}", action.past_tense()))
                })?;
                let body = AdminUsersBulk::new(ids, UserChange::Status(status));
                self.post_json("api/admin/users/bulk", &body).await?
            }
        };
        ensure_success(ack)
    }

    /// Apply `action` to a single row.
    ///
    /// `kind` is forwarded to the moderator listing route, which needs the
    /// listing variant.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an action the board does not
    /// offer, otherwise propagates transport and HTTP failures.
    pub async fn moderate_one(
        &self,
        board: Board,
        id: &str,
        kind: Option<ListingKind>,
        action: ModerationAction,
        reason: Option<String>,
    ) -> ApiResult<Ack> {
        board.check_action(action)?;
        let reason = reason
            .filter(|text| !text.trim().is_empty())
            .filter(|_| action == ModerationAction::Reject);
        let ack: Ack = match (board.panel, board.entity) {
            (Panel::Moderator, ModerationEntity::Listings) => {
                let body = ModListingDecision {
                    listing_id: id.to_string(),
                    listing_type: kind,
                    action,
                    reason,
                };
                self.post_json(&format!("api/mod/listings/{id}/{action}"), &body)
                    .await?
            }
            (Panel::Moderator, ModerationEntity::Interests) => {
                self.post_json(
                    &format!("api/mod/interests/{id}/{action}"),
                    &ReasonBody { reason },
                )
                .await?
            }
            (Panel::Moderator, ModerationEntity::Users) => {
                self.post_json(
                    &format!("api/mod/users/{action}/{id}"),
                    &ReasonBody { reason },
                )
                .await?
            }
            (Panel::Admin, _) => {
                return self
                    .moderate(board, vec![id.to_string()], action, reason)
                    .await;
            }
        };
        ensure_success(ack)
    }

    /// `POST api/admin/users/bulk` with a role or status override.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty id list, otherwise
    /// propagates transport and HTTP failures.
    pub async fn change_users(&self, ids: Vec<String>, change: UserChange) -> ApiResult<Ack> {
        if ids.is_empty() {
            return Err(ApiError::validation("No users selected"));
        }
        tracing::info!(
            action = change.action(),
            value = change.value(),
            count = ids.len(),
            "user change requested"
        );
        let body = AdminUsersBulk::new(ids, change);
        let ack: Ack = self.post_json("api/admin/users/bulk", &body).await?;
        ensure_success(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::notice::MemoryNotifier;
    use crate::storage::{MemorySessionStore, StoredSession};
    use bazaar_api_models::{Interest, Listing, User};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(
            &ClientConfig::with_base_url(server.base_url()),
            Arc::new(MemorySessionStore::with_session(StoredSession::new(
                "mod-token",
                Some("m1".into()),
            ))),
            Arc::new(MemoryNotifier::new()),
        )
        .expect("client")
    }

    const MOD_LISTINGS: Board = Board::new(Panel::Moderator, ModerationEntity::Listings);
    const MOD_INTERESTS: Board = Board::new(Panel::Moderator, ModerationEntity::Interests);
    const MOD_USERS: Board = Board::new(Panel::Moderator, ModerationEntity::Users);
    const ADMIN_LISTINGS: Board = Board::new(Panel::Admin, ModerationEntity::Listings);
    const ADMIN_USERS: Board = Board::new(Panel::Admin, ModerationEntity::Users);

    #[test]
    fn interest_queue_uses_approval_spelling() {
        let filter = BoardFilter {
            status: StatusFilter::Only(Status::Active),
            kind: Some(ListingKind::Job),
            role: None,
        };
        assert_eq!(
            MOD_INTERESTS.query(2, &filter),
            vec![
                ("page", "2".to_string()),
                ("status", "approved".to_string()),
                ("type", "JobListing".to_string()),
            ]
        );
    }

    #[test]
    fn admin_boards_send_all_when_unfiltered() {
        let filter = ADMIN_LISTINGS.default_filter();
        assert_eq!(
            ADMIN_LISTINGS.query(1, &filter),
            vec![
                ("page", "1".to_string()),
                ("type", "all".to_string()),
                ("status", "all".to_string()),
            ]
        );
        assert_eq!(
            ADMIN_USERS.query(1, &ADMIN_USERS.default_filter()),
            vec![("page", "1".to_string()), ("role", "all".to_string())]
        );
        assert_eq!(
            MOD_USERS.default_filter().status,
            StatusFilter::Only(Status::Pending)
        );
        assert!(ADMIN_USERS.allows_user_changes());
        assert!(!MOD_USERS.allows_user_changes());
    }

    #[tokio::test]
    async fn mod_listing_page_reads_nested_pagination() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/mod/listings")
                .query_param("page", "1")
                .query_param("status", "pending")
                .query_param("type", "product");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "listings": [{"_id": "l1", "title": "Bike", "status": "pending"}],
                    "pagination": {"page": 1, "pages": 4, "total": 31}
                }
            }));
        });
        let filter = BoardFilter {
            kind: Some(ListingKind::Product),
            ..MOD_LISTINGS.default_filter()
        };
        let page: Page<Listing> = client(&server)
            .moderation_page(MOD_LISTINGS, 1, &filter)
            .await
            .expect("page");
        mock.assert();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.total, 31);
    }

    #[tokio::test]
    async fn mod_user_queue_decodes_users_collection() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/mod/users");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"users": [{"_id": "u1", "email": "a@example.com"}]}
            }));
        });
        let page: Page<User> = client(&server)
            .moderation_page(MOD_USERS, 1, &MOD_USERS.default_filter())
            .await
            .expect("page");
        assert_eq!(page.items[0].id, "u1");
    }

    #[tokio::test]
    async fn bulk_approve_sends_one_request_with_every_id() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/mod/listings/bulk-action")
                .header("authorization", "Bearer mod-token")
                .json_body(json!({"ids": ["a", "b", "c"], "action": "approve", "reason": ""}));
            then.status(200).json_body(json!({"success": true}));
        });
        client(&server)
            .moderate(
                MOD_LISTINGS,
                vec!["a".into(), "b".into(), "c".into()],
                ModerationAction::Approve,
                None,
            )
            .await
            .expect("bulk");
        mock.assert();
    }

    #[tokio::test]
    async fn empty_bulk_is_not_sent() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/listings/bulk");
            then.status(200);
        });
        let err = client(&server)
            .moderate(ADMIN_LISTINGS, Vec::new(), ModerationAction::Reject, None)
            .await
            .expect_err("empty");
        assert_eq!(err.to_string(), "No listings selected");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn admin_listing_single_reject_uses_bulk_route() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/listings/bulk").json_body(json!({
                "listingIds": ["l9"],
                "action": "reject",
                "notificationType": "listing_rejection"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        client(&server)
            .moderate_one(
                ADMIN_LISTINGS,
                "l9",
                None,
                ModerationAction::Reject,
                Some("spam".into()),
            )
            .await
            .expect("rejected");
        mock.assert();
    }

    #[tokio::test]
    async fn mod_single_routes_follow_entity_layout() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(POST).path("/api/mod/listings/l1/reject").json_body(json!({
                "listingId": "l1",
                "listingType": "service",
                "action": "reject",
                "reason": "duplicate"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        let interest = server.mock(|when, then| {
            when.method(POST)
                .path("/api/mod/interests/i1/approve")
                .json_body(json!({}));
            then.status(200).json_body(json!({"success": true}));
        });
        let user = server.mock(|when, then| {
            when.method(POST)
                .path("/api/mod/users/approve/u1")
                .json_body(json!({}));
            then.status(200).json_body(json!({"success": true}));
        });
        let api = client(&server);
        api.moderate_one(
            MOD_LISTINGS,
            "l1",
            Some(ListingKind::Service),
            ModerationAction::Reject,
            Some("duplicate".into()),
        )
        .await
        .expect("listing");
        api.moderate_one(
            MOD_INTERESTS,
            "i1",
            None,
            ModerationAction::Approve,
            Some("ignored".into()),
        )
        .await
        .expect("interest");
        api.moderate_one(MOD_USERS, "u1", None, ModerationAction::Approve, None)
            .await
            .expect("user");
        listing.assert();
        interest.assert();
        user.assert();
    }

    #[tokio::test]
    async fn admin_listing_delete_posts_bulk_delete() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/listings/bulk").json_body(json!({
                "listingIds": ["l1", "l2"],
                "action": "delete",
                "notificationType": "listing_rejection"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        client(&server)
            .moderate(
                ADMIN_LISTINGS,
                vec!["l1".into(), "l2".into()],
                ModerationAction::Delete,
                None,
            )
            .await
            .expect("deleted");
        mock.assert();
    }

    #[tokio::test]
    async fn delete_is_refused_outside_admin_listings() {
        let server = MockServer::start_async().await;
        let any_post = server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"success": true}));
        });
        let api = client(&server);
        for board in Board::ALL.into_iter().filter(|board| !board.allows_delete()) {
            let err = api
                .moderate(board, vec!["x".into()], ModerationAction::Delete, None)
                .await
                .expect_err("no delete route");
            assert!(matches!(err, ApiError::Validation { .. }));
            let err = api
                .moderate_one(board, "x", None, ModerationAction::Delete, None)
                .await
                .expect_err("no delete route");
            assert!(matches!(err, ApiError::Validation { .. }));
        }
        any_post.assert_hits(0);
    }

    #[tokio::test]
    async fn role_change_posts_admin_user_bulk() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/admin/users/bulk").json_body(json!({
                "userIds": ["u1", "u2"],
                "action": "role",
                "value": "moderator"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        client(&server)
            .change_users(
                vec!["u1".into(), "u2".into()],
                UserChange::Role(Role::Moderator),
            )
            .await
            .expect("changed");
        mock.assert();
    }

    #[tokio::test]
    async fn interest_rows_decode_on_admin_board() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/admin/interests")
                .query_param("status", "all");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"interests": [{"_id": "i1", "status": "approved"}]},
                "totalPages": 2
            }));
        });
        let board = Board::new(Panel::Admin, ModerationEntity::Interests);
        let page: Page<Interest> = client(&server)
            .moderation_page(board, 1, &board.default_filter())
            .await
            .expect("page");
        assert_eq!(page.items[0].status, Status::Active);
        assert_eq!(page.total_pages, 2);
    }
}
