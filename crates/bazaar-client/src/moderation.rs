//! Moderation board state: one page of rows, a filter, and a selection.
//!
//! # Design
//! - Moderator queues only act on legal transitions (pending to active or
//!   rejected); selection and bulk actions skip everything else there.
//! - Admin boards override freely: an action applies to any row whose status
//!   it would change, and the admin listing board can also delete rows.
//! - A successful action patches the affected rows in place (or drops them
//!   after a delete), clears the selection, announces the outcome, and
//!   refetches the current page so the view converges on server state.

use std::collections::BTreeSet;

use bazaar_api_models::{
    Interest, Listing, ListingKind, ModerationAction, ModerationEntity, Panel, Status, User,
    UserChange,
};
use serde::de::DeserializeOwned;

use crate::api::moderation::{Board, BoardFilter};
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::lists::{Applied, ResourceList};
use crate::notice::Notice;

/// Row that can appear on a moderation board.
pub trait Moderatable {
    /// Server identifier.
    fn id(&self) -> &str;
    /// Current status.
    fn status(&self) -> Status;
    /// Overwrite the status after a successful action.
    fn set_status(&mut self, status: Status);
    /// Listing variant, for routes that need it.
    fn listing_kind(&self) -> Option<ListingKind> {
        None
    }
}

impl Moderatable for Listing {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn listing_kind(&self) -> Option<ListingKind> {
        self.kind
    }
}

impl Moderatable for Interest {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn listing_kind(&self) -> Option<ListingKind> {
        self.listing_kind
    }
}

impl Moderatable for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

fn singular(entity: ModerationEntity) -> &'static str {
    match entity {
        ModerationEntity::Listings => "Listing",
        ModerationEntity::Interests => "Interest",
        ModerationEntity::Users => "User",
    }
}

/// Client-side state of one moderation board.
#[derive(Debug)]
pub struct ModerationBoard<T> {
    client: ApiClient,
    board: Board,
    filter: BoardFilter,
    rows: ResourceList<T>,
    selected: BTreeSet<String>,
}

impl<T> ModerationBoard<T>
where
    T: Moderatable + DeserializeOwned,
{
    /// Empty board using [`Board::default_filter`].
    #[must_use]
    pub fn new(client: ApiClient, board: Board) -> Self {
        Self {
            client,
            filter: board.default_filter(),
            board,
            rows: ResourceList::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Board this state belongs to.
    #[must_use]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> &BoardFilter {
        &self.filter
    }

    /// Current rows and pagination.
    #[must_use]
    pub const fn rows(&self) -> &ResourceList<T> {
        &self.rows
    }

    /// Selected ids in row order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        self.rows
            .items()
            .iter()
            .map(Moderatable::id)
            .filter(|id| self.selected.contains(*id))
            .map(str::to_string)
            .collect()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Whether `action` would do anything to `row` on this board.
    #[must_use]
    pub fn can_apply(&self, row: &T, action: ModerationAction) -> bool {
        match (self.board.panel, action.target_status()) {
            (_, None) => self.board.allows_delete(),
            (Panel::Admin, Some(target)) => row.status() != target,
            (Panel::Moderator, Some(target)) => row.status().can_transition_to(target),
        }
    }

    /// Whether `row` can be selected. Every admin row qualifies; moderator
    /// rows only while a decision is still open.
    #[must_use]
    pub fn is_actionable(&self, row: &T) -> bool {
        self.board.panel == Panel::Admin
            || [ModerationAction::Approve, ModerationAction::Reject]
                .into_iter()
                .any(|action| self.can_apply(row, action))
    }

    /// Toggle selection of `id`; returns whether it is now selected.
    ///
    /// Unknown and non-actionable rows are never selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            return false;
        }
        let actionable = self
            .rows
            .items()
            .iter()
            .any(|row| row.id() == id && self.is_actionable(row));
        if actionable {
            self.selected.insert(id.to_string());
        }
        actionable
    }

    /// Select every actionable row on the page.
    pub fn select_all(&mut self) {
        self.selected = self
            .rows
            .items()
            .iter()
            .filter(|row| self.is_actionable(row))
            .map(|row| row.id().to_string())
            .collect();
    }

    /// Select every actionable row, or clear when all are already selected.
    pub fn toggle_all(&mut self) {
        let actionable = self
            .rows
            .items()
            .iter()
            .filter(|row| self.is_actionable(row))
            .count();
        if actionable > 0 && self.selected.len() == actionable {
            self.clear_selection();
        } else {
            self.select_all();
        }
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Refetch the current page.
    pub async fn refresh(&mut self) -> Applied {
        let page = self.rows.page();
        self.load(page).await
    }

    /// Move to `page`; out-of-range pages are ignored.
    pub async fn set_page(&mut self, page: u32) -> Option<Applied> {
        if page == 0 || page > self.rows.total_pages() {
            return None;
        }
        self.clear_selection();
        Some(self.load(page).await)
    }

    /// Replace the filter and reload from page 1.
    pub async fn set_filter(&mut self, filter: BoardFilter) -> Applied {
        self.filter = filter;
        self.clear_selection();
        self.load(1).await
    }

    /// Apply `action` to every selected actionable row in one request.
    ///
    /// Returns how many rows were sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an action the board does not
    /// offer or (after a warning notice) when nothing actionable is selected,
    /// otherwise propagates the request failure after announcing it.
    pub async fn apply_bulk(
        &mut self,
        action: ModerationAction,
        reason: Option<String>,
    ) -> ApiResult<usize> {
        self.board.check_action(action)?;
        let ids: Vec<String> = self
            .rows
            .items()
            .iter()
            .filter(|row| self.selected.contains(row.id()))
            .filter(|row| self.can_apply(row, action))
            .map(|row| row.id().to_string())
            .collect();
        if ids.is_empty() {
            let message = format!("No {} selected", self.board.entity);
            self.client.notify(Notice::warning(message.clone()));
            return Err(ApiError::validation(message));
        }

        let count = ids.len();
        if let Err(err) = self
            .client
            .moderate(self.board, ids.clone(), action, reason)
            .await
        {
            self.client.report(
                &err,
                &format!("Failed to {action} {}", self.board.entity),
            );
            return Err(err);
        }

        self.settle(action, |row| ids.iter().any(|id| id == row.id()));
        self.clear_selection();
        self.client.notify(Notice::success(format!(
            "{count} {} {} successfully",
            self.board.entity,
            action.past_tense()
        )));
        self.refresh().await;
        Ok(count)
    }

    /// Apply `action` to the row `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the row is not on the page or
    /// the action does not apply to it, otherwise propagates the request
    /// failure after announcing it.
    pub async fn apply_single(
        &mut self,
        id: &str,
        action: ModerationAction,
        reason: Option<String>,
    ) -> ApiResult<()> {
        self.board.check_action(action)?;
        let Some(row) = self.rows.items().iter().find(|row| row.id() == id) else {
            return Err(ApiError::validation(format!(
                "{} {id} is not on this page",
                singular(self.board.entity)
            )));
        };
        if !self.can_apply(row, action) {
            return Err(ApiError::validation(format!(
                "Cannot {action} a {} {}",
                row.status(),
                singular(self.board.entity).to_ascii_lowercase()
            )));
        }
        let kind = row.listing_kind().or(self.filter.kind);

        if let Err(err) = self
            .client
            .moderate_one(self.board, id, kind, action, reason)
            .await
        {
            self.client.report(
                &err,
                &format!(
                    "Failed to {action} {}",
                    singular(self.board.entity).to_ascii_lowercase()
                ),
            );
            return Err(err);
        }

        self.settle(action, |row| row.id() == id);
        self.selected.remove(id);
        self.client.notify(Notice::success(format!(
            "{} {} successfully",
            singular(self.board.entity),
            action.past_tense()
        )));
        self.refresh().await;
        Ok(())
    }

    fn settle<P>(&mut self, action: ModerationAction, affected: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        match action.target_status() {
            Some(target) => self.rows.patch_where(affected, |row| row.set_status(target)),
            None => self.rows.remove_where(affected),
        }
    }

    async fn load(&mut self, page: u32) -> Applied {
        let failure = format!("Failed to fetch {}", self.board.entity);
        let fetch = self
            .client
            .moderation_page::<T>(self.board, page, &self.filter);
        let applied = self.rows.load(&self.client, page, &failure, fetch).await;
        let present: BTreeSet<&str> = self.rows.items().iter().map(Moderatable::id).collect();
        self.selected.retain(|id| present.contains(id.as_str()));
        applied
    }
}

impl ModerationBoard<User> {
    /// Apply a role or status override to every selected account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] off the admin user board or when
    /// nothing is selected, otherwise propagates the request failure after
    /// announcing it.
    pub async fn change_selected(&mut self, change: UserChange) -> ApiResult<usize> {
        if !self.board.allows_user_changes() {
            return Err(ApiError::validation(
                "Role and status changes are only available on the admin user board",
            ));
        }
        let ids = self.selected_ids();
        if ids.is_empty() {
            self.client.notify(Notice::warning("No users selected"));
            return Err(ApiError::validation("No users selected"));
        }
        let count = ids.len();
        if let Err(err) = self.client.change_users(ids.clone(), change).await {
            self.client.report(&err, "Failed to update users");
            return Err(err);
        }
        self.rows.patch_where(
            |user| ids.contains(&user.id),
            |user| match change {
                UserChange::Status(status) => user.status = status,
                UserChange::Role(role) => user.role = role,
            },
        );
        self.clear_selection();
        self.client.notify(Notice::success(format!(
            "{count} users updated: {} set to {}",
            change.action(),
            change.value()
        )));
        self.refresh().await;
        Ok(count)
    }
}
