//! Paginated resource lists that degrade to empty on failure.
//!
//! # Design
//! - A fetch is bracketed by [`ResourceList::begin`] and
//!   [`ResourceList::apply`]; the ticket returned by `begin` carries a
//!   generation, and results for superseded tickets are discarded.
//! - Failures never propagate: the list empties and remembers the error text.

use std::future::Future;

use bazaar_api_models::Page;

use crate::error::ApiError;
use crate::http::ApiClient;

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be handed back to `apply`"]
pub struct Ticket {
    generation: u64,
    page: u32,
}

impl Ticket {
    /// Page the fetch was issued for.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }
}

/// Outcome of handing a fetch result back to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result replaced the list contents.
    Loaded,
    /// The fetch failed and the list was emptied.
    Emptied,
    /// A newer fetch was issued meanwhile; the result was dropped.
    Stale,
}

/// Client-side copy of one server list plus its pagination counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceList<T> {
    items: Vec<T>,
    page: u32,
    total_pages: u32,
    total: u64,
    generation: u64,
    loading: bool,
    last_error: Option<String>,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
            total: 0,
            generation: 0,
            loading: false,
            last_error: None,
        }
    }
}

impl<T> ResourceList<T> {
    /// Empty list on page 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rows.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the rows, for optimistic patches.
    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Current one-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Server-reported page count (at least 1).
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Server-reported row count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Whether the list holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a fetch is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Text of the most recent failure, cleared by the next successful load.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a fetch for `page`, superseding any outstanding one.
    pub fn begin(&mut self, page: u32) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        Ticket {
            generation: self.generation,
            page: page.max(1),
        }
    }

    /// Hand back the result of the fetch started with `ticket`.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Page<T>, ApiError>) -> Applied {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale list response"
            );
            return Applied::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.items = page.items;
                self.page = page.page;
                self.total_pages = page.total_pages.max(1);
                self.total = page.total;
                self.last_error = None;
                Applied::Loaded
            }
            Err(err) => {
                self.items.clear();
                self.page = ticket.page;
                self.total_pages = 1;
                self.total = 0;
                self.last_error = Some(err.to_string());
                Applied::Emptied
            }
        }
    }

    /// Run `fetch` for `page` and apply its result, announcing failures with
    /// `failure` as the fallback text.
    pub async fn load<F>(&mut self, client: &ApiClient, page: u32, failure: &str, fetch: F) -> Applied
    where
        F: Future<Output = Result<Page<T>, ApiError>>,
    {
        let ticket = self.begin(page);
        let result = fetch.await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, page = ticket.page(), "list fetch failed");
            client.report(err, failure);
        }
        self.apply(ticket, result)
    }

    /// Replace the rows with a non-paginated result.
    pub fn replace(&mut self, items: Vec<T>) {
        self.total = items.len() as u64;
        self.items = items;
        self.page = 1;
        self.total_pages = 1;
        self.last_error = None;
    }

    /// Drop every row and reset pagination, invalidating outstanding fetches.
    pub fn clear(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// Apply `patch` to every row matching `predicate`; returns how many rows
    /// changed.
    pub fn patch_where<P, F>(&mut self, mut predicate: P, mut patch: F) -> usize
    where
        P: FnMut(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut patched = 0;
        for item in self.items.iter_mut().filter(|item| predicate(item)) {
            patch(item);
            patched += 1;
        }
        patched
    }

    /// Drop every row matching `predicate`, keeping the server total in step;
    /// returns how many rows went.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        let removed = before - self.items.len();
        self.total = self.total.saturating_sub(removed as u64);
        removed
    }
}
