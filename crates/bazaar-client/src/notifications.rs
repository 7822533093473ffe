//! Notification inbox and the background unread-count poller.
//!
//! # Design
//! - The inbox keeps its own unread counter so marking rows read updates the
//!   badge immediately; the counter saturates at zero.
//! - The poller runs on a tokio task and publishes through a `watch`
//!   channel. It only calls the API while a token is stored, keeps the last
//!   good count when a poll fails, and stops when its handle is dropped.

use std::time::Duration;

use bazaar_api_models::Notification;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::notice::Notice;

/// Loaded notifications plus the unread badge count.
#[derive(Debug)]
pub struct NotificationInbox {
    client: ApiClient,
    items: Vec<Notification>,
    unread: u64,
}

impl NotificationInbox {
    /// Empty inbox.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            items: Vec::new(),
            unread: 0,
        }
    }

    /// Loaded notifications, newest first as served.
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Unread badge count.
    #[must_use]
    pub const fn unread(&self) -> u64 {
        self.unread
    }

    /// Fetch the list and the unread count together.
    ///
    /// A failed list empties the inbox; a failed count falls back to the
    /// number of unread rows.
    pub async fn load(&mut self) {
        let (list, count) = tokio::join!(self.client.notifications(), self.client.unread_count());
        match list {
            Ok(items) => self.items = items,
            Err(err) => {
                tracing::warn!(error = %err, "notification fetch failed");
                self.client.report(&err, "Failed to fetch notifications");
                self.items.clear();
            }
        }
        self.unread = count.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "unread count unavailable");
            self.items.iter().filter(|item| !item.read).count() as u64
        });
    }

    /// Mark one notification read. Already-read rows are not sent.
    ///
    /// # Errors
    ///
    /// Propagates the request failure after announcing it.
    pub async fn mark_read(&mut self, id: &str) -> ApiResult<()> {
        let unread = self.items.iter().any(|item| item.id == id && !item.read);
        if !unread {
            return Ok(());
        }
        if let Err(err) = self.client.mark_notifications_read(vec![id.to_string()]).await {
            self.client.report(&err, "Failed to mark notification as read");
            return Err(err);
        }
        for item in self.items.iter_mut().filter(|item| item.id == id) {
            item.read = true;
        }
        self.unread = self.unread.saturating_sub(1);
        Ok(())
    }

    /// Mark every unread notification read; returns how many were sent.
    ///
    /// # Errors
    ///
    /// Propagates the request failure after announcing it.
    pub async fn mark_all_read(&mut self) -> ApiResult<usize> {
        let ids: Vec<String> = self
            .items
            .iter()
            .filter(|item| !item.read)
            .map(|item| item.id.clone())
            .collect();
        if ids.is_empty() {
            self.client.notify(Notice::info("No unread notifications"));
            return Ok(0);
        }
        let count = ids.len();
        if let Err(err) = self.client.mark_notifications_read(ids).await {
            self.client
                .report(&err, "Failed to mark notifications as read");
            return Err(err);
        }
        for item in &mut self.items {
            item.read = true;
        }
        self.unread = 0;
        self.client
            .notify(Notice::success("All notifications marked as read"));
        Ok(count)
    }

    /// Delete old notifications server-side and reload.
    ///
    /// # Errors
    ///
    /// Propagates the request failure after announcing it.
    pub async fn cleanup(&mut self) -> ApiResult<()> {
        if let Err(err) = self.client.cleanup_notifications().await {
            self.client
                .report(&err, "Failed to clean up notifications");
            return Err(err);
        }
        self.client
            .notify(Notice::success("Old notifications cleaned up"));
        self.load().await;
        Ok(())
    }
}

/// Handle to the background unread-count poller; dropping it stops polling.
#[derive(Debug)]
pub struct UnreadPoller {
    receiver: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl UnreadPoller {
    /// Start polling every `interval`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(client: ApiClient, interval: Duration) -> Self {
        let (sender, receiver) = watch::channel(0);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !client.is_authenticated() {
                    sender.send_if_modified(|count| std::mem::replace(count, 0) != 0);
                    continue;
                }
                match client.unread_count().await {
                    Ok(count) => {
                        sender.send_if_modified(|current| {
                            std::mem::replace(current, count) != count
                        });
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "unread count poll failed");
                    }
                }
            }
        });
        Self { receiver, task }
    }

    /// Most recent count.
    #[must_use]
    pub fn count(&self) -> u64 {
        *self.receiver.borrow()
    }

    /// Independent receiver for the count.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }

    /// Wait for the count to change and return it.
    pub async fn changed(&mut self) -> Option<u64> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }
}

impl Drop for UnreadPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
