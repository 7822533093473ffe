use std::time::Duration;

use bazaar_client::{NotificationInbox, UnreadPoller};
use serde_json::json;

use crate::cli::{NotificationCommand, ReadArgs, WatchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render, render_notifications};

pub(crate) async fn handle(ctx: &mut AppContext, command: NotificationCommand) -> CliResult<()> {
    ctx.require_token()?;
    match command {
        NotificationCommand::List => {
            let mut inbox = NotificationInbox::new(ctx.client().clone());
            inbox.load().await;
            render_notifications(inbox.items(), inbox.unread(), ctx.output)
        }
        NotificationCommand::Count => {
            let count = ctx.client().unread_count().await?;
            render(ctx.output, &json!({ "unread": count }), || count.to_string())
        }
        NotificationCommand::Read(args) => handle_read(ctx, args).await,
        NotificationCommand::Cleanup => {
            let mut inbox = NotificationInbox::new(ctx.client().clone());
            inbox.cleanup().await?;
            render_notifications(inbox.items(), inbox.unread(), ctx.output)
        }
        NotificationCommand::Watch(args) => handle_watch(ctx, args).await,
    }
}

async fn handle_read(ctx: &AppContext, args: ReadArgs) -> CliResult<()> {
    let mut inbox = NotificationInbox::new(ctx.client().clone());
    inbox.load().await;
    if args.all {
        inbox.mark_all_read().await?;
    } else {
        let unknown: Vec<&str> = args
            .ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !inbox.items().iter().any(|item| item.id == *id))
            .collect();
        if !unknown.is_empty() {
            return Err(CliError::validation(format!(
                "unknown notification ids: {}",
                unknown.join(", ")
            )));
        }
        for id in &args.ids {
            inbox.mark_read(id.trim()).await?;
        }
    }
    render_notifications(inbox.items(), inbox.unread(), ctx.output)
}

async fn handle_watch(ctx: &AppContext, args: WatchArgs) -> CliResult<()> {
    if args.interval_secs == Some(0) {
        return Err(CliError::validation("--interval-secs must be at least 1"));
    }
    let interval = args
        .interval_secs
        .map_or(ctx.config.poll_interval, Duration::from_secs);
    let mut poller = UnreadPoller::spawn(ctx.client().clone(), interval);
    tracing::debug!(interval_secs = interval.as_secs(), "watching unread count");

    let mut seen = 0usize;
    loop {
        if args.limit.is_some_and(|limit| seen >= limit) {
            break;
        }
        tokio::select! {
            changed = poller.changed() => {
                let Some(count) = changed else { break };
                seen += 1;
                render(ctx.output, &json!({ "unread": count }), || {
                    format!("unread: {count}")
                })?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use anyhow::Result;
    use httpmock::prelude::*;

    fn inbox_mocks(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/notifications");
            then.status(200).json_body(json!({
                "success": true,
                "data": [
                    {"_id": "n1", "type": "ad_approved", "message": "Approved", "read": false},
                    {"_id": "n2", "type": "job_interest", "message": "Applied", "read": true}
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/notifications/count");
            then.status(200).json_body(json!({"count": 1}));
        });
    }

    #[tokio::test]
    async fn read_marks_listed_ids() -> Result<()> {
        let server = MockServer::start_async().await;
        inbox_mocks(&server);
        let mark = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/notifications/mark-read")
                .json_body(json!({"notificationIds": ["n1"]}));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            NotificationCommand::Read(ReadArgs {
                ids: vec!["n1".into()],
                all: false,
            }),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        mark.assert();
        Ok(())
    }

    #[tokio::test]
    async fn read_refuses_unknown_ids() {
        let server = MockServer::start_async().await;
        inbox_mocks(&server);
        let mark = server.mock(|when, then| {
            when.method(PUT).path("/api/notifications/mark-read");
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            NotificationCommand::Read(ReadArgs {
                ids: vec!["n9".into()],
                all: false,
            }),
        )
        .await
        .expect_err("unknown id");
        assert_eq!(err.exit_code(), 2);
        mark.assert_hits(0);
    }

    #[tokio::test]
    async fn cleanup_deletes_then_reloads() -> Result<()> {
        let server = MockServer::start_async().await;
        inbox_mocks(&server);
        let cleanup = server.mock(|when, then| {
            when.method(DELETE).path("/api/notifications/cleanup");
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(&mut t.ctx, NotificationCommand::Cleanup)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        cleanup.assert();
        assert!(
            t.notifier
                .messages()
                .contains(&"Old notifications cleaned up".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn watch_stops_after_limit() -> Result<()> {
        let server = MockServer::start_async().await;
        let count = server.mock(|when, then| {
            when.method(GET).path("/api/notifications/count");
            then.status(200).json_body(json!({"count": 3}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            NotificationCommand::Watch(WatchArgs {
                interval_secs: Some(1),
                limit: Some(1),
            }),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert!(count.hits() >= 1);
        Ok(())
    }

    #[tokio::test]
    async fn watch_rejects_zero_interval() {
        let server = MockServer::start_async().await;
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            NotificationCommand::Watch(WatchArgs {
                interval_secs: Some(0),
                limit: None,
            }),
        )
        .await
        .expect_err("zero interval");
        assert_eq!(err.exit_code(), 2);
    }
}
