//! `bazaar moderation <panel> <entity> ...` drives one moderation board.

use std::fmt;

use bazaar_api_models::{
    Interest, Listing, ModerationAction, ModerationEntity, Panel, User, UserChange,
};
use bazaar_client::{Board, BoardFilter, Moderatable, ModerationBoard};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::cli::{BoardArgs, DecisionTargets, EntityArg, ModerationArgs, ModerationCommand, PanelArg};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    render_with, write_interest_table, write_listing_rows, write_page_footer, write_user_table,
};

/// Row type a board can print.
trait BoardRow: Moderatable + DeserializeOwned + Serialize {
    fn write_table(out: &mut String, rows: &[Self]) -> fmt::Result
    where
        Self: Sized;
}

impl BoardRow for Listing {
    fn write_table(out: &mut String, rows: &[Self]) -> fmt::Result {
        write_listing_rows(out, rows)
    }
}

impl BoardRow for Interest {
    fn write_table(out: &mut String, rows: &[Self]) -> fmt::Result {
        write_interest_table(out, rows)
    }
}

impl BoardRow for User {
    fn write_table(out: &mut String, rows: &[Self]) -> fmt::Result {
        write_user_table(out, rows)
    }
}

pub(crate) async fn handle(ctx: &mut AppContext, args: ModerationArgs) -> CliResult<()> {
    ctx.require_token()?;
    let board = Board::new(panel(args.panel), entity(args.entity));
    match board.entity {
        ModerationEntity::Listings => run::<Listing>(ctx, board, args.action).await,
        ModerationEntity::Interests => run::<Interest>(ctx, board, args.action).await,
        ModerationEntity::Users => run_users(ctx, board, args.action).await,
    }
}

const fn panel(arg: PanelArg) -> Panel {
    match arg {
        PanelArg::Moderator => Panel::Moderator,
        PanelArg::Admin => Panel::Admin,
    }
}

const fn entity(arg: EntityArg) -> ModerationEntity {
    match arg {
        EntityArg::Listings => ModerationEntity::Listings,
        EntityArg::Interests => ModerationEntity::Interests,
        EntityArg::Users => ModerationEntity::Users,
    }
}

fn filter_for(board: Board, args: &BoardArgs) -> BoardFilter {
    let mut filter = board.default_filter();
    if let Some(status) = args.status {
        filter.status = status;
    }
    filter.kind = args.kind.or(filter.kind);
    filter.role = args.role.or(filter.role);
    filter
}

async fn open<T: BoardRow>(
    ctx: &AppContext,
    board: Board,
    args: &BoardArgs,
) -> CliResult<ModerationBoard<T>> {
    let mut rows = ModerationBoard::new(ctx.client().clone(), board);
    rows.set_filter(filter_for(board, args)).await;
    if let Some(error) = rows.rows().last_error() {
        return Err(CliError::failure(anyhow::anyhow!(
            "failed to load {}: {error}",
            board.entity
        )));
    }
    if args.page > 1 && rows.set_page(args.page).await.is_none() {
        return Err(CliError::validation(format!(
            "page {} is out of range (1..={})",
            args.page,
            rows.rows().total_pages().max(1)
        )));
    }
    Ok(rows)
}

fn print_board<T: BoardRow>(ctx: &AppContext, rows: &ModerationBoard<T>) -> CliResult<()> {
    let list = rows.rows();
    let value = json!({
        "items": list.items(),
        "page": list.page(),
        "totalPages": list.total_pages(),
        "total": list.total(),
    });
    render_with(ctx.output, &value, |out| {
        T::write_table(out, list.items())?;
        write_page_footer(out, list)
    })
}

async fn run<T: BoardRow>(
    ctx: &mut AppContext,
    board: Board,
    command: ModerationCommand,
) -> CliResult<()> {
    match command {
        ModerationCommand::List(args) => {
            let rows = open::<T>(ctx, board, &args).await?;
            print_board(ctx, &rows)
        }
        ModerationCommand::SetStatus(_) | ModerationCommand::SetRole(_) => Err(
            CliError::validation("role and status changes are only available on `admin users`"),
        ),
        decision => {
            let Some((action, targets)) = decision.decision() else {
                return Ok(());
            };
            let mut rows = open::<T>(ctx, board, &targets.board).await?;
            decide(&mut rows, action, targets).await?;
            print_board(ctx, &rows)
        }
    }
}

async fn decide<T: BoardRow>(
    rows: &mut ModerationBoard<T>,
    action: ModerationAction,
    targets: &DecisionTargets,
) -> CliResult<()> {
    let reason = targets
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_string);
    match (targets.all, targets.ids.as_slice()) {
        (false, [id]) => {
            rows.apply_single(id.trim(), action, reason).await?;
        }
        (false, []) => {
            return Err(CliError::validation("pass row ids or --all"));
        }
        (all, ids) => {
            if all {
                rows.select_all();
            } else {
                select(rows, ids)?;
            }
            rows.apply_bulk(action, reason).await?;
        }
    }
    Ok(())
}

fn select<T: BoardRow>(rows: &mut ModerationBoard<T>, ids: &[String]) -> CliResult<()> {
    let missing: Vec<&str> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !rows.is_selected(id) && !rows.toggle(id))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "not on this page or not actionable: {}",
            missing.join(", ")
        )))
    }
}

async fn run_users(ctx: &mut AppContext, board: Board, command: ModerationCommand) -> CliResult<()> {
    let change = match &command {
        ModerationCommand::SetStatus(args) => Some((UserChange::Status(args.status), &args.ids)),
        ModerationCommand::SetRole(args) => Some((UserChange::Role(args.role), &args.ids)),
        _ => None,
    };
    let Some((change, ids)) = change else {
        return run::<User>(ctx, board, command).await;
    };
    if !board.allows_user_changes() {
        return Err(CliError::validation(
            "role and status changes are only available on `admin users`",
        ));
    }
    let filter_args = BoardArgs {
        page: 1,
        status: None,
        kind: None,
        role: None,
    };
    let mut rows = open::<User>(ctx, board, &filter_args).await?;
    select(&mut rows, ids)?;
    rows.change_selected(change).await?;
    print_board(ctx, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{SetRoleArgs, SetStatusArgs};
    use crate::commands::test_support::context;
    use anyhow::Result;
    use bazaar_api_models::{Role, Status, StatusFilter};
    use httpmock::prelude::*;

    fn targets(ids: &[&str], all: bool, reason: Option<&str>) -> DecisionTargets {
        DecisionTargets {
            ids: ids.iter().map(ToString::to_string).collect(),
            all,
            reason: reason.map(str::to_string),
            board: BoardArgs {
                page: 1,
                status: None,
                kind: None,
                role: None,
            },
        }
    }

    fn args(panel: PanelArg, entity: EntityArg, action: ModerationCommand) -> ModerationArgs {
        ModerationArgs {
            panel,
            entity,
            action,
        }
    }

    #[test]
    fn explicit_filter_overrides_board_default() {
        let board = Board::new(Panel::Moderator, ModerationEntity::Listings);
        let filter = filter_for(
            board,
            &BoardArgs {
                page: 1,
                status: Some(StatusFilter::All),
                kind: None,
                role: None,
            },
        );
        assert_eq!(filter.status, StatusFilter::All);
        let untouched = filter_for(
            board,
            &BoardArgs {
                page: 1,
                status: None,
                kind: None,
                role: None,
            },
        );
        assert_eq!(untouched.status, StatusFilter::Only(Status::Pending));
    }

    #[tokio::test]
    async fn single_reject_uses_item_endpoint_with_reason() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/mod/listings");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"listings": [{"_id": "a", "listingType": "job", "status": "pending"}]}
            }));
        });
        let reject = server.mock(|when, then| {
            when.method(POST)
                .path("/api/mod/listings/a/reject")
                .json_body(json!({
                    "listingId": "a",
                    "listingType": "job",
                    "action": "reject",
                    "reason": "duplicate"
                }));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            args(
                PanelArg::Moderator,
                EntityArg::Listings,
                ModerationCommand::Reject(targets(&["a"], false, Some(" duplicate "))),
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        reject.assert();
        assert!(
            t.notifier
                .messages()
                .contains(&"Listing rejected successfully".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn bulk_approve_on_admin_interests() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/interests");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"interests": [
                    {"_id": "i1", "status": "pending"},
                    {"_id": "i2", "status": "rejected"},
                    {"_id": "i3", "status": "approved"}
                ]}
            }));
        });
        let bulk = server.mock(|when, then| {
            when.method(POST)
                .path("/api/admin/interests/bulk")
                .json_body(json!({"interestIds": ["i1", "i2"], "action": "approve"}));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            args(
                PanelArg::Admin,
                EntityArg::Interests,
                ModerationCommand::Approve(targets(&[], true, None)),
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        bulk.assert();
        Ok(())
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected_before_sending() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/mod/interests");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"interests": [{"_id": "i1", "status": "pending"}]}
            }));
        });
        let bulk = server.mock(|when, then| {
            when.method(POST).path("/api/mod/interests/bulk-action");
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            args(
                PanelArg::Moderator,
                EntityArg::Interests,
                ModerationCommand::Approve(targets(&["i1", "ghost"], false, None)),
            ),
        )
        .await
        .expect_err("ghost id");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("ghost"));
        bulk.assert_hits(0);
    }

    #[tokio::test]
    async fn role_change_is_admin_user_board_only() {
        let server = MockServer::start_async().await;
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            args(
                PanelArg::Moderator,
                EntityArg::Users,
                ModerationCommand::SetRole(SetRoleArgs {
                    role: Role::Moderator,
                    ids: vec!["u1".into()],
                }),
            ),
        )
        .await
        .expect_err("moderator board");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn admin_status_change_posts_bulk_users() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/users");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"users": [{"_id": "u1", "role": "user", "status": "active"}]}
            }));
        });
        let bulk = server.mock(|when, then| {
            when.method(POST).path("/api/admin/users/bulk").json_body(json!({
                "userIds": ["u1"],
                "action": "status",
                "value": "inactive"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            args(
                PanelArg::Admin,
                EntityArg::Users,
                ModerationCommand::SetStatus(SetStatusArgs {
                    status: Status::Inactive,
                    ids: vec!["u1".into()],
                }),
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        bulk.assert();
        Ok(())
    }

    #[tokio::test]
    async fn delete_all_on_admin_listings() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/listings");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"listings": [
                    {"_id": "l1", "status": "active"},
                    {"_id": "l2", "status": "rejected"}
                ]}
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(POST).path("/api/admin/listings/bulk").json_body(json!({
                "listingIds": ["l1", "l2"],
                "action": "delete",
                "notificationType": "listing_rejection"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            args(
                PanelArg::Admin,
                EntityArg::Listings,
                ModerationCommand::Delete(targets(&[], true, None)),
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        delete.assert();
        assert!(
            t.notifier
                .messages()
                .contains(&"2 listings deleted successfully".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_refused_on_moderator_listings() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/mod/listings");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"listings": [{"_id": "a", "status": "pending"}]}
            }));
        });
        let any_post = server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            args(
                PanelArg::Moderator,
                EntityArg::Listings,
                ModerationCommand::Delete(targets(&["a"], false, None)),
            ),
        )
        .await
        .expect_err("moderators cannot delete");
        assert_eq!(err.exit_code(), 2);
        any_post.assert_hits(0);
    }

    #[tokio::test]
    async fn admin_can_suspend_accounts() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/users");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"users": [
                    {"_id": "u1", "role": "user", "status": "active"},
                    {"_id": "u2", "role": "user", "status": "suspended"}
                ]}
            }));
        });
        let bulk = server.mock(|when, then| {
            when.method(POST).path("/api/admin/users/bulk").json_body(json!({
                "userIds": ["u1"],
                "action": "status",
                "value": "suspended"
            }));
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            args(
                PanelArg::Admin,
                EntityArg::Users,
                ModerationCommand::SetStatus(SetStatusArgs {
                    status: Status::Suspended,
                    ids: vec!["u1".into()],
                }),
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        bulk.assert();
        Ok(())
    }
}
