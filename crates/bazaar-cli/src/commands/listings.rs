use bazaar_client::{Applied, ListingForm, ListingQuery};

use crate::cli::{BrowseArgs, EditArgs, ListingCommand, PostArgs, SearchArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_listing_detail, render_listing_page, render_listings, render_my_listings};

pub(crate) async fn handle(ctx: &mut AppContext, command: ListingCommand) -> CliResult<()> {
    match command {
        ListingCommand::Browse(args) => handle_browse(ctx, args).await,
        ListingCommand::Show(args) => {
            let listing = ctx.client().listing(args.kind, args.id.trim()).await?;
            render_listing_detail(&listing, ctx.output)
        }
        ListingCommand::Search(args) => handle_search(ctx, args).await,
        ListingCommand::Post(args) => handle_post(ctx, args).await,
        ListingCommand::Edit(args) => handle_edit(ctx, args).await,
        ListingCommand::Deactivate(args) => {
            ctx.require_token()?;
            ctx.session.refresh_my_listings().await;
            ctx.session.deactivate_listing(args.kind, args.id.trim()).await?;
            render_my_listings(ctx.session.my_listings(), ctx.output)
        }
        ListingCommand::Mine => {
            ctx.require_token()?;
            ctx.session.refresh_my_listings().await;
            render_my_listings(ctx.session.my_listings(), ctx.output)
        }
    }
}

async fn handle_browse(ctx: &mut AppContext, args: BrowseArgs) -> CliResult<()> {
    let mut query = ListingQuery::page(args.page);
    query.limit = args.limit;
    for (key, value) in args.filters {
        query = query.filter(key, value);
    }
    let applied = ctx.session.browse(args.kind, &query).await;
    let list = ctx.session.catalog(args.kind);
    if applied == Applied::Emptied
        && let Some(error) = list.last_error()
    {
        return Err(CliError::failure(anyhow::anyhow!(
            "failed to load {} listings: {error}",
            args.kind
        )));
    }
    render_listing_page(list, ctx.output)
}

async fn handle_search(ctx: &mut AppContext, args: SearchArgs) -> CliResult<()> {
    let results = ctx.client().search_listings(&args.state, &args.query).await?;
    render_listings(&results, ctx.output)
}

fn build_form(fields: Vec<(String, String)>, images: Vec<std::path::PathBuf>) -> ListingForm {
    let form = fields
        .into_iter()
        .fold(ListingForm::default(), |form, (name, value)| form.field(name, value));
    images
        .into_iter()
        .fold(form, |form, image| form.image(image))
}

async fn handle_post(ctx: &mut AppContext, args: PostArgs) -> CliResult<()> {
    ctx.require_token()?;
    if args.fields.is_empty() {
        return Err(CliError::validation(
            "an ad needs at least one --field name=value",
        ));
    }
    let form = build_form(args.fields, args.images);
    ctx.client().post_listing(args.kind, form).await?;
    println!("{} ad submitted for review.", args.kind);
    Ok(())
}

async fn handle_edit(ctx: &mut AppContext, args: EditArgs) -> CliResult<()> {
    ctx.require_token()?;
    if args.fields.is_empty() && args.images.is_empty() {
        return Err(CliError::validation(
            "nothing to update (pass --field name=value or --image)",
        ));
    }
    let id = args.id.trim().to_string();
    let form = build_form(args.fields, args.images);
    ctx.client().update_listing(args.kind, &id, form).await?;
    let listing = ctx.client().listing(args.kind, &id).await?;
    render_listing_detail(&listing, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ListingRefArgs;
    use crate::commands::test_support::context;
    use anyhow::Result;
    use bazaar_api_models::ListingKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn run_err(err: CliError) -> anyhow::Error {
        anyhow::anyhow!(err.display_message())
    }

    #[tokio::test]
    async fn browse_forwards_page_and_filters() -> Result<()> {
        let server = MockServer::start_async().await;
        let browse = server.mock(|when, then| {
            when.method(GET)
                .path("/api/listings/matrimony")
                .query_param("page", "2")
                .query_param("minAge", "25")
                .query_param("religion", "Hindu");
            then.status(200).json_body(json!({
                "success": true,
                "data": [{"_id": "m1", "name": "Profile", "status": "active"}],
                "totalPages": 3,
                "total": 21
            }));
        });
        let mut t = context(&server, None);
        handle(
            &mut t.ctx,
            ListingCommand::Browse(BrowseArgs {
                kind: ListingKind::Matrimony,
                page: 2,
                limit: None,
                filters: vec![
                    ("minAge".into(), "25".into()),
                    ("religion".into(), "Hindu".into()),
                ],
            }),
        )
        .await
        .map_err(run_err)?;
        browse.assert();
        let list = t.ctx.session.catalog(ListingKind::Matrimony);
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.total_pages(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn browse_failure_exits_with_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/listings/job");
            then.status(500).json_body(json!({"message": "boom"}));
        });
        let mut t = context(&server, None);
        let err = handle(
            &mut t.ctx,
            ListingCommand::Browse(BrowseArgs {
                kind: ListingKind::Job,
                page: 1,
                limit: None,
                filters: Vec::new(),
            }),
        )
        .await
        .expect_err("server error");
        assert_eq!(err.exit_code(), 3);
        assert!(t.ctx.session.catalog(ListingKind::Job).is_empty());
    }

    #[tokio::test]
    async fn blank_search_is_rejected_locally() {
        let server = MockServer::start_async().await;
        let search = server.mock(|when, then| {
            when.method(GET).path("/api/listings/search");
            then.status(200);
        });
        let mut t = context(&server, None);
        let err = handle(
            &mut t.ctx,
            ListingCommand::Search(SearchArgs {
                state: "Kerala".into(),
                query: "  ".into(),
            }),
        )
        .await
        .expect_err("blank query");
        assert_eq!(err.exit_code(), 2);
        search.assert_hits(0);
    }

    #[tokio::test]
    async fn post_sends_multipart_with_terms() -> Result<()> {
        let server = MockServer::start_async().await;
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/api/listings/product")
                .header("authorization", "Bearer tok")
                .body_includes("name=\"title\"")
                .body_includes("Oak desk")
                .body_includes("name=\"termsAccepted\"");
            then.status(201).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        handle(
            &mut t.ctx,
            ListingCommand::Post(PostArgs {
                kind: ListingKind::Product,
                fields: vec![("title".into(), "Oak desk".into())],
                images: Vec::new(),
            }),
        )
        .await
        .map_err(run_err)?;
        post.assert();
        Ok(())
    }

    #[tokio::test]
    async fn deactivate_refuses_pending_ads() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/listings/my-listings");
            then.status(200).json_body(json!({
                "success": true,
                "data": {"service": [{"_id": "s1", "title": "Tutor", "status": "pending"}]}
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/listings/service/s1");
            then.status(200).json_body(json!({"success": true}));
        });
        let mut t = context(&server, Some("tok"));
        let err = handle(
            &mut t.ctx,
            ListingCommand::Deactivate(ListingRefArgs {
                kind: ListingKind::Service,
                id: "s1".into(),
            }),
        )
        .await
        .expect_err("pending ad");
        assert_eq!(err.exit_code(), 2);
        delete.assert_hits(0);
    }
}
