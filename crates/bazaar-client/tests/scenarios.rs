use std::sync::Arc;
use std::time::Duration;

use bazaar_api_models::{
    Listing, ListingKind, ModerationAction, ModerationEntity, Panel, Status, User,
};
use bazaar_client::{
    ApiClient, Applied, Board, ClientConfig, FileSessionStore, MemoryNotifier, ModerationBoard,
    PincodeDebouncer, PincodeLookup, PincodeResolver, SessionContext, SessionStore, StoredSession,
};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

struct Harness {
    server: MockServer,
    store: Arc<FileSessionStore>,
    notifier: Arc<MemoryNotifier>,
    client: ApiClient,
    _dir: TempDir,
}

async fn harness() -> anyhow::Result<Harness> {
    let server = MockServer::start_async().await;
    let dir = tempfile::tempdir()?;
    let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
    let notifier = Arc::new(MemoryNotifier::new());
    let client = ApiClient::new(
        &ClientConfig::with_base_url(server.base_url()),
        store.clone(),
        notifier.clone(),
    )?;
    Ok(Harness {
        server,
        store,
        notifier,
        client,
        _dir: dir,
    })
}

#[tokio::test]
async fn login_persists_session_and_lands_by_role() -> anyhow::Result<()> {
    for (email, role, landing) in [
        ("admin@example.com", "admin", "/admin"),
        ("mod@example.com", "moderator", "/moderator"),
        ("user@example.com", "user", "/"),
    ] {
        let h = harness().await?;
        let token = format!("{role}-token");
        let login = h.server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({"email": email, "password": "secret"}));
            then.status(200).json_body(json!({
                "token": token,
                "user": {"id": format!("{role}-1"), "role": role}
            }));
        });
        let profile = h.server.mock(|when, then| {
            when.method(GET)
                .path("/api/auth/profile")
                .header("authorization", format!("Bearer {role}-token"));
            then.status(200).json_body(json!({
                "user": {"_id": format!("{role}-1"), "role": role, "firstName": "Asha"}
            }));
        });

        let mut session = SessionContext::new(h.client.clone());
        let route = session.login(email, "secret").await?;
        assert_eq!(route, landing);
        login.assert();
        profile.assert();

        let stored = h.store.load()?;
        assert_eq!(stored.token(), Some(token.as_str()));
        assert_eq!(stored.user_id(), Some(format!("{role}-1").as_str()));
        assert_eq!(
            session.user().map(|user| user.display_name()),
            Some("Asha".to_string())
        );
        assert!(h.notifier.messages().contains(&"Login successful".to_string()));
    }
    Ok(())
}

#[tokio::test]
async fn unauthorized_clears_token_except_on_login() -> anyhow::Result<()> {
    let h = harness().await?;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401)
            .json_body(json!({"message": "Invalid email or password"}));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/auth/profile");
        then.status(401).json_body(json!({"message": "Token expired"}));
    });
    h.store.save(&StoredSession::new("stale", Some("u1".into())))?;

    let mut session = SessionContext::new(h.client.clone());
    let err = session
        .login("a@example.com", "wrong")
        .await
        .expect_err("bad credentials");
    assert!(err.is_unauthorized());
    assert_eq!(h.store.token().as_deref(), Some("stale"));
    assert_eq!(
        h.notifier.last().map(|notice| notice.message),
        Some("Invalid email or password".to_string())
    );

    let err = session.load_profile().await.expect_err("expired");
    assert!(err.is_unauthorized());
    assert_eq!(h.store.token(), None);
    assert!(!h.store.path().exists());
    assert!(session.user().is_none());
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_and_user_lists() -> anyhow::Result<()> {
    let h = harness().await?;
    h.store.save(&StoredSession::new("tok", Some("u1".into())))?;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/listings/my-listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"product": [{"_id": "p1", "title": "Desk", "status": "active"}]}
        }));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/interests/sent");
        then.status(200)
            .json_body(json!({"success": true, "data": [{"_id": "i1"}]}));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/interests/received");
        then.status(200).json_body(json!({"success": true, "data": []}));
    });

    let mut session = SessionContext::new(h.client.clone());
    session.refresh_session_lists().await;
    assert_eq!(session.my_listings().len(), 1);
    assert_eq!(session.sent_interests().items().len(), 1);

    session.logout()?;
    assert!(!session.is_authenticated());
    assert!(session.my_listings().is_empty());
    assert!(session.sent_interests().is_empty());
    assert!(!h.store.path().exists());
    Ok(())
}

#[tokio::test]
async fn bulk_approve_sends_one_request_and_refetch_shows_active() -> anyhow::Result<()> {
    let h = harness().await?;
    h.store.save(&StoredSession::new("mod-token", None))?;
    let mut pending = h.server.mock(|when, then| {
        when.method(GET).path("/api/mod/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [
                {"_id": "a", "status": "pending"},
                {"_id": "b", "status": "pending"},
                {"_id": "c", "status": "pending"}
            ]}
        }));
    });
    let board_id = Board::new(Panel::Moderator, ModerationEntity::Listings);
    let mut board: ModerationBoard<Listing> = ModerationBoard::new(h.client.clone(), board_id);
    assert_eq!(board.refresh().await, Applied::Loaded);
    board.select_all();
    assert_eq!(board.selected_ids().len(), 3);

    pending.delete();
    let approved = h.server.mock(|when, then| {
        when.method(GET).path("/api/mod/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [
                {"_id": "a", "status": "approved"},
                {"_id": "b", "status": "approved"},
                {"_id": "c", "status": "approved"}
            ]}
        }));
    });
    let bulk = h.server.mock(|when, then| {
        when.method(POST)
            .path("/api/mod/listings/bulk-action")
            .json_body(json!({"ids": ["a", "b", "c"], "action": "approve", "reason": ""}));
        then.status(200).json_body(json!({"success": true}));
    });

    let sent = board.apply_bulk(ModerationAction::Approve, None).await?;
    assert_eq!(sent, 3);
    bulk.assert_hits(1);
    approved.assert_hits(1);
    assert!(
        board
            .rows()
            .items()
            .iter()
            .all(|listing| listing.status == Status::Active)
    );
    assert!(board.selected_ids().is_empty());
    assert_eq!(
        h.notifier.last().map(|notice| notice.message),
        Some("3 listings approved successfully".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn admin_select_all_approves_mixed_statuses_in_one_request() -> anyhow::Result<()> {
    let h = harness().await?;
    h.store.save(&StoredSession::new("admin-token", Some("admin-1".into())))?;
    let mut mixed = h.server.mock(|when, then| {
        when.method(GET).path("/api/admin/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [
                {"_id": "a", "status": "pending"},
                {"_id": "b", "status": "rejected"},
                {"_id": "c", "status": "pending"}
            ]}
        }));
    });
    let board_id = Board::new(Panel::Admin, ModerationEntity::Listings);
    let mut board: ModerationBoard<Listing> = ModerationBoard::new(h.client.clone(), board_id);
    assert_eq!(board.refresh().await, Applied::Loaded);
    board.select_all();
    assert_eq!(board.selected_ids(), vec!["a", "b", "c"]);

    mixed.delete();
    let approved = h.server.mock(|when, then| {
        when.method(GET).path("/api/admin/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [
                {"_id": "a", "status": "active"},
                {"_id": "b", "status": "active"},
                {"_id": "c", "status": "active"}
            ]}
        }));
    });
    let bulk = h.server.mock(|when, then| {
        when.method(POST).path("/api/admin/listings/bulk").json_body(json!({
            "listingIds": ["a", "b", "c"],
            "action": "approve",
            "notificationType": "listing_approval"
        }));
        then.status(200).json_body(json!({"success": true}));
    });

    assert_eq!(board.apply_bulk(ModerationAction::Approve, None).await?, 3);
    bulk.assert_hits(1);
    approved.assert_hits(1);
    assert!(
        board
            .rows()
            .items()
            .iter()
            .all(|listing| listing.status == Status::Active)
    );
    Ok(())
}

#[tokio::test]
async fn admin_user_page_keeps_suspended_accounts() -> anyhow::Result<()> {
    let h = harness().await?;
    h.store.save(&StoredSession::new("admin-token", Some("admin-1".into())))?;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/admin/users");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"users": [
                {"_id": "u1", "role": "user", "status": "active"},
                {"_id": "u2", "role": "user", "status": "suspended"}
            ]}
        }));
    });
    let board_id = Board::new(Panel::Admin, ModerationEntity::Users);
    let mut board: ModerationBoard<User> = ModerationBoard::new(h.client.clone(), board_id);
    assert_eq!(board.refresh().await, Applied::Loaded);
    let statuses: Vec<Status> = board.rows().items().iter().map(|user| user.status).collect();
    assert_eq!(statuses, vec![Status::Active, Status::Suspended]);
    assert!(board.rows().last_error().is_none());
    Ok(())
}

#[tokio::test]
async fn admin_bulk_delete_drops_rows_and_refetches() -> anyhow::Result<()> {
    let h = harness().await?;
    h.store.save(&StoredSession::new("admin-token", Some("admin-1".into())))?;
    let mut before = h.server.mock(|when, then| {
        when.method(GET).path("/api/admin/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [
                {"_id": "a", "status": "active"},
                {"_id": "b", "status": "rejected"},
                {"_id": "c", "status": "pending"}
            ]}
        }));
    });
    let board_id = Board::new(Panel::Admin, ModerationEntity::Listings);
    let mut board: ModerationBoard<Listing> = ModerationBoard::new(h.client.clone(), board_id);
    board.refresh().await;
    assert!(board.toggle("a"));
    assert!(board.toggle("b"));

    before.delete();
    let after = h.server.mock(|when, then| {
        when.method(GET).path("/api/admin/listings");
        then.status(200).json_body(json!({
            "success": true,
            "data": {"listings": [{"_id": "c", "status": "pending"}]}
        }));
    });
    let delete = h.server.mock(|when, then| {
        when.method(POST).path("/api/admin/listings/bulk").json_body(json!({
            "listingIds": ["a", "b"],
            "action": "delete",
            "notificationType": "listing_rejection"
        }));
        then.status(200).json_body(json!({"success": true}));
    });

    assert_eq!(board.apply_bulk(ModerationAction::Delete, None).await?, 2);
    delete.assert_hits(1);
    after.assert_hits(1);
    let ids: Vec<&str> = board.rows().items().iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["c"]);
    assert!(board.selected_ids().is_empty());
    assert_eq!(
        h.notifier.last().map(|notice| notice.message),
        Some("2 listings deleted successfully".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn failed_catalog_fetch_degrades_to_empty_list() -> anyhow::Result<()> {
    let h = harness().await?;
    let mut ok = h.server.mock(|when, then| {
        when.method(GET).path("/api/listings/job");
        then.status(200).json_body(json!({
            "success": true,
            "data": [{"_id": "j1", "title": "Cook", "status": "active"}]
        }));
    });
    let mut session = SessionContext::new(h.client.clone());
    let query = bazaar_client::ListingQuery::default();
    assert_eq!(session.browse(ListingKind::Job, &query).await, Applied::Loaded);
    assert_eq!(session.catalog(ListingKind::Job).items().len(), 1);

    ok.delete();
    h.server.mock(|when, then| {
        when.method(GET).path("/api/listings/job");
        then.status(503).body("maintenance");
    });
    assert_eq!(session.browse(ListingKind::Job, &query).await, Applied::Emptied);
    let jobs = session.catalog(ListingKind::Job);
    assert!(jobs.is_empty());
    assert!(jobs.last_error().is_some());
    Ok(())
}

#[tokio::test]
async fn pincode_typing_burst_makes_one_lookup() -> anyhow::Result<()> {
    let h = harness().await?;
    let lookup = h.server.mock(|when, then| {
        when.method(GET).path("/pincode/110001");
        then.status(200).json_body(json!([{
            "Status": "Success",
            "PostOffice": [{"District": "Central Delhi", "State": "Delhi"}]
        }]));
    });
    let config = ClientConfig {
        pincode_base_url: h.server.base_url(),
        pincode_debounce: Duration::from_millis(40),
        ..ClientConfig::default()
    };
    let resolver = PincodeResolver::new(h.client.clone(), &config.pincode_base_url)?;
    let mut debouncer = PincodeDebouncer::new(resolver, config.pincode_debounce);
    let mut updates = debouncer.subscribe();
    for prefix in ["1", "11", "110", "1100", "11000", "110001"] {
        debouncer.input(prefix);
    }
    let state = tokio::time::timeout(
        Duration::from_secs(2),
        updates.wait_for(|state| matches!(state, PincodeLookup::Resolved(_))),
    )
    .await??
    .clone();
    match state {
        PincodeLookup::Resolved(details) => {
            assert_eq!(details.state, "Delhi");
            assert_eq!(details.district, "Central Delhi");
        }
        other => panic!("unexpected lookup state {other:?}"),
    }
    lookup.assert_hits(1);
    Ok(())
}
