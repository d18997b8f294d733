//! Bootstrap enumeration tests against a mock VK server.

use std::sync::Arc;

use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::Value;
use serde_json::json;
use vk_harvest::database::model::UserStatus;
use vk_harvest::database::table::Table;
use vk_harvest::service::member_service::MemberSyncService;

mod common;

fn profiles(ids: impl IntoIterator<Item = i64>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| {
            json!({
                "id": id,
                "first_name": format!("First{id}"),
                "last_name": format!("Last{id}"),
                "is_closed": false
            })
        })
        .collect()
}

#[tokio::test]
async fn bootstrap_paginates_and_filters_invalid_accounts() {
    let (db, db_path) = common::setup_db().await;
    let server = MockServer::start();

    let mut config = common::test_config(&server.url(""));
    config.offset_size = 10;
    let client = Arc::new(common::test_client(&config));
    let service = MemberSyncService::new(db.clone(), client, &config);

    server.mock(|when, then| {
        when.method(GET)
            .path("/groups.getMembers")
            .query_param("count", "0");
        then.status(200)
            .json_body(json!({"response": {"count": 25, "items": []}}));
    });

    let pages: [(u64, Vec<i64>); 3] = [
        (0, (1..=10).collect()),
        (10, (11..=20).collect()),
        (20, (21..=25).collect()),
    ];
    for (offset, ids) in &pages {
        server.mock(|when, then| {
            when.method(GET)
                .path("/groups.getMembers")
                .query_param("count", "10")
                .query_param("offset", offset.to_string());
            then.status(200)
                .json_body(json!({"response": {"count": 25, "items": ids}}));
        });
    }

    // Page one carries one banned and one closed profile.
    let mut first_page = profiles(1..=10);
    first_page[2] = json!({
        "id": 3,
        "first_name": "DELETED",
        "last_name": "",
        "deactivated": "banned"
    });
    first_page[3] = json!({
        "id": 4,
        "first_name": "First4",
        "last_name": "Last4",
        "is_closed": true
    });

    for (ids, body) in [
        ((1..=10), first_page),
        ((11..=20), profiles(11..=20)),
        ((21..=25), profiles(21..=25)),
    ] {
        let user_ids = common::join_ids(ids);
        server.mock(move |when, then| {
            when.method(GET)
                .path("/users.get")
                .query_param("user_ids", user_ids.clone());
            then.status(200).json_body(json!({"response": body}));
        });
    }

    let report = service.bootstrap().await.expect("bootstrap failed");

    assert_eq!(report.members_total, 25);
    assert_eq!(report.pages, 3);
    assert_eq!(report.members_stored, 23);
    assert_eq!(db.user_table.count().await.unwrap(), 23);

    // Deactivated and closed profiles were silently dropped.
    assert!(db.user_table.select(&3).await.unwrap().is_none());
    assert!(db.user_table.select(&4).await.unwrap().is_none());

    let kept = db.user_table.select(&5).await.unwrap().unwrap();
    assert_eq!(kept.status, UserStatus::Unprocessed);
    assert_eq!(kept.first_name, "First5");

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn bootstrap_requests_the_trailing_empty_page() {
    let (db, db_path) = common::setup_db().await;
    let server = MockServer::start();

    let mut config = common::test_config(&server.url(""));
    config.offset_size = 10;
    let client = Arc::new(common::test_client(&config));
    let service = MemberSyncService::new(db.clone(), client, &config);

    server.mock(|when, then| {
        when.method(GET)
            .path("/groups.getMembers")
            .query_param("count", "0");
        then.status(200)
            .json_body(json!({"response": {"count": 20, "items": []}}));
    });

    for (offset, ids) in [(0u64, (1..=10).collect::<Vec<i64>>()), (10, (11..=20).collect())] {
        server.mock(|when, then| {
            when.method(GET)
                .path("/groups.getMembers")
                .query_param("count", "10")
                .query_param("offset", offset.to_string());
            then.status(200)
                .json_body(json!({"response": {"count": 20, "items": ids.clone()}}));
        });

        let user_ids = common::join_ids(ids.clone());
        let body = profiles(ids);
        server.mock(move |when, then| {
            when.method(GET)
                .path("/users.get")
                .query_param("user_ids", user_ids.clone());
            then.status(200).json_body(json!({"response": body}));
        });
    }

    // An exact multiple still produces one extra, empty page.
    let trailing = server.mock(|when, then| {
        when.method(GET)
            .path("/groups.getMembers")
            .query_param("count", "10")
            .query_param("offset", "20");
        then.status(200)
            .json_body(json!({"response": {"count": 20, "items": []}}));
    });

    let report = service.bootstrap().await.expect("bootstrap failed");

    trailing.assert_hits(1);
    assert_eq!(report.pages, 3);
    assert_eq!(report.members_stored, 20);
    assert_eq!(db.user_table.count().await.unwrap(), 20);

    common::teardown_db(db_path).await;
}
