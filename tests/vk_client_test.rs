//! Tests for the VK client's retry and classification behavior.

use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use vk_harvest::vk::error::VkError;

mod common;

#[tokio::test]
async fn call_returns_response_payload() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    let mock = server.mock(|when, then| {
        when.method(GET).path("/users.get");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"response": [{"id": 1}]}));
    });

    let resp = client.call("users.get", &[]).await.expect("call failed");

    mock.assert();
    assert_eq!(resp, json!([{"id": 1}]));
}

#[tokio::test]
async fn fatal_api_error_fails_without_retrying() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    let mock = server.mock(|when, then| {
        when.method(GET).path("/users.get");
        then.status(200).json_body(json!({
            "error": {"error_code": 5, "error_msg": "User authorization failed"}
        }));
    });

    let err = client.call("users.get", &[]).await.unwrap_err();

    mock.assert_hits(1);
    match err {
        VkError::ApiError { code, message } => {
            assert_eq!(code, 5);
            assert_eq!(message, "User authorization failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transient_api_error_exhausts_the_retry_schedule() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    let mock = server.mock(|when, then| {
        when.method(GET).path("/groups.getMembers");
        then.status(200).json_body(json!({
            "error": {"error_code": 6, "error_msg": "Too many requests per second"}
        }));
    });

    let err = client.call("groups.getMembers", &[]).await.unwrap_err();

    // Initial request plus the 30 scheduled retries.
    mock.assert_hits(31);
    assert!(matches!(err, VkError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn placeholder_payload_exhausts_the_retry_schedule() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    let mock = server.mock(|when, then| {
        when.method(GET).path("/users.getSubscriptions");
        then.status(200).json_body(json!({}));
    });

    let err = client
        .call("users.getSubscriptions", &[])
        .await
        .unwrap_err();

    mock.assert_hits(31);
    assert!(matches!(err, VkError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn subscription_groups_requires_the_groups_field() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    server.mock(|when, then| {
        when.method(GET).path("/users.getSubscriptions");
        then.status(200).json_body(json!({"response": {}}));
    });

    let err = client.subscription_groups(42).await.unwrap_err();
    assert!(matches!(err, VkError::MissingField { .. }));
}

#[tokio::test]
async fn count_probe_reads_the_count_field() {
    let server = MockServer::start();
    let client = common::test_client(&common::test_config(&server.url("")));

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/groups.getMembers")
            .query_param("count", "0");
        then.status(200)
            .json_body(json!({"response": {"count": 2500, "items": []}}));
    });

    let count = client.count_group_members("1").await.expect("probe failed");

    mock.assert();
    assert_eq!(count, 2500);
}
