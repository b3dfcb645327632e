mod common;

use axum_test::TestServer;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

fn server(ctx: &common::TestContext) -> TestServer {
    common::api_server(ctx.state.clone())
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_stats_zero_fills_missing_days() {
    let ctx = common::test_context();
    let server = server(&ctx);

    ctx.links
        .seed(common::active_link("abc123", "https://example.com"));
    ctx.stats.seed("abc123", day(2025, 1, 1), 5);
    ctx.stats.seed("abc123", day(2025, 1, 3), 3);

    let response = server
        .get("/api/links/abc123/stats")
        .add_query_param("from", "2025-01-01")
        .add_query_param("to", "2025-01-03")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STATS_FOUND");
    assert_eq!(body["data"]["slug"], "abc123");
    assert_eq!(body["data"]["from"], "2025-01-01");
    assert_eq!(body["data"]["to"], "2025-01-03");
    assert_eq!(
        body["data"]["daily"],
        json!([
            { "date": "2025-01-01", "count": 5 },
            { "date": "2025-01-02", "count": 0 },
            { "date": "2025-01-03", "count": 3 },
        ])
    );
}

#[tokio::test]
async fn test_stats_range_has_one_entry_per_day() {
    let ctx = common::test_context();
    let server = server(&ctx);

    ctx.links
        .seed(common::active_link("abc123", "https://example.com"));

    let response = server
        .get("/api/links/abc123/stats")
        .add_query_param("from", "2025-01-01")
        .add_query_param("to", "2025-01-31")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["daily"].as_array().unwrap().len(), 31);
}

#[tokio::test]
async fn test_stats_unordered_range_is_rejected() {
    let ctx = common::test_context();
    let server = server(&ctx);

    ctx.links
        .seed(common::active_link("abc123", "https://example.com"));

    let response = server
        .get("/api/links/abc123/stats")
        .add_query_param("from", "2025-01-03")
        .add_query_param("to", "2025-01-01")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_stats_missing_params_are_rejected() {
    let ctx = common::test_context();
    let server = server(&ctx);

    let response = server.get("/api/links/abc123/stats").await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert_eq!(body["message"], "from and to are required (YYYY-MM-DD)");
}

#[tokio::test]
async fn test_stats_malformed_date_is_rejected() {
    let ctx = common::test_context();
    let server = server(&ctx);

    let response = server
        .get("/api/links/abc123/stats")
        .add_query_param("from", "01/01/2025")
        .add_query_param("to", "2025-01-03")
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert_eq!(body["message"], "invalid from (YYYY-MM-DD)");
}

#[tokio::test]
async fn test_stats_unknown_slug_is_not_found() {
    let ctx = common::test_context();
    let server = server(&ctx);

    let response = server
        .get("/api/links/nosuch/stats")
        .add_query_param("from", "2025-01-01")
        .add_query_param("to", "2025-01-03")
        .await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "LINK_NOT_FOUND");
}

#[tokio::test]
async fn test_stats_expired_link_remains_queryable() {
    let ctx = common::test_context();
    let server = server(&ctx);

    let expired_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    ctx.links.seed(common::expired_link(
        "abc123",
        "https://example.com",
        expired_at,
    ));
    ctx.stats.seed("abc123", day(2019, 12, 31), 7);

    let response = server
        .get("/api/links/abc123/stats")
        .add_query_param("from", "2019-12-31")
        .add_query_param("to", "2019-12-31")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["daily"][0]["count"], 7);
}
