//! Concurrent confirm behavior
//!
//! Two sessions for the same case confirmed at the same time must not
//! interleave sort_order allocation: the stored orders stay unique and
//! strictly increasing across both batches.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use caseline_common::config::ServiceConfig;
use caseline_common::db::create_tables;
use caseline_im::AppState;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn open_validated_session(
    router: &axum::Router,
    user_id: Uuid,
    case_id: Uuid,
    csv: &[u8],
) -> String {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"events.csv\"\r\n\r\n",
    );
    body.extend_from_slice(csv);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(format!("/cases/{}/imports/upload", case_id))
        .header("x-user-id", user_id.to_string())
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/cases/{}/imports/validate", case_id))
        .header("x-user-id", user_id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"session_id": session_id, "mappings": {"event_date": "event_date"}}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK, "validate failed: {}", body);

    session_id
}

fn confirm_request(user_id: Uuid, case_id: Uuid, session_id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/cases/{}/imports/confirm", case_id))
        .header("x-user-id", user_id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(json!({"session_id": session_id}).to_string()))
        .unwrap()
}

#[tokio::test]
async fn concurrent_confirms_allocate_disjoint_sort_orders() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_tables(&pool).await.unwrap();

    let user_id = Uuid::new_v4();
    let case_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (user_id, username) VALUES (?, 'auditor')")
        .bind(user_id.to_string())
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO cases (case_id, case_number, title, created_by) VALUES (?, 1, 'Audit', ?)",
    )
    .bind(case_id.to_string())
    .bind(user_id.to_string())
    .execute(&pool)
    .await
    .unwrap();

    let config = ServiceConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".into(),
        max_upload_bytes: 10 * 1024 * 1024,
        session_ttl_secs: 3600,
    };
    let state = AppState::new(pool.clone(), config);
    let router = caseline_im::build_router(state);

    let csv_a: &[u8] = b"event_date\n2025-01-01\n2025-01-02\n2025-01-03\n";
    let csv_b: &[u8] = b"event_date\n2025-02-01\n2025-02-02\n";
    let session_a = open_validated_session(&router, user_id, case_id, csv_a).await;
    let session_b = open_validated_session(&router, user_id, case_id, csv_b).await;

    let router_a = router.clone();
    let router_b = router.clone();
    let confirm_a = tokio::spawn(async move {
        router_a
            .oneshot(confirm_request(user_id, case_id, &session_a))
            .await
            .unwrap()
            .status()
    });
    let confirm_b = tokio::spawn(async move {
        router_b
            .oneshot(confirm_request(user_id, case_id, &session_b))
            .await
            .unwrap()
            .status()
    });

    let (status_a, status_b) = tokio::join!(confirm_a, confirm_b);
    assert_eq!(status_a.unwrap(), StatusCode::OK);
    assert_eq!(status_b.unwrap(), StatusCode::OK);

    let rows = caseline_im::db::events::list_for_case(&pool, case_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);

    let orders: Vec<i64> = rows.iter().map(|r| r.sort_order).collect();
    let expected: Vec<i64> = (0..5).collect();
    assert_eq!(orders, expected, "sort_order must be gapless and unique");

    // Each batch stays contiguous in insertion order
    let mut batch_dates: Vec<&str> = rows.iter().map(|r| r.event_date.as_str()).collect();
    batch_dates.sort_unstable();
    assert_eq!(
        batch_dates,
        vec!["2025-01-01", "2025-01-02", "2025-01-03", "2025-02-01", "2025-02-02"]
    );
}
