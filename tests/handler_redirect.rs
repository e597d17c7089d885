mod common;

use axum::http::StatusCode;
use common::{create_link, spawn_app, unreachable_server, wait_for_visits};
use kv_shortener::domain::repositories::MappingStore;
use std::time::Duration;

#[tokio::test]
async fn test_redirect_success() {
    let app = spawn_app();
    let code = create_link(&app.server, "https://example.com/target").await;

    let response = app.server.get(&format!("/{}", code)).await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = spawn_app();

    let response = app.server.get("/nonexistent").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_counts_visit() {
    let app = spawn_app();
    let code = create_link(&app.server, "https://example.com").await;

    app.server
        .get(&format!("/{}", code))
        .await
        .assert_status(StatusCode::MOVED_PERMANENTLY);

    assert_eq!(wait_for_visits(&app.server, &code, 1).await, 1);
}

#[tokio::test]
async fn test_redirect_counts_every_visit() {
    let app = spawn_app();
    let code = create_link(&app.server, "https://example.com").await;

    for _ in 0..10 {
        app.server
            .get(&format!("/{}", code))
            .await
            .assert_status(StatusCode::MOVED_PERMANENTLY);
    }

    assert_eq!(wait_for_visits(&app.server, &code, 10).await, 10);
}

#[tokio::test]
async fn test_redirect_unknown_code_creates_no_counter() {
    let app = spawn_app();

    app.server
        .get("/ghost1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.store.get("visits:ghost1").await.unwrap(), None);
}

#[tokio::test]
async fn test_redirect_after_expiry() {
    let app = spawn_app();
    let code = create_link(&app.server, "https://example.com").await;

    app.store
        .fast_forward(Duration::from_secs(366 * 24 * 60 * 60));

    app.server
        .get(&format!("/{}", code))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_storage_failure() {
    let server = unreachable_server();

    server
        .get("/abc123")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
