//! Integration tests for the notification REST surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use flareboard_core::types::id::{NotificationId, UserId};
use flareboard_database::{ListFilter, NotificationStore};
use helpers::TestApp;

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/notifications", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.error_code(), "UNAUTHORIZED");

    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let expired = app.expired_token_for(UserId::new());
    let response = app
        .request("GET", "/api/notifications", None, Some(&expired))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_scoped_and_newest_first() {
    let app = TestApp::new();
    let user = UserId::new();
    let other = UserId::new();
    let older = app.seed(user, "Older", false).await;
    let newer = app.seed(user, "Newer", true).await;
    app.seed(other, "Not yours", false).await;

    let token = app.token_for(user);
    let response = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let rows = response.data().as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], newer.id.to_string());
    assert_eq!(rows[1]["id"], older.id.to_string());
    assert_eq!(rows[1]["type"], "task_assigned");

    let response = app
        .request("GET", "/api/notifications?unread_only=true", None, Some(&token))
        .await;
    let rows = response.data().as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], older.id.to_string());
}

async fn unread(app: &TestApp, token: &str) -> i64 {
    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some(token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.data()["count"].as_i64().unwrap()
}

#[tokio::test]
async fn test_unread_count_tracks_every_mutation() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);

    assert_eq!(unread(&app, &token).await, 0);

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "user_id": user.to_string(),
                "type": "task_assigned",
                "title": "New task",
                "message": "You were assigned to Ship it",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["is_read"], false);
    assert_eq!(created.data()["content"], "You were assigned to Ship it");
    let first_id = created.data()["id"].as_str().unwrap().to_string();
    app.seed(user, "Second", false).await;
    assert_eq!(unread(&app, &token).await, 2);

    let response = app
        .request(
            "PATCH",
            &format!("/api/notifications/{first_id}/read"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["is_read"], true);
    assert_eq!(unread(&app, &token).await, 1);

    // Marking again is harmless.
    let response = app
        .request(
            "PATCH",
            &format!("/api/notifications/{first_id}/read"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(unread(&app, &token).await, 1);

    let response = app
        .request("POST", "/api/notifications/mark-all-read", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["affected"], 1);
    assert_eq!(unread(&app, &token).await, 0);

    app.seed(user, "Third", false).await;
    let response = app
        .request(
            "DELETE",
            &format!("/api/notifications/{first_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], first_id);
    assert_eq!(unread(&app, &token).await, 1);
}

#[tokio::test]
async fn test_clear_read_removes_only_read_rows() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);
    app.seed(user, "Read one", true).await;
    let unread = app.seed(user, "Unread", false).await;
    app.seed(user, "Read two", true).await;

    let response = app
        .request("DELETE", "/api/notifications/clear-read", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["affected"], 2);

    let remaining = app
        .store
        .list_for_user(user, ListFilter::all(50))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, unread.id);
    assert!(!remaining[0].is_read);
}

#[tokio::test]
async fn test_cannot_touch_another_users_notification() {
    let app = TestApp::new();
    let owner = UserId::new();
    let intruder = app.token_for(UserId::new());
    let row = app.seed(owner, "Private", false).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/notifications/{}/read", row.id),
            None,
            Some(&intruder),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");

    let response = app
        .request(
            "DELETE",
            &format!("/api/notifications/{}", row.id),
            None,
            Some(&intruder),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let stored = app.store.find_by_id(row.id).await.unwrap().unwrap();
    assert!(!stored.is_read);
}

#[tokio::test]
async fn test_missing_and_malformed_ids() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "PATCH",
            &format!("/api/notifications/{}/read", NotificationId::new()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");

    let response = app
        .request("DELETE", "/api/notifications/not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_requires_every_field() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "user_id": UserId::new().to_string(), "type": "comment_added", "title": "  " })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    let message = response.body["error"]["message"].as_str().unwrap();
    assert!(message.contains("title"));
    assert!(message.contains("message"));
    assert_eq!(app.store.len().await, 0);

    let response = app
        .request("POST", "/api/notifications", Some(json!("not an object")), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_realtime_status() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");

    let response = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["database"], "connected");
    assert_eq!(response.data()["ws_connections"], 0);

    let response = app.request("GET", "/api/realtime/status", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let token = app.token_for(UserId::new());
    let response = app
        .request("GET", "/api/realtime/status", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["active_connections"], 0);
    assert_eq!(response.data()["metrics"]["connections_total"], 0);
}
