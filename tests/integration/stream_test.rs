//! Integration tests for the notification event stream.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};

use helpers::StreamRead;
use staffhub_core::types::Role;
use staffhub_realtime::{NotificationBuilder, NotificationKind, Severity};

#[tokio::test]
async fn test_stream_without_token_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request("GET", "/api/notifications/stream", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.engine.online_count(), 0);
}

#[tokio::test]
async fn test_stream_with_invalid_token_is_rejected() {
    let app = helpers::TestApp::new();

    let stream = app.open_stream("not-a-token").await;

    assert_eq!(stream.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.engine.online_count(), 0);
}

#[tokio::test]
async fn test_stream_accepts_query_token() {
    let app = helpers::TestApp::new();
    let (user_id, token) = app.user(Role::employee());

    let req = Request::builder()
        .uri(format!("/api/notifications/stream?token={}", token))
        .body(Body::empty())
        .unwrap();
    let stream = app.open_stream_request(req).await;

    assert_eq!(stream.status, StatusCode::OK);
    assert!(stream.content_type.starts_with("text/event-stream"));
    assert!(app.engine.registry.get(&user_id).is_some());
}

#[tokio::test]
async fn test_targeted_message_frame() {
    let app = helpers::TestApp::new();
    let (user_id, token) = app.user(Role::employee());
    let mut stream = app.open_stream(&token).await;

    let draft = NotificationBuilder::new("Checked out", "Worked 8h 15m")
        .kind(NotificationKind::AttendanceUpdate)
        .severity(Severity::Success)
        .data("overtimeMinutes", 15)
        .build();
    let report = app.engine.dispatcher.send_to_user(user_id, draft).unwrap();
    assert_eq!(report.delivered, 1);

    let message = stream.next_message().await;
    assert_eq!(message.id, report.message_id);
    assert_eq!(message.kind, NotificationKind::AttendanceUpdate);
    assert_eq!(message.severity, Severity::Success);
    assert_eq!(message.target_user_id, Some(user_id.to_string()));
    assert_eq!(
        message.payload.unwrap()["overtimeMinutes"],
        serde_json::json!(15)
    );
}

#[tokio::test]
async fn test_messages_arrive_in_dispatch_order() {
    let app = helpers::TestApp::new();
    let (user_id, token) = app.user(Role::employee());
    let mut stream = app.open_stream(&token).await;

    for i in 0..5 {
        app.engine
            .dispatcher
            .send_to_user(user_id, NotificationBuilder::new(format!("m{i}"), "").build())
            .unwrap();
    }

    for i in 0..5 {
        assert_eq!(stream.next_message().await.title, format!("m{i}"));
    }
}

#[tokio::test]
async fn test_reconnect_replaces_previous_stream() {
    let app = helpers::TestApp::new();
    let (user_id, token) = app.user(Role::employee());

    let mut first = app.open_stream(&token).await;
    let mut second = app.open_stream(&token).await;
    assert_eq!(app.engine.online_count(), 1);

    assert!(matches!(
        first.next_within(helpers::QUIET_PERIOD).await,
        StreamRead::Closed
    ));

    app.engine
        .dispatcher
        .send_to_user(user_id, NotificationBuilder::new("Hi", "again").build())
        .unwrap();
    assert_eq!(second.next_message().await.title, "Hi");

    let snapshot = app.engine.metrics.snapshot();
    assert_eq!(snapshot.connections_opened, 2);
    assert_eq!(snapshot.connections_replaced, 1);
}

#[tokio::test]
async fn test_closing_stale_stream_keeps_replacement() {
    let app = helpers::TestApp::new();
    let (user_id, token) = app.user(Role::employee());

    let first = app.open_stream(&token).await;
    let mut second = app.open_stream(&token).await;
    drop(first);

    assert!(app.engine.registry.get(&user_id).is_some());
    app.engine
        .dispatcher
        .send_to_user(user_id, NotificationBuilder::new("Still", "here").build())
        .unwrap();
    assert_eq!(second.next_message().await.title, "Still");
}

#[tokio::test]
async fn test_dropping_stream_unregisters() {
    let app = helpers::TestApp::new();
    let (_, token) = app.user(Role::manager());

    let stream = app.open_stream(&token).await;
    assert_eq!(app.engine.online_count(), 1);

    drop(stream);
    assert_eq!(app.engine.online_count(), 0);

    let health = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["online_users"], 0);
    assert_eq!(health.body["data"]["metrics"]["connections_closed"], 1);
}

#[tokio::test]
async fn test_engine_shutdown_ends_streams() {
    let app = helpers::TestApp::new();
    let (_, token_a) = app.user(Role::employee());
    let (_, token_b) = app.user(Role::admin());
    let mut a = app.open_stream(&token_a).await;
    let mut b = app.open_stream(&token_b).await;

    app.engine.shutdown();

    assert!(matches!(a.next_within(helpers::QUIET_PERIOD).await, StreamRead::Closed));
    assert!(matches!(b.next_within(helpers::QUIET_PERIOD).await, StreamRead::Closed));
    assert_eq!(app.engine.online_count(), 0);
}

#[tokio::test]
async fn test_manager_lists_connections() {
    let app = helpers::TestApp::new();
    let (employee_id, employee_token) = app.user(Role::employee());
    let (_, manager_token) = app.user(Role::manager());
    let _stream = app.open_stream(&employee_token).await;

    let response = app
        .request("GET", "/api/notifications/connections", None, Some(&manager_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let connections = response.body["data"].as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["user_id"], employee_id.to_string());
    assert_eq!(connections[0]["role"], "EMPLOYEE");

    let response = app
        .request("GET", "/api/notifications/connections", None, Some(&employee_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_disconnect_ends_stream() {
    let app = helpers::TestApp::new();
    let (employee_id, employee_token) = app.user(Role::employee());
    let (_, manager_token) = app.user(Role::manager());
    let (_, admin_token) = app.user(Role::admin());
    let mut stream = app.open_stream(&employee_token).await;
    let path = format!("/api/notifications/connections/{}", employee_id);

    let response = app.request("DELETE", &path, None, Some(&manager_token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("DELETE", &path, None, Some(&admin_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(matches!(
        stream.next_within(helpers::QUIET_PERIOD).await,
        StreamRead::Closed
    ));
    assert_eq!(app.engine.online_count(), 0);

    let response = app.request("DELETE", &path, None, Some(&admin_token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
