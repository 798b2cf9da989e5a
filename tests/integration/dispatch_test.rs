//! Integration tests for notification dispatch through the HTTP API.

mod helpers;

use http::StatusCode;
use serde_json::json;

use staffhub_core::types::Role;

#[tokio::test]
async fn test_role_broadcast_reaches_only_matching_roles() {
    let app = helpers::TestApp::new();
    let (_, employee_token) = app.user(Role::employee());
    let (_, manager_token) = app.user(Role::manager());
    let (_, admin_token) = app.user(Role::admin());

    let mut employee = app.open_stream(&employee_token).await;
    let mut manager = app.open_stream(&manager_token).await;

    let response = app
        .dispatch(
            &admin_token,
            json!({
                "target": { "type": "roles", "roles": ["MANAGER"] },
                "notification": {
                    "title": "Overtime approval",
                    "message": "3 requests waiting",
                    "notificationType": "warning"
                }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["targeted"], 1);
    assert_eq!(response.body["data"]["delivered"], 1);

    let message = manager.next_message().await;
    assert_eq!(message.title, "Overtime approval");
    assert_eq!(message.target_user_id, None);
    assert_eq!(
        message.id.as_str(),
        response.body["data"]["messageId"].as_str().unwrap()
    );
    employee.assert_quiet().await;
}

#[tokio::test]
async fn test_empty_role_list_reaches_nobody() {
    let app = helpers::TestApp::new();
    let (_, employee_token) = app.user(Role::employee());
    let (_, manager_token) = app.user(Role::manager());
    let mut employee = app.open_stream(&employee_token).await;

    let response = app
        .dispatch(
            &manager_token,
            json!({
                "target": { "type": "roles", "roles": [] },
                "notification": { "title": "Nobody", "message": "" }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["targeted"], 0);
    employee.assert_quiet().await;
}

#[tokio::test]
async fn test_broadcast_all_reaches_every_connection() {
    let app = helpers::TestApp::new();
    let (_, manager_token) = app.user(Role::manager());
    let mut streams = Vec::new();
    for role in [Role::employee(), Role::employee(), Role::admin()] {
        let (_, token) = app.user(role);
        streams.push(app.open_stream(&token).await);
    }

    let response = app
        .dispatch(
            &manager_token,
            json!({
                "target": { "type": "all" },
                "notification": { "id": "maint-1", "title": "Maintenance", "message": "Tonight 22:00" }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["delivered"], 3);
    assert_eq!(response.body["data"]["messageId"], "maint-1");
    for stream in &mut streams {
        assert_eq!(stream.next_message().await.id.as_str(), "maint-1");
    }
}

#[tokio::test]
async fn test_user_target_skips_offline_user() {
    let app = helpers::TestApp::new();
    let (_, manager_token) = app.user(Role::manager());
    let (offline, _) = app.user(Role::employee());
    let (online, online_token) = app.user(Role::employee());
    let mut stream = app.open_stream(&online_token).await;

    let response = app
        .dispatch(
            &manager_token,
            json!({
                "target": { "type": "user", "userId": offline },
                "notification": { "title": "Task assigned", "message": "Quarterly report", "type": "task_update" }
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["targeted"], 0);
    stream.assert_quiet().await;

    let response = app
        .dispatch(
            &manager_token,
            json!({
                "target": { "type": "users", "userIds": [offline, online] },
                "notification": { "title": "Team meeting", "message": "10:00" }
            }),
        )
        .await;
    assert_eq!(response.body["data"]["targeted"], 1);
    assert_eq!(stream.next_message().await.title, "Team meeting");
}

#[tokio::test]
async fn test_employee_cannot_dispatch() {
    let app = helpers::TestApp::new();
    let (_, employee_token) = app.user(Role::employee());

    let response = app
        .dispatch(
            &employee_token,
            json!({
                "target": { "type": "all" },
                "notification": { "title": "Hi", "message": "all" }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.engine.metrics.snapshot().messages_dispatched, 0);
}

#[tokio::test]
async fn test_dispatch_requires_token() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/notifications/dispatch",
            Some(json!({ "target": { "type": "all" }, "notification": { "title": "x", "message": "y" } })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_target_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, admin_token) = app.user(Role::admin());

    let response = app
        .dispatch(
            &admin_token,
            json!({
                "target": { "type": "department", "id": 4 },
                "notification": { "title": "x", "message": "y" }
            }),
        )
        .await;

    assert!(response.status.is_client_error());
}
