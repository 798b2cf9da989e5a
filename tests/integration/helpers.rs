//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use staffhub_api::{AppState, build_router};
use staffhub_auth::{JwtDecoder, JwtEncoder};
use staffhub_core::config::AppConfig;
use staffhub_core::types::{Role, UserId};
use staffhub_realtime::message::frame::{self, FrameDecoder};
use staffhub_realtime::{JwtAuthenticator, NotificationMessage, RealtimeEngine};

/// How long a test waits for a frame before deciding none is coming.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Real-time engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let engine = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let authenticator = Arc::new(JwtAuthenticator::new(Arc::new(JwtDecoder::new(
            &config.auth,
        ))));
        let state = AppState::new(
            Arc::new(config.clone()),
            Arc::clone(&engine),
            authenticator,
        );

        Self {
            router: build_router(state),
            engine,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Mint an access token for a fresh user with `role`
    pub fn user(&self, role: Role) -> (UserId, String) {
        let user_id = UserId::new();
        let (token, _) = self
            .encoder
            .generate_access_token(user_id, &role, "tester")
            .expect("Failed to mint token");
        (user_id, token)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Open the event stream with a bearer token
    pub async fn open_stream(&self, token: &str) -> TestStream {
        let req = Request::builder()
            .method("GET")
            .uri("/api/notifications/stream")
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "text/event-stream")
            .body(Body::empty())
            .expect("Failed to build request");
        self.open_stream_request(req).await
    }

    /// Open the event stream with an arbitrary request
    pub async fn open_stream_request(&self, req: Request<Body>) -> TestStream {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        TestStream {
            status: response.status(),
            content_type: response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
            body: response.into_body(),
            decoder: FrameDecoder::new(),
            pending: Vec::new(),
        }
    }

    /// Dispatch through the HTTP API
    pub async fn dispatch(&self, token: &str, body: Value) -> TestResponse {
        self.request("POST", "/api/notifications/dispatch", Some(body), Some(token))
            .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// An open event stream response
pub struct TestStream {
    pub status: StatusCode,
    pub content_type: String,
    body: Body,
    decoder: FrameDecoder,
    pending: Vec<String>,
}

/// What reading the stream produced
#[derive(Debug)]
pub enum StreamRead {
    Message(NotificationMessage),
    Closed,
    Quiet,
}

impl TestStream {
    /// Next decoded notification, `Closed` if the server ended the stream,
    /// or `Quiet` if nothing arrived within `wait`.
    pub async fn next_within(&mut self, wait: Duration) -> StreamRead {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if !self.pending.is_empty() {
                let data = self.pending.remove(0);
                return StreamRead::Message(frame::decode(&data).expect("Malformed frame"));
            }
            let frame = match tokio::time::timeout_at(deadline, self.body.frame()).await {
                Err(_) => return StreamRead::Quiet,
                Ok(None) => return StreamRead::Closed,
                Ok(Some(frame)) => frame.expect("Stream body error"),
            };
            if let Ok(bytes) = frame.into_data() {
                self.pending.extend(self.decoder.feed(&bytes));
            }
        }
    }

    /// Next notification; panics if none arrives in a few seconds.
    pub async fn next_message(&mut self) -> NotificationMessage {
        match self.next_within(Duration::from_secs(5)).await {
            StreamRead::Message(message) => message,
            other => panic!("Expected a notification, got {:?}", other),
        }
    }

    /// Assert nothing arrives for a short while.
    pub async fn assert_quiet(&mut self) {
        match self.next_within(QUIET_PERIOD).await {
            StreamRead::Quiet => {}
            other => panic!("Expected no notification, got {:?}", other),
        }
    }
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    format!("http://{}", addr)
}
