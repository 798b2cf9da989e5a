//! End-to-end tests: real server, HTTP stream consumer, and presenter.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use staffhub_client::{
    ConnectionState, EventBus, HttpTransport, Identity, NotificationPresenter, ReadReceiptStore,
    ReconnectPolicy, StoredNotification, StreamConsumer,
};
use staffhub_core::error::AppError;
use staffhub_core::types::Role;
use staffhub_realtime::{MessageId, NotificationBuilder};

/// Store with no history that accepts every receipt.
struct NoopStore;

#[async_trait]
impl ReadReceiptStore for NoopStore {
    async fn list(&self, _limit: usize) -> Result<Vec<StoredNotification>, AppError> {
        Ok(Vec::new())
    }

    async fn mark_read(&self, _id: &MessageId) -> Result<(), AppError> {
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), AppError> {
        Ok(())
    }
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Timed out waiting for {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn wait_for_state(state: &mut watch::Receiver<ConnectionState>, target: ConnectionState) {
    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == target))
        .await
        .unwrap_or_else(|_| panic!("Timed out waiting for {}", target))
        .expect("Consumer stopped");
}

#[tokio::test]
async fn test_duplicate_delivery_yields_one_history_entry() {
    let app = helpers::TestApp::new();
    let base_url = helpers::serve(&app).await;
    let (user_id, token) = app.user(Role::employee());

    let bus = EventBus::new(64);
    let presenter = NotificationPresenter::new(50, Arc::new(NoopStore));
    presenter.attach(&bus);

    let (_identity_tx, identity_rx) = watch::channel(Some(Identity::new(user_id, token)));
    let transport = Arc::new(HttpTransport::new(&base_url, "/api/notifications/stream"));
    let consumer =
        StreamConsumer::new(transport, ReconnectPolicy::default(), bus).spawn(identity_rx);

    let mut state = consumer.watch_state();
    wait_for_state(&mut state, ConnectionState::Connected).await;
    eventually("presenter to see the connection", || presenter.is_connected()).await;

    for _ in 0..2 {
        app.engine
            .dispatcher
            .send_to_user(user_id, NotificationBuilder::new("Hello", "World").id("n1").build())
            .unwrap();
    }
    app.engine
        .dispatcher
        .send_to_user(user_id, NotificationBuilder::new("Second", "One").id("n2").build())
        .unwrap();

    eventually("both notifications", || presenter.entries().len() == 2).await;
    tokio::time::sleep(helpers::QUIET_PERIOD).await;

    let ids: Vec<String> = presenter
        .entries()
        .iter()
        .map(|e| e.message.id.to_string())
        .collect();
    assert_eq!(ids, vec!["n2", "n1"]);
    assert_eq!(presenter.unread_count(), 2);

    presenter.mark_as_read(&MessageId::new("n1"));
    assert_eq!(presenter.unread_count(), 1);

    consumer.shutdown().await;
    eventually("presenter to see the disconnect", || !presenter.is_connected()).await;
}

#[tokio::test]
async fn test_consumer_reconnects_after_server_closes_stream() {
    let app = helpers::TestApp::new();
    let base_url = helpers::serve(&app).await;
    let (user_id, token) = app.user(Role::manager());

    let bus = EventBus::new(64);
    let mut events = bus.subscribe();
    let (_identity_tx, identity_rx) = watch::channel(Some(Identity::new(user_id, token)));
    let transport = Arc::new(HttpTransport::new(&base_url, "/api/notifications/stream"));
    let consumer = StreamConsumer::new(
        transport,
        ReconnectPolicy::constant(Duration::from_millis(100)),
        bus,
    )
    .spawn(identity_rx);

    let mut state = consumer.watch_state();
    wait_for_state(&mut state, ConnectionState::Connected).await;

    app.engine.shutdown();
    wait_for_state(&mut state, ConnectionState::Reconnecting).await;
    wait_for_state(&mut state, ConnectionState::Connected).await;
    eventually("the user to be registered again", || {
        app.engine.registry.get(&user_id).is_some()
    })
    .await;

    app.engine
        .dispatcher
        .send_to_user(user_id, NotificationBuilder::new("Back", "online").build())
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(staffhub_client::ClientEvent::Notification(message)) = events.recv().await {
                break message;
            }
        }
    })
    .await
    .expect("No notification after reconnect");
    assert_eq!(received.title, "Back");
    assert_eq!(app.engine.metrics.snapshot().connections_opened, 2);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_rejected_token_keeps_retrying_without_registering() {
    let app = helpers::TestApp::new();
    let base_url = helpers::serve(&app).await;
    let (user_id, _) = app.user(Role::employee());

    let (_identity_tx, identity_rx) =
        watch::channel(Some(Identity::new(user_id, "expired-or-forged")));
    let transport = Arc::new(HttpTransport::new(&base_url, "/api/notifications/stream"));
    let consumer = StreamConsumer::new(
        transport,
        ReconnectPolicy::constant(Duration::from_millis(50)),
        EventBus::new(16),
    )
    .spawn(identity_rx);

    let mut state = consumer.watch_state();
    wait_for_state(&mut state, ConnectionState::Reconnecting).await;
    assert_eq!(app.engine.online_count(), 0);

    consumer.shutdown().await;
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_identity_switch_reconnects_as_new_user() {
    let app = helpers::TestApp::new();
    let base_url = helpers::serve(&app).await;
    let (first_user, first_token) = app.user(Role::employee());
    let (second_user, second_token) = app.user(Role::employee());

    let (identity_tx, identity_rx) =
        watch::channel(Some(Identity::new(first_user, first_token)));
    let transport = Arc::new(HttpTransport::new(&base_url, "/api/notifications/stream"));
    let consumer = StreamConsumer::new(transport, ReconnectPolicy::default(), EventBus::new(16))
        .spawn(identity_rx);

    eventually("first user online", || {
        app.engine.registry.get(&first_user).is_some()
    })
    .await;

    identity_tx
        .send(Some(Identity::new(second_user, second_token)))
        .unwrap();
    eventually("second user online", || {
        app.engine.registry.get(&second_user).is_some()
    })
    .await;

    consumer.shutdown().await;
}
