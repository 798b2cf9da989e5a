//! Typed in-process event bus.

use tokio::sync::broadcast;

use staffhub_realtime::NotificationMessage;

use crate::consumer::state::ConnectionState;

/// Events published by the stream consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The consumer entered a new connection state.
    Connection(ConnectionState),
    /// A notification frame was received and decoded.
    Notification(NotificationMessage),
}

/// Fan-out channel for [`ClientEvent`]s.
///
/// Slow listeners that fall more than the buffer behind lose the oldest
/// events and are told how many they missed.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event; returns how many listeners received it.
    pub fn publish(&self, event: ClientEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Start listening. Only events published after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Number of current listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
