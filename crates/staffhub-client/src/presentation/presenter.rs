//! Wires the notification center to the event bus and the read-receipt store.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use staffhub_core::error::AppError;
use staffhub_realtime::MessageId;

use crate::events::{ClientEvent, EventBus};

use super::center::{NotificationCenter, NotificationEntry};
use super::store::ReadReceiptStore;

/// Shared notification center fed from the event bus.
///
/// Read flags change locally first. The store is then told in the
/// background; if that fails the failure is logged and the local flag stays.
#[derive(Clone)]
pub struct NotificationPresenter {
    center: Arc<Mutex<NotificationCenter>>,
    store: Arc<dyn ReadReceiptStore>,
}

impl std::fmt::Debug for NotificationPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPresenter")
            .field("center", &self.center)
            .finish_non_exhaustive()
    }
}

impl NotificationPresenter {
    pub fn new(capacity: usize, store: Arc<dyn ReadReceiptStore>) -> Self {
        Self {
            center: Arc::new(Mutex::new(NotificationCenter::new(capacity))),
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NotificationCenter> {
        self.center
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Listen on `bus` until it closes.
    pub fn attach(&self, bus: &EventBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let presenter = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        presenter.apply(event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Notification presenter fell behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Notification presenter detached");
        })
    }

    /// Fold one event into the center.
    ///
    /// Returns `true` only when a notification not seen before entered the
    /// history.
    pub fn apply(&self, event: ClientEvent) -> bool {
        let mut center = self.lock();
        match event {
            ClientEvent::Connection(state) => {
                center.set_connected(state.is_connected());
                false
            }
            ClientEvent::Notification(message) => {
                let id = message.id.clone();
                let added = center.push(message);
                if !added {
                    debug!(message_id = %id, "Duplicate notification ignored");
                }
                added
            }
        }
    }

    /// Mark one notification read.
    ///
    /// Returns the background persistence task, or `None` if nothing changed.
    pub fn mark_as_read(&self, id: &MessageId) -> Option<JoinHandle<()>> {
        if !self.lock().mark_as_read(id) {
            return None;
        }
        let store = Arc::clone(&self.store);
        let id = id.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = store.mark_read(&id).await {
                warn!(message_id = %id, error = %e, "Failed to persist read receipt");
            }
        }))
    }

    /// Mark every notification read and persist in the background.
    pub fn mark_all_as_read(&self) -> JoinHandle<()> {
        let changed = self.lock().mark_all_as_read();
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.mark_all_read().await {
                warn!(changed, error = %e, "Failed to persist read-all receipt");
            }
        })
    }

    /// Seed history from the store. Returns how many entries were added.
    pub async fn hydrate(&self, limit: usize) -> Result<usize, AppError> {
        let stored = self.store.list(limit).await?;
        let added = self.lock().seed(stored);
        debug!(added, "Notification history hydrated");
        Ok(added)
    }

    pub fn unread_count(&self) -> usize {
        self.lock().unread_count()
    }

    /// Snapshot of the history, newest first.
    pub fn entries(&self) -> Vec<NotificationEntry> {
        self.lock().entries().cloned().collect()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }
}
