//! Bounded per-connection outbound queue.
//!
//! When a client reads slower than notifications arrive, the oldest pending
//! frame is dropped instead of blocking the dispatcher.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::handle::{ChannelError, Delivery, PushChannel};

struct Shared {
    queue: Mutex<VecDeque<Arc<str>>>,
    capacity: usize,
    notify: Notify,
    sender_closed: AtomicBool,
    receiver_closed: AtomicBool,
}

/// Create a connected sender/receiver pair holding at most `capacity`
/// pending frames (minimum 1).
pub fn outbound_channel(capacity: usize) -> (OutboundSender, OutboundReceiver) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
        capacity,
        notify: Notify::new(),
        sender_closed: AtomicBool::new(false),
        receiver_closed: AtomicBool::new(false),
    });
    (
        OutboundSender {
            shared: Arc::clone(&shared),
        },
        OutboundReceiver { shared },
    )
}

/// Writing half, stored in the registry.
pub struct OutboundSender {
    shared: Arc<Shared>,
}

impl PushChannel for OutboundSender {
    fn push(&self, data: Arc<str>) -> Result<Delivery, ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }

        let delivery = {
            let mut queue = self
                .shared
                .queue
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            let delivery = if queue.len() >= self.shared.capacity {
                queue.pop_front();
                Delivery::Displaced
            } else {
                Delivery::Queued
            };
            queue.push_back(data);
            delivery
        };

        self.shared.notify.notify_one();
        Ok(delivery)
    }

    fn close(&self) {
        self.shared.sender_closed.store(true, Ordering::SeqCst);
        self.shared.notify.notify_one();
    }

    fn is_closed(&self) -> bool {
        self.shared.sender_closed.load(Ordering::SeqCst)
            || self.shared.receiver_closed.load(Ordering::SeqCst)
    }
}

impl Drop for OutboundSender {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for OutboundSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundSender")
            .field("capacity", &self.shared.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Reading half, owned by the stream response.
pub struct OutboundReceiver {
    shared: Arc<Shared>,
}

impl OutboundReceiver {
    /// Wait for the next frame. Returns `None` once the sender has closed
    /// and every queued frame has been taken.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        loop {
            {
                let mut queue = self
                    .shared
                    .queue
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                if let Some(frame) = queue.pop_front() {
                    return Some(frame);
                }
                if self.shared.sender_closed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            self.shared.notify.notified().await;
        }
    }

    /// Number of frames waiting to be read.
    pub fn pending(&self) -> usize {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Drop for OutboundReceiver {
    fn drop(&mut self) {
        self.shared.receiver_closed.store(true, Ordering::SeqCst);
        self.shared
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl fmt::Debug for OutboundReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundReceiver")
            .field("pending", &self.pending())
            .finish()
    }
}
