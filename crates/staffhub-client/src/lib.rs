//! # staffhub-client
//!
//! Client side of StaffHub real-time notifications:
//!
//! - [`StreamConsumer`] keeps one event stream open for the current
//!   identity, reconnecting after failures according to a
//!   [`ReconnectPolicy`]
//! - [`EventBus`] republishes connection state changes and decoded
//!   notifications to any number of listeners
//! - [`NotificationPresenter`] keeps the bounded, deduplicated notification
//!   history with read flags, persisting read receipts best-effort

pub mod consumer;
pub mod error;
pub mod events;
pub mod identity;
pub mod presentation;

pub use consumer::backoff::ReconnectPolicy;
pub use consumer::state::ConnectionState;
pub use consumer::transport::{ByteStream, HttpTransport, Transport};
pub use consumer::{ConsumerHandle, StreamConsumer};
pub use error::TransportError;
pub use events::{ClientEvent, EventBus};
pub use identity::Identity;
pub use presentation::{
    HttpReadReceiptStore, NotificationCenter, NotificationEntry, NotificationPresenter,
    ReadReceiptStore, StoredNotification,
};
