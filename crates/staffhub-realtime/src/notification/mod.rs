//! Notification dispatch and formatting.

pub mod dispatcher;
pub mod formatter;

pub use dispatcher::{BroadcastDispatcher, DeliveryReport};
pub use formatter::NotificationFormatter;
