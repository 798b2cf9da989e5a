//! Notification presentation state.

pub mod center;
pub mod presenter;
pub mod store;

pub use center::{NotificationCenter, NotificationEntry};
pub use presenter::NotificationPresenter;
pub use store::{HttpReadReceiptStore, ReadReceiptStore, StoredNotification};
