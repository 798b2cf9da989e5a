//! Notification message types, builders, and event stream framing.

pub mod builder;
pub mod envelope;
pub mod frame;
pub mod types;

pub use builder::NotificationBuilder;
pub use frame::{FrameDecoder, FrameError};
pub use types::{
    MessageId, NotificationDraft, NotificationKind, NotificationMessage, Payload, Severity,
};
