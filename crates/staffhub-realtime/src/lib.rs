//! # staffhub-realtime
//!
//! Real-time notification fan-out for StaffHub. Provides:
//!
//! - Wire message types and the `data: <json>` event stream frame codec
//! - A connection registry holding one push channel per connected user,
//!   together with the role captured when the user connected
//! - A broadcast dispatcher delivering to one user, all users, or users of
//!   selected roles, evicting connections whose writes fail
//! - The stream ingress contract: authenticate, register, unregister on close
//! - Notification formatters for attendance and task events
//! - Delivery metrics
//!
//! The registry lives in process memory, so a deployment with several
//! server processes only reaches the users connected to the process that
//! dispatches. [`ConnectionStore`] is the seam for a broker-backed store.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use connection::authenticator::{AuthenticatedUser, Authenticator, JwtAuthenticator};
pub use connection::ingress::{StreamIngress, StreamSubscription};
pub use connection::registry::{ConnectionStore, InMemoryRegistry};
pub use message::{
    MessageId, NotificationBuilder, NotificationDraft, NotificationKind, NotificationMessage,
    Severity,
};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use notification::dispatcher::{BroadcastDispatcher, DeliveryReport};
pub use notification::formatter::NotificationFormatter;
pub use server::RealtimeEngine;
