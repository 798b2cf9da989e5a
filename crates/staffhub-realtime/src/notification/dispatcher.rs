//! Broadcast dispatcher: delivers one notification to one user, a list of
//! users, everybody, or the users holding given roles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use staffhub_core::error::AppError;
use staffhub_core::types::{Role, UserId};

use crate::connection::handle::{Connection, Delivery};
use crate::connection::registry::ConnectionStore;
use crate::message::frame;
use crate::message::types::{MessageId, NotificationDraft, NotificationMessage};
use crate::metrics::RealtimeMetrics;

/// Outcome of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Id of the dispatched message.
    pub message_id: MessageId,
    /// Connections the message was addressed to.
    pub targeted: usize,
    /// Connections that accepted the message.
    pub delivered: usize,
    /// Connections removed because the push failed.
    pub evicted: usize,
}

impl DeliveryReport {
    fn empty(message_id: MessageId) -> Self {
        Self {
            message_id,
            targeted: 0,
            delivered: 0,
            evicted: 0,
        }
    }
}

/// Fans notifications out over the connection registry.
///
/// A failed push evicts that one connection; the remaining recipients are
/// still attempted and the failure never reaches the caller.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<dyn ConnectionStore>,
    metrics: Arc<RealtimeMetrics>,
}

impl BroadcastDispatcher {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: Arc<dyn ConnectionStore>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Deliver to a single user. A user without a connection is a no-op.
    pub fn send_to_user(
        &self,
        user_id: UserId,
        draft: NotificationDraft,
    ) -> Result<DeliveryReport, AppError> {
        let message = draft.stamp_for(user_id);
        let targets: Vec<Connection> = self.registry.get(&user_id).into_iter().collect();
        self.deliver(&message, targets)
    }

    /// Deliver the same message to each listed user that is connected.
    ///
    /// The message is stamped once, so every recipient sees the same id;
    /// `userId` is omitted from the frame.
    pub fn send_to_users(
        &self,
        user_ids: &[UserId],
        draft: NotificationDraft,
    ) -> Result<DeliveryReport, AppError> {
        let message = draft.stamp_broadcast();
        let targets: Vec<Connection> = user_ids
            .iter()
            .filter_map(|user_id| self.registry.get(user_id))
            .collect();
        self.deliver(&message, targets)
    }

    /// Deliver to every connected user.
    pub fn broadcast_all(&self, draft: NotificationDraft) -> Result<DeliveryReport, AppError> {
        let message = draft.stamp_broadcast();
        let targets = self.registry.snapshot(None);
        self.deliver(&message, targets)
    }

    /// Deliver to every connected user whose connect-time role is in
    /// `roles`. An empty role list reaches nobody.
    pub fn broadcast_to_roles(
        &self,
        draft: NotificationDraft,
        roles: &[Role],
    ) -> Result<DeliveryReport, AppError> {
        let message = draft.stamp_broadcast();
        let targets = self.registry.snapshot(Some(roles));
        self.deliver(&message, targets)
    }

    fn deliver(
        &self,
        message: &NotificationMessage,
        targets: Vec<Connection>,
    ) -> Result<DeliveryReport, AppError> {
        self.metrics.message_dispatched();
        let mut report = DeliveryReport::empty(message.id.clone());
        if targets.is_empty() {
            debug!(message_id = %message.id, "No connected recipients");
            return Ok(report);
        }

        let data: Arc<str> = Arc::from(frame::to_data(message)?);
        report.targeted = targets.len();

        for connection in targets {
            match connection.push(Arc::clone(&data)) {
                Ok(delivery) => {
                    if delivery == Delivery::Displaced {
                        self.metrics.frame_dropped();
                        debug!(
                            user_id = %connection.user_id,
                            connection_id = %connection.id,
                            "Outbound queue full, dropped oldest frame"
                        );
                    }
                    self.metrics.delivered();
                    report.delivered += 1;
                }
                Err(e) => {
                    self.metrics.delivery_failed();
                    warn!(
                        user_id = %connection.user_id,
                        connection_id = %connection.id,
                        message_id = %message.id,
                        error = %e,
                        "Push failed, evicting connection"
                    );
                    if self
                        .registry
                        .unregister_connection(&connection.user_id, &connection.id)
                        .is_some()
                    {
                        self.metrics.connection_evicted();
                        report.evicted += 1;
                    }
                    connection.close();
                }
            }
        }

        debug!(
            message_id = %message.id,
            targeted = report.targeted,
            delivered = report.delivered,
            evicted = report.evicted,
            "Notification dispatched"
        );
        Ok(report)
    }
}
