//! Stream ingress: turns an authenticated request into a registered
//! connection and unregisters it when the stream ends.

use std::sync::Arc;

use futures::Stream;
use tracing::{debug, info};

use staffhub_core::error::AppError;
use staffhub_core::types::{ConnectionId, UserId};

use crate::metrics::RealtimeMetrics;

use super::authenticator::{AuthenticatedUser, Authenticator};
use super::handle::Connection;
use super::outbound::{OutboundReceiver, outbound_channel};
use super::registry::ConnectionStore;

/// Accepts event stream subscriptions.
#[derive(Debug, Clone)]
pub struct StreamIngress {
    registry: Arc<dyn ConnectionStore>,
    metrics: Arc<RealtimeMetrics>,
    queue_capacity: usize,
}

impl StreamIngress {
    /// Creates a new ingress over `registry`.
    pub fn new(
        registry: Arc<dyn ConnectionStore>,
        metrics: Arc<RealtimeMetrics>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            registry,
            metrics,
            queue_capacity,
        }
    }

    /// Authenticate `token` and open a subscription.
    ///
    /// On failure nothing is registered.
    pub async fn open(
        &self,
        authenticator: &dyn Authenticator,
        token: &str,
    ) -> Result<StreamSubscription, AppError> {
        let user = authenticator.authenticate(token).await?;
        Ok(self.accept(user))
    }

    /// Register a connection for an already authenticated user.
    ///
    /// A previous connection of the same user is closed and replaced.
    pub fn accept(&self, user: AuthenticatedUser) -> StreamSubscription {
        let (sender, receiver) = outbound_channel(self.queue_capacity);
        let connection = Connection::new(user.user_id, user.role, user.username, Arc::new(sender));
        let connection_id = connection.id;

        if let Some(replaced) = self.registry.register(connection) {
            replaced.close();
            self.metrics.connection_replaced();
            info!(
                user_id = %user.user_id,
                replaced = %replaced.id,
                connection_id = %connection_id,
                "Replaced existing notification stream"
            );
        }
        self.metrics.connection_opened();
        info!(
            user_id = %user.user_id,
            connection_id = %connection_id,
            online = self.registry.len(),
            "Notification stream opened"
        );

        StreamSubscription {
            user_id: user.user_id,
            connection_id,
            receiver,
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// An open stream. Yields serialized notifications and unregisters its
/// connection when dropped.
#[derive(Debug)]
pub struct StreamSubscription {
    user_id: UserId,
    connection_id: ConnectionId,
    receiver: OutboundReceiver,
    registry: Arc<dyn ConnectionStore>,
    metrics: Arc<RealtimeMetrics>,
}

impl StreamSubscription {
    /// Owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Connection id assigned at registration.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Next notification's JSON, or `None` once the connection was closed
    /// (replaced, evicted, or shut down) and drained.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.receiver.recv().await
    }

    /// Adapt into a stream of JSON payloads. Dropping the stream drops the
    /// subscription.
    pub fn into_stream(self) -> impl Stream<Item = Arc<str>> + Send + 'static {
        futures::stream::unfold(self, |mut sub| async move {
            let frame = sub.recv().await?;
            Some((frame, sub))
        })
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        if self
            .registry
            .unregister_connection(&self.user_id, &self.connection_id)
            .is_some()
        {
            self.metrics.connection_closed();
            info!(
                user_id = %self.user_id,
                connection_id = %self.connection_id,
                online = self.registry.len(),
                "Notification stream closed"
            );
        } else {
            debug!(
                user_id = %self.user_id,
                connection_id = %self.connection_id,
                "Stream ended after its connection was already removed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::registry::InMemoryRegistry;
    use staffhub_core::types::Role;

    fn ingress() -> (StreamIngress, Arc<InMemoryRegistry>, Arc<RealtimeMetrics>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let metrics = Arc::new(RealtimeMetrics::new());
        let ingress = StreamIngress::new(registry.clone(), metrics.clone(), 8);
        (ingress, registry, metrics)
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::new(),
            role,
            username: "u".to_string(),
        }
    }

    /// Accepts the token "good" as a manager, rejects everything else.
    struct FixedAuthenticator(UserId);

    #[async_trait::async_trait]
    impl Authenticator for FixedAuthenticator {
        async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
            if token == "good" {
                Ok(AuthenticatedUser {
                    user_id: self.0,
                    role: Role::manager(),
                    username: "m".to_string(),
                })
            } else {
                Err(AppError::authentication("Invalid or expired token"))
            }
        }
    }

    #[tokio::test]
    async fn test_open_rejects_without_registering() {
        let (ingress, registry, metrics) = ingress();
        let auth = FixedAuthenticator(UserId::new());

        assert!(ingress.open(&auth, "bad").await.is_err());
        assert!(registry.is_empty());
        assert_eq!(metrics.snapshot().connections_opened, 0);
    }

    #[tokio::test]
    async fn test_open_registers_with_role() {
        let (ingress, registry, _) = ingress();
        let user_id = UserId::new();
        let auth = FixedAuthenticator(user_id);

        let sub = ingress.open(&auth, "good").await.unwrap();
        assert_eq!(sub.user_id(), user_id);
        assert_eq!(registry.get(&user_id).unwrap().role, Role::manager());
    }

    #[tokio::test]
    async fn test_drop_unregisters() {
        let (ingress, registry, metrics) = ingress();
        let sub = ingress.accept(user(Role::employee()));
        assert_eq!(registry.len(), 1);
        drop(sub);
        assert!(registry.is_empty());
        assert_eq!(metrics.snapshot().connections_closed, 1);
    }

    #[tokio::test]
    async fn test_reconnect_replaces_and_ends_old_stream() {
        let (ingress, registry, metrics) = ingress();
        let who = user(Role::employee());
        let mut old = ingress.accept(who.clone());
        let new = ingress.accept(who.clone());

        assert_eq!(old.recv().await, None);
        drop(old);
        assert_eq!(
            registry.get(&who.user_id).map(|c| c.id),
            Some(new.connection_id())
        );
        assert_eq!(metrics.snapshot().connections_replaced, 1);
    }

    #[tokio::test]
    async fn test_into_stream_yields_pushed_frames() {
        use futures::StreamExt;

        let (ingress, registry, _) = ingress();
        let who = user(Role::admin());
        let stream = ingress.accept(who.clone()).into_stream();
        let conn = registry.get(&who.user_id).unwrap();
        conn.push(Arc::from("{\"n\":1}")).unwrap();
        conn.close();

        let frames: Vec<Arc<str>> = stream.collect().await;
        assert_eq!(frames.len(), 1);
        assert!(registry.is_empty());
    }
}
