//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tracing::info;

use staffhub_core::config::RealtimeConfig;

use crate::connection::ingress::StreamIngress;
use crate::connection::registry::{ConnectionStore, InMemoryRegistry};
use crate::metrics::RealtimeMetrics;
use crate::notification::dispatcher::BroadcastDispatcher;

/// Central real-time engine: one registry shared by the ingress that fills
/// it and the dispatcher that reads it.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub registry: Arc<dyn ConnectionStore>,
    /// Broadcast dispatcher.
    pub dispatcher: BroadcastDispatcher,
    /// Stream ingress.
    pub ingress: StreamIngress,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    pub config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.len())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new engine over an in-memory registry.
    pub fn new(config: RealtimeConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryRegistry::new()))
    }

    /// Creates a new engine over the given connection store.
    pub fn with_store(config: RealtimeConfig, registry: Arc<dyn ConnectionStore>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry), Arc::clone(&metrics));
        let ingress = StreamIngress::new(
            Arc::clone(&registry),
            Arc::clone(&metrics),
            config.outbound_queue_capacity,
        );

        info!(
            queue_capacity = config.outbound_queue_capacity,
            keep_alive_seconds = config.keep_alive_seconds,
            "Real-time engine initialized"
        );

        Self {
            registry,
            dispatcher,
            ingress,
            metrics,
            config,
        }
    }

    /// Number of connected users.
    pub fn online_count(&self) -> usize {
        self.registry.len()
    }

    /// Close every open stream. Clients see their stream end and reconnect
    /// according to their own policy.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let closed = self.registry.close_all();
        info!(closed, "Real-time engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::authenticator::AuthenticatedUser;
    use staffhub_core::types::{Role, UserId};

    #[tokio::test]
    async fn test_shutdown_ends_open_streams() {
        let engine = RealtimeEngine::new(RealtimeConfig::default());
        let mut sub = engine.ingress.accept(AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::employee(),
            username: "e".to_string(),
        });
        assert_eq!(engine.online_count(), 1);

        engine.shutdown();
        assert_eq!(engine.online_count(), 0);
        assert_eq!(sub.recv().await, None);
    }
}
