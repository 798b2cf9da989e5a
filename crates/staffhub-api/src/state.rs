//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use staffhub_core::config::AppConfig;
use staffhub_realtime::{Authenticator, RealtimeEngine};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time engine (registry, dispatcher, ingress)
    pub realtime: Arc<RealtimeEngine>,
    /// Token authenticator for API and stream requests
    pub authenticator: Arc<dyn Authenticator>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates application state.
    pub fn new(
        config: Arc<AppConfig>,
        realtime: Arc<RealtimeEngine>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            realtime,
            authenticator,
            started_at: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .finish_non_exhaustive()
    }
}
