//! # staffhub-api
//!
//! HTTP API layer for StaffHub notifications built on Axum.
//!
//! Hosts the event stream endpoint (the stream ingress), the producer
//! dispatch endpoint, health checks, middleware (CORS, request logging,
//! role guards), the authenticated-user extractor, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
