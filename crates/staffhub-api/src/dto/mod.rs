//! Request and response DTOs.

pub mod request;
pub mod response;

pub use request::{DispatchRequest, DispatchTarget};
pub use response::{ApiResponse, DetailedHealthResponse, HealthResponse};
