//! # staffhub-core
//!
//! Core crate for StaffHub real-time notifications. Contains configuration
//! schemas, typed identifiers, the role type, and the unified error system.
//!
//! This crate has **no** internal dependencies on other StaffHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
