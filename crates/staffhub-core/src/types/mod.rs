//! Shared domain types.

pub mod id;
pub mod role;

pub use id::{ConnectionId, UserId};
pub use role::Role;
