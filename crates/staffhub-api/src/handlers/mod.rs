//! Route handlers.

pub mod connections;
pub mod dispatch;
pub mod health;
pub mod stream;
