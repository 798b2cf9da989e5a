//! # staffhub-auth
//!
//! Access token handling for StaffHub. Tokens are minted by the login
//! service; the event stream only needs to verify them and read the user id
//! and role they carry.
//!
//! ## Modules
//!
//! - `jwt` — JWT claims, encoding, and validation

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, read_unverified};
