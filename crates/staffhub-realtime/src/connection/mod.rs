//! Connection management: push channels, the registry, authentication, and
//! stream ingress.

pub mod authenticator;
pub mod handle;
pub mod ingress;
pub mod outbound;
pub mod registry;

pub use authenticator::{AuthenticatedUser, Authenticator, JwtAuthenticator};
pub use handle::{ChannelError, Connection, ConnectionInfo, Delivery, PushChannel};
pub use registry::{ConnectionStore, InMemoryRegistry};
