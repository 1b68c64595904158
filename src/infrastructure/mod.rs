pub mod connection_registry;
pub mod logging;

pub use connection_registry::{ConnectionId, ConnectionRegistry};
