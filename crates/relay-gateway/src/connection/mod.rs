//! Connection management
//!
//! Per-socket session state and the shared registry of live connections.

mod connection;
mod registry;

pub use connection::{Connection, Outbound};
pub use registry::ConnectionRegistry;
