//! # relay-gateway
//!
//! WebSocket gateway for the relay chat service: binary wire codec,
//! per-connection session state, room broadcast, command interpreter,
//! and the liveness monitor.

pub mod connection;
pub mod handlers;
pub mod liveness;
pub mod protocol;
pub mod server;
pub mod transcode;

pub use server::run;
