//! Wire protocol
//!
//! The binary frame format spoken over the WebSocket: a one-byte opcode
//! followed by 0xFF-delimited fields. Client-bound and server-bound tags
//! overlap numerically and are disambiguated by direction.

mod error;
mod frames;
mod opcodes;

pub use error::ProtocolError;
pub use frames::{ClientFrame, ServerFrame, SENTINEL};
pub use opcodes::{ClientOp, ServerOp};
