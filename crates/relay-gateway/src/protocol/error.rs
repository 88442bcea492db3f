//! Protocol error types

use thiserror::Error;

/// Errors produced while decoding a wire frame
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The buffer was empty
    #[error("empty frame")]
    Empty,

    /// The leading byte is not a known opcode for this direction
    #[error("unknown opcode: {0}")]
    UnknownOpcode(u8),

    /// A required field sentinel was not found
    #[error("missing field sentinel")]
    MissingSentinel,

    /// A text field was not valid UTF-8
    #[error("frame text is not valid UTF-8")]
    InvalidText(#[from] std::str::Utf8Error),

    /// A fixed-size frame carried extra bytes
    #[error("unexpected trailing bytes")]
    TrailingBytes,

    /// A segment stream ended mid-segment
    #[error("truncated segment")]
    TruncatedSegment,
}
