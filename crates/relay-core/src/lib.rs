//! # relay-core
//!
//! Domain layer containing the message style model, styled segments,
//! name/room validation, and the rich-text formatter.
//! This crate has zero dependencies on infrastructure (sockets, web framework, etc.).

pub mod markdown;
pub mod style;
pub mod validate;

// Re-export commonly used types at crate root
pub use markdown::parse_markdown;
pub use style::{server_styled, MessageStyle, Segment, NEW_BLOCK};
pub use validate::{is_valid_name, MAX_NAME_LEN, MAX_TEXT_BYTES};
