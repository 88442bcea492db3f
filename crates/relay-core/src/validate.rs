//! Identifier validation and size limits
//!
//! Display names and room names share one charset: 1-16 visible ASCII
//! alphanumerics and punctuation. The set excludes spaces and the 0xFF
//! field sentinel, so a valid identifier can always be scanned for on the
//! raw byte stream.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a display name or room name, in bytes
pub const MAX_NAME_LEN: usize = 16;

/// Maximum length of a chat message, in bytes
pub const MAX_TEXT_BYTES: usize = 2048;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9\-_!@#$%^&*()`~{}\[\]\\|;':",.<>/?]{1,16}$"#)
        .expect("name pattern is valid")
});

/// Check whether a string is a valid display name or room name
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}
