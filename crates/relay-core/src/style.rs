//! Message style bitflags and styled segments
//!
//! A chat message travels on the wire as an ordered list of styled runs of
//! text. Each run carries a one-byte style bitset; a block break is a
//! separate marker that carries no content.

use bitflags::bitflags;

bitflags! {
    /// Inline text style flags
    ///
    /// Stored as a single byte on the wire. The empty set renders as plain
    /// text. Bit 6 is reserved for the block-break marker ([`NEW_BLOCK`])
    /// and is never combined with these flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageStyle: u8 {
        const BOLD          = 1;
        const ITALIC        = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        /// Inline code span; contents are rendered and transmitted literally
        const CODE          = 1 << 4;
        /// Message originates from the server, not an attributed sender
        const SERVER        = 1 << 5;
        /// Content is a detected URL
        const LINK          = 1 << 7;
    }
}

/// Wire style byte marking a block break within a message.
///
/// Not a [`MessageStyle`] flag: a block break has no content and no other
/// styling, so the byte stands alone.
pub const NEW_BLOCK: u8 = 1 << 6;

/// One element of a message body: a styled run of text, or a block break
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of text rendered with the given style
    Styled {
        style: MessageStyle,
        content: String,
    },
    /// Start a new visual block within the same message
    NewBlock,
}

impl Segment {
    /// Create a styled segment
    pub fn styled(style: MessageStyle, content: impl Into<String>) -> Self {
        Self::Styled {
            style,
            content: content.into(),
        }
    }

    /// Create a plain (unstyled) segment
    pub fn plain(content: impl Into<String>) -> Self {
        Self::styled(MessageStyle::empty(), content)
    }

    /// Create a server-styled segment
    pub fn server(content: impl Into<String>) -> Self {
        Self::styled(MessageStyle::SERVER, content)
    }

    /// Get the segment content, if it carries any
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Styled { content, .. } => Some(content),
            Self::NewBlock => None,
        }
    }

    /// Get the segment style, if it carries one
    pub fn style(&self) -> Option<MessageStyle> {
        match self {
            Self::Styled { style, .. } => Some(*style),
            Self::NewBlock => None,
        }
    }
}

/// Mark every styled segment as server-originated
///
/// Block breaks pass through untouched; server styling applies to text runs
/// only.
pub fn server_styled(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Styled { style, content } => Segment::Styled {
                style: style | MessageStyle::SERVER,
                content,
            },
            Segment::NewBlock => Segment::NewBlock,
        })
        .collect()
}
