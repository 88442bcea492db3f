//! Rich-text formatter
//!
//! Turns one raw message string into a flat, ordered list of styled
//! segments. Two passes:
//!
//! 1. An inline-markup pass: a recursive-descent scan over an ordered list
//!    of delimiter pairs. At each position the delimiters are tried in
//!    priority order (code, bold+italic, bold, italic, underline,
//!    strikethrough); the leftmost match wins and its closer is the nearest
//!    one that leaves non-empty content. Matched content inherits the
//!    enclosing style OR'ed with the matched style and is re-scanned, so
//!    nesting resolves; code spans are never re-scanned and keep their
//!    contents literally. Where the scan bottoms out, backslash escapes are
//!    resolved to their literal characters.
//! 2. A link-detection pass: the first URL in each non-code leaf splits it
//!    into pre / link / post. Only the first URL per leaf is detected.

use regex::Regex;
use std::sync::LazyLock;

use crate::style::{MessageStyle, Segment};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // http(s):// or www. forms, at least two characters after the final dot
    Regex::new(r"(?:https?://|www\.)\S+\.\S{2,}").expect("url pattern is valid")
});

/// Characters a backslash escapes in message text
const ESCAPABLE: [char; 5] = ['\\', '`', '*', '_', '~'];

/// Parse a raw message string into styled segments
///
/// Text containing no markup comes back as a single plain segment equal to
/// the input. Block breaks are never produced here; they are injected by
/// the sender-header step upstream.
pub fn parse_markdown(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    parse_inline(text, MessageStyle::empty(), &mut segments);
    linkify(segments)
}

/// A delimited span found by the scanner, in byte offsets
struct Span {
    start: usize,
    content_start: usize,
    content_end: usize,
    end: usize,
    style: MessageStyle,
}

fn parse_inline(text: &str, style: MessageStyle, out: &mut Vec<Segment>) {
    let mut rest = text;
    while let Some(span) = find_span(rest) {
        let pre = &rest[..span.start];
        if !pre.is_empty() {
            out.push(Segment::styled(style, unescape(pre)));
        }

        let content = &rest[span.content_start..span.content_end];
        let inner = style | span.style;
        if inner.contains(MessageStyle::CODE) {
            // code spans keep their contents literally
            out.push(Segment::styled(inner, content.to_string()));
        } else {
            parse_inline(content, inner, out);
        }

        rest = &rest[span.end..];
    }
    if !rest.is_empty() {
        out.push(Segment::styled(style, unescape(rest)));
    }
}

/// Find the leftmost markup span; at equal positions, priority order decides
fn find_span(text: &str) -> Option<Span> {
    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] == b'`' {
            if let Some(span) = close_simple(text, i, "`", MessageStyle::CODE) {
                return Some(span);
            }
        }
        if bytes[i..].starts_with(b"***") {
            if let Some(span) =
                close_simple(text, i, "***", MessageStyle::BOLD | MessageStyle::ITALIC)
            {
                return Some(span);
            }
        }
        if bytes[i..].starts_with(b"**") {
            if let Some(span) = close_simple(text, i, "**", MessageStyle::BOLD) {
                return Some(span);
            }
        }
        if bytes[i] == b'*' && (i == 0 || bytes[i - 1] != b'\\') {
            if let Some(span) = close_italic(text, i) {
                return Some(span);
            }
        }
        if bytes[i..].starts_with(b"__") {
            if let Some(span) = close_simple(text, i, "__", MessageStyle::UNDERLINE) {
                return Some(span);
            }
        }
        if bytes[i..].starts_with(b"~~") {
            if let Some(span) = close_simple(text, i, "~~", MessageStyle::STRIKETHROUGH) {
                return Some(span);
            }
        }
    }
    None
}

/// Match a symmetric delimiter at `open_at`: nearest closer with at least
/// one character of content, which may not cross a line break
fn close_simple(text: &str, open_at: usize, delim: &str, style: MessageStyle) -> Option<Span> {
    let content_start = open_at + delim.len();
    let rel = text.get(content_start + 1..)?.find(delim)?;
    let content_end = content_start + 1 + rel;
    if text[content_start..content_end].contains('\n') {
        return None;
    }
    Some(Span {
        start: open_at,
        content_start,
        content_end,
        end: content_end + delim.len(),
        style,
    })
}

/// Match an italic span: the closer may not follow a backslash, so an
/// escaped `*` extends the content
fn close_italic(text: &str, open_at: usize) -> Option<Span> {
    let bytes = text.as_bytes();
    let content_start = open_at + 1;
    let mut j = content_start + 1;
    while j < bytes.len() {
        if bytes[j] == b'*' {
            if text[content_start..j].contains('\n') {
                return None;
            }
            if bytes[j - 1] != b'\\' {
                return Some(Span {
                    start: open_at,
                    content_start,
                    content_end: j,
                    end: j + 1,
                    style: MessageStyle::ITALIC,
                });
            }
        }
        j += 1;
    }
    None
}

/// Resolve backslash escapes to their literal characters
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if ESCAPABLE.contains(&next) {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(c);
    }
    result
}

/// Split each non-code leaf around the first detected URL
///
/// Empty pre/post pieces are kept as-is; later URLs in the same leaf are
/// left undetected.
fn linkify(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Styled { style, content } if !style.contains(MessageStyle::CODE) => {
                if let Some(m) = URL_RE.find(&content) {
                    out.push(Segment::styled(style, &content[..m.start()]));
                    out.push(Segment::styled(style | MessageStyle::LINK, m.as_str()));
                    out.push(Segment::styled(style, &content[m.end()..]));
                } else {
                    out.push(Segment::Styled { style, content });
                }
            }
            other => out.push(other),
        }
    }
    out
}
