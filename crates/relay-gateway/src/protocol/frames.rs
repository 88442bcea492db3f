//! Typed wire frames and the binary codec
//!
//! Frame layout: byte 0 is the opcode; the remainder is one or more fields
//! separated by the 0xFF sentinel. The sentinel never appears in valid
//! name/room text (charset invariant) and never equals a UTF-8 continuation
//! byte, so scanning raw bytes for it is unambiguous. A styled message
//! repeats a `(sentinel, style byte, content)` triple per segment; the last
//! segment's content runs to end of buffer. Raw attachment bytes are always
//! the final field, so they may contain the sentinel value freely.

use relay_core::{MessageStyle, Segment, NEW_BLOCK};

use super::error::ProtocolError;
use super::opcodes::{ClientOp, ServerOp};

/// Field delimiter byte
pub const SENTINEL: u8 = 0xFF;

/// A frame sent from client to server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Liveness probe; answered with [`ServerFrame::Pong`] in any state
    Ping,
    /// Claim or change a display name
    RequestName { name: String },
    /// Join a room
    JoinRoom { room: String },
    /// Leave a room
    LeaveRoom { room: String },
    /// Send raw message text to a room
    SendMessage { room: String, text: String },
    /// Upload an attachment for a room
    SendAttachment {
        room: String,
        mime: String,
        data: Vec<u8>,
    },
}

impl ClientFrame {
    /// Decode a client frame from raw bytes
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, rest) = buf.split_first().ok_or(ProtocolError::Empty)?;
        let op = ClientOp::from_u8(tag).ok_or(ProtocolError::UnknownOpcode(tag))?;

        match op {
            ClientOp::Ping => {
                if rest.is_empty() {
                    Ok(Self::Ping)
                } else {
                    Err(ProtocolError::TrailingBytes)
                }
            }
            ClientOp::RequestName => Ok(Self::RequestName {
                name: utf8(rest)?,
            }),
            ClientOp::JoinRoom => Ok(Self::JoinRoom { room: utf8(rest)? }),
            ClientOp::LeaveRoom => Ok(Self::LeaveRoom { room: utf8(rest)? }),
            ClientOp::SendMessage => {
                let split = find_sentinel(rest, 0).ok_or(ProtocolError::MissingSentinel)?;
                Ok(Self::SendMessage {
                    room: utf8(&rest[..split])?,
                    text: utf8(&rest[split + 1..])?,
                })
            }
            ClientOp::SendAttachment => {
                let mime_start = find_sentinel(rest, 0).ok_or(ProtocolError::MissingSentinel)?;
                let data_start = find_sentinel(rest, mime_start + 1)
                    .ok_or(ProtocolError::MissingSentinel)?;
                Ok(Self::SendAttachment {
                    room: utf8(&rest[..mime_start])?,
                    mime: utf8(&rest[mime_start + 1..data_start])?,
                    data: rest[data_start + 1..].to_vec(),
                })
            }
        }
    }

    /// Encode a client frame to raw bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Ping => vec![ClientOp::Ping.as_u8()],
            Self::RequestName { name } => tagged_text(ClientOp::RequestName.as_u8(), name),
            Self::JoinRoom { room } => tagged_text(ClientOp::JoinRoom.as_u8(), room),
            Self::LeaveRoom { room } => tagged_text(ClientOp::LeaveRoom.as_u8(), room),
            Self::SendMessage { room, text } => {
                let mut buf = Vec::with_capacity(2 + room.len() + text.len());
                buf.push(ClientOp::SendMessage.as_u8());
                buf.extend_from_slice(room.as_bytes());
                buf.push(SENTINEL);
                buf.extend_from_slice(text.as_bytes());
                buf
            }
            Self::SendAttachment { room, mime, data } => {
                let mut buf = Vec::with_capacity(3 + room.len() + mime.len() + data.len());
                buf.push(ClientOp::SendAttachment.as_u8());
                buf.extend_from_slice(room.as_bytes());
                buf.push(SENTINEL);
                buf.extend_from_slice(mime.as_bytes());
                buf.push(SENTINEL);
                buf.extend_from_slice(data);
                buf
            }
        }
    }
}

/// A frame sent from server to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Reply to [`ClientFrame::Ping`]
    Pong,
    /// The requested name was claimed
    NameAccepted { name: String },
    /// The requested name is held by another connection
    NameFailure,
    /// Confirmation of a room join
    RoomJoined { room: String },
    /// Confirmation of a room leave
    RoomLeft { room: String },
    /// A styled message for a room
    Message {
        room: String,
        segments: Vec<Segment>,
    },
    /// A transcoded attachment
    Attachment {
        sender: String,
        room: String,
        data: Vec<u8>,
    },
    /// A visual effect to play
    Fun { effect: u8 },
}

impl ServerFrame {
    /// Encode a server frame to raw bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Pong => vec![ServerOp::Pong.as_u8()],
            Self::NameAccepted { name } => tagged_text(ServerOp::NameAccepted.as_u8(), name),
            Self::NameFailure => vec![ServerOp::NameFailure.as_u8()],
            Self::RoomJoined { room } => tagged_text(ServerOp::RoomJoined.as_u8(), room),
            Self::RoomLeft { room } => tagged_text(ServerOp::RoomLeft.as_u8(), room),
            Self::Message { room, segments } => {
                let content_len: usize = segments
                    .iter()
                    .map(|s| 2 + s.content().map_or(0, str::len))
                    .sum();
                let mut buf = Vec::with_capacity(1 + room.len() + content_len);
                buf.push(ServerOp::Message.as_u8());
                buf.extend_from_slice(room.as_bytes());
                for segment in segments {
                    buf.push(SENTINEL);
                    match segment {
                        Segment::NewBlock => buf.push(NEW_BLOCK),
                        Segment::Styled { style, content } => {
                            buf.push(style.bits());
                            buf.extend_from_slice(content.as_bytes());
                        }
                    }
                }
                buf
            }
            Self::Attachment { sender, room, data } => {
                let mut buf = Vec::with_capacity(3 + sender.len() + room.len() + data.len());
                buf.push(ServerOp::Attachment.as_u8());
                buf.extend_from_slice(sender.as_bytes());
                buf.push(SENTINEL);
                buf.extend_from_slice(room.as_bytes());
                buf.push(SENTINEL);
                buf.extend_from_slice(data);
                buf
            }
            Self::Fun { effect } => vec![ServerOp::Fun.as_u8(), *effect],
        }
    }

    /// Decode a server frame from raw bytes
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, rest) = buf.split_first().ok_or(ProtocolError::Empty)?;
        let op = ServerOp::from_u8(tag).ok_or(ProtocolError::UnknownOpcode(tag))?;

        match op {
            ServerOp::Pong => {
                if rest.is_empty() {
                    Ok(Self::Pong)
                } else {
                    Err(ProtocolError::TrailingBytes)
                }
            }
            ServerOp::NameAccepted => Ok(Self::NameAccepted { name: utf8(rest)? }),
            ServerOp::NameFailure => {
                if rest.is_empty() {
                    Ok(Self::NameFailure)
                } else {
                    Err(ProtocolError::TrailingBytes)
                }
            }
            ServerOp::RoomJoined => Ok(Self::RoomJoined { room: utf8(rest)? }),
            ServerOp::RoomLeft => Ok(Self::RoomLeft { room: utf8(rest)? }),
            ServerOp::Message => {
                let Some(first) = find_sentinel(rest, 0) else {
                    return Ok(Self::Message {
                        room: utf8(rest)?,
                        segments: Vec::new(),
                    });
                };
                let room = utf8(&rest[..first])?;
                Ok(Self::Message {
                    room,
                    segments: decode_segments(rest, first)?,
                })
            }
            ServerOp::Attachment => {
                let room_start = find_sentinel(rest, 0).ok_or(ProtocolError::MissingSentinel)?;
                let data_start = find_sentinel(rest, room_start + 1)
                    .ok_or(ProtocolError::MissingSentinel)?;
                Ok(Self::Attachment {
                    sender: utf8(&rest[..room_start])?,
                    room: utf8(&rest[room_start + 1..data_start])?,
                    data: rest[data_start + 1..].to_vec(),
                })
            }
            ServerOp::Fun => match rest {
                [effect] => Ok(Self::Fun { effect: *effect }),
                [] => Err(ProtocolError::TruncatedSegment),
                _ => Err(ProtocolError::TrailingBytes),
            },
        }
    }
}

/// Decode the `(sentinel, style, content)` segment stream beginning at the
/// sentinel at `first`
///
/// Each segment's content ends at the next sentinel at or beyond two bytes
/// ahead; the final segment's content runs to end of buffer. A block-break
/// style byte carries no content.
fn decode_segments(buf: &[u8], first: usize) -> Result<Vec<Segment>, ProtocolError> {
    let mut segments = Vec::new();
    let mut at = first;
    loop {
        let style = *buf.get(at + 1).ok_or(ProtocolError::TruncatedSegment)?;
        let next = find_sentinel(buf, at + 2);
        let content = &buf[at + 2..next.unwrap_or(buf.len())];

        if style == NEW_BLOCK {
            segments.push(Segment::NewBlock);
        } else {
            segments.push(Segment::Styled {
                style: MessageStyle::from_bits_truncate(style),
                content: utf8(content)?,
            });
        }

        match next {
            Some(n) => at = n,
            None => return Ok(segments),
        }
    }
}

fn find_sentinel(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .iter()
        .position(|&b| b == SENTINEL)
        .map(|i| from + i)
}

fn tagged_text(tag: u8, text: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + text.len());
    buf.push(tag);
    buf.extend_from_slice(text.as_bytes());
    buf
}

fn utf8(bytes: &[u8]) -> Result<String, ProtocolError> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}
