//! Wire operation codes
//!
//! One byte at the head of every frame. The two directions use separate
//! namespaces that overlap numerically; direction decides which enum a tag
//! is read against.

/// Client-to-server operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientOp {
    /// Liveness probe from the client
    Ping = 0,
    /// Claim or change a display name
    RequestName = 2,
    /// Join a room
    JoinRoom = 3,
    /// Leave a room
    LeaveRoom = 4,
    /// Send a chat message to a room
    SendMessage = 5,
    /// Upload an attachment for a room
    SendAttachment = 6,
}

impl ClientOp {
    /// Create a `ClientOp` from a raw byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ping),
            2 => Some(Self::RequestName),
            3 => Some(Self::JoinRoom),
            4 => Some(Self::LeaveRoom),
            5 => Some(Self::SendMessage),
            6 => Some(Self::SendAttachment),
            _ => None,
        }
    }

    /// Get the raw byte value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::RequestName => "RequestName",
            Self::JoinRoom => "JoinRoom",
            Self::LeaveRoom => "LeaveRoom",
            Self::SendMessage => "SendMessage",
            Self::SendAttachment => "SendAttachment",
        }
    }
}

impl std::fmt::Display for ClientOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

/// Server-to-client operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerOp {
    /// Reply to a client Ping
    Pong = 1,
    /// The requested display name is now yours
    NameAccepted = 2,
    /// The requested display name is already taken
    NameFailure = 3,
    /// You joined a room
    RoomJoined = 4,
    /// You left a room
    RoomLeft = 5,
    /// A styled message delivered to a room you are in
    Message = 6,
    /// A transcoded attachment
    Attachment = 7,
    /// A visual effect to play (novelty commands)
    Fun = 8,
}

impl ServerOp {
    /// Create a `ServerOp` from a raw byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Pong),
            2 => Some(Self::NameAccepted),
            3 => Some(Self::NameFailure),
            4 => Some(Self::RoomJoined),
            5 => Some(Self::RoomLeft),
            6 => Some(Self::Message),
            7 => Some(Self::Attachment),
            8 => Some(Self::Fun),
            _ => None,
        }
    }

    /// Get the raw byte value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pong => "Pong",
            Self::NameAccepted => "NameAccepted",
            Self::NameFailure => "NameFailure",
            Self::RoomJoined => "RoomJoined",
            Self::RoomLeft => "RoomLeft",
            Self::Message => "Message",
            Self::Attachment => "Attachment",
            Self::Fun => "Fun",
        }
    }
}

impl std::fmt::Display for ServerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
