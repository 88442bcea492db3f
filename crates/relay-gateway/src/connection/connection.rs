//! Individual WebSocket connection
//!
//! Holds the session state owned by one socket: display name, joined
//! rooms, and the liveness flag, plus the bounded channel that the socket's
//! writer task drains.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Notify, RwLock};
use uuid::Uuid;

/// An item queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// An encoded server frame, sent as a binary WebSocket message
    Frame(Vec<u8>),
    /// A WebSocket protocol ping (liveness probe)
    Ping,
}

/// A single WebSocket connection
///
/// Created when the socket is accepted; unnamed until the first successful
/// name claim; destroyed on disconnect.
pub struct Connection {
    /// Unique connection ID
    id: Uuid,

    /// Display name (None until a name claim succeeds)
    display_name: RwLock<Option<String>>,

    /// Rooms this connection has joined
    rooms: RwLock<HashSet<String>>,

    /// Set when a liveness probe was sent and no pong has come back yet
    awaiting_pong: RwLock<bool>,

    /// Bounded queue drained by the socket's writer task
    sender: mpsc::Sender<Outbound>,

    /// Signaled to force the socket closed
    close: Notify,

    /// Close code received from the client's close frame, if any
    close_code: RwLock<Option<u16>>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection around an outbound queue
    pub fn new(sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            display_name: RwLock::new(None),
            rooms: RwLock::new(HashSet::new()),
            awaiting_pong: RwLock::new(false),
            sender,
            close: Notify::new(),
            close_code: RwLock::new(None),
            created_at: Instant::now(),
        })
    }

    /// Get the connection ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the display name (if claimed)
    pub async fn display_name(&self) -> Option<String> {
        self.display_name.read().await.clone()
    }

    /// Set the display name (on a successful claim)
    pub async fn set_display_name(&self, name: String) {
        *self.display_name.write().await = Some(name);
    }

    /// Check whether the connection has claimed a name
    pub async fn is_named(&self) -> bool {
        self.display_name.read().await.is_some()
    }

    /// Get all joined rooms
    pub async fn rooms(&self) -> Vec<String> {
        self.rooms.read().await.iter().cloned().collect()
    }

    /// Add a room; returns false if already a member
    pub async fn add_room(&self, room: &str) -> bool {
        self.rooms.write().await.insert(room.to_string())
    }

    /// Remove a room; returns false if not a member
    pub async fn remove_room(&self, room: &str) -> bool {
        self.rooms.write().await.remove(room)
    }

    /// Check room membership
    pub async fn is_member(&self, room: &str) -> bool {
        self.rooms.read().await.contains(room)
    }

    /// Check whether a liveness probe is outstanding
    pub async fn awaiting_pong(&self) -> bool {
        *self.awaiting_pong.read().await
    }

    /// Mark a liveness probe as sent (awaiting pong)
    pub async fn mark_probed(&self) {
        *self.awaiting_pong.write().await = true;
    }

    /// Clear the liveness flag (pong received)
    pub async fn mark_alive(&self) {
        *self.awaiting_pong.write().await = false;
    }

    /// Queue an item for the writer task without blocking
    pub fn try_send(&self, item: Outbound) -> Result<(), mpsc::error::TrySendError<Outbound>> {
        self.sender.try_send(item)
    }

    /// Check if the writer side is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Force the socket closed; idempotent
    pub fn force_close(&self) {
        self.close.notify_one();
    }

    /// Wait until the connection is force-closed
    pub async fn closed(&self) {
        self.close.notified().await;
    }

    /// Record the close code from the client's close frame
    pub async fn record_close_code(&self, code: u16) {
        *self.close_code.write().await = Some(code);
    }

    /// Get the recorded close code, if the client sent one
    pub async fn close_code(&self) -> Option<u16> {
        *self.close_code.read().await
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
