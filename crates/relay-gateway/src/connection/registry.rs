//! Connection registry
//!
//! The single shared view of all live connections, with a display-name
//! index for uniqueness claims and a room reverse index for broadcast.
//! Rooms are not objects: a room exists exactly as long as its member set
//! in the reverse index is non-empty.

use super::{Connection, Outbound};
use crate::protocol::ServerFrame;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Registry of all active connections
///
/// Uses `DashMap` for concurrent access; name claims go through the map's
/// entry API so two racing claims of the same name serialize.
pub struct ConnectionRegistry {
    /// Active connections by ID
    connections: DashMap<Uuid, Arc<Connection>>,

    /// Display name to connection ID (uniqueness index)
    names: DashMap<String, Uuid>,

    /// Room name to member connection IDs (broadcast reverse index)
    rooms: DashMap<String, HashSet<Uuid>>,
}

impl ConnectionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            names: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection
    pub fn insert(&self, connection: Arc<Connection>) {
        tracing::debug!(id = %connection.id(), "Connection registered");
        self.connections.insert(connection.id(), connection);
    }

    /// Remove a connection and scrub it from the name and room indexes
    pub async fn remove(&self, id: Uuid) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(&id)?;

        for room in connection.rooms().await {
            // Atomically drop the member, then sweep empty rooms
            self.rooms.alter(&room, |_, mut members| {
                members.remove(&id);
                members
            });
        }
        self.rooms.retain(|_, members| !members.is_empty());

        if let Some(name) = connection.display_name().await {
            self.names.remove_if(&name, |_, owner| *owner == id);
        }

        tracing::debug!(id = %id, "Connection removed");
        Some(connection)
    }

    /// Get a connection by ID
    pub fn get(&self, id: Uuid) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// Get every live connection
    pub fn all(&self) -> Vec<Arc<Connection>> {
        self.connections.iter().map(|r| r.clone()).collect()
    }

    /// Get the total number of connections, named or not
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Try to claim a display name for a connection
    ///
    /// Fails if any connection holds the name, including the claimant
    /// itself. The entry API makes racing claims resolve to exactly one
    /// winner.
    pub fn claim_name(&self, id: Uuid, name: &str) -> bool {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
        }
    }

    /// Release a name previously held by a connection
    pub fn release_name(&self, id: Uuid, name: &str) {
        self.names.remove_if(name, |_, owner| *owner == id);
    }

    /// Add a connection to a room's member set
    pub fn join_room(&self, id: Uuid, room: &str) {
        self.rooms.entry(room.to_string()).or_default().insert(id);
    }

    /// Remove a connection from a room's member set
    pub fn leave_room(&self, id: Uuid, room: &str) {
        self.rooms.alter(room, |_, mut members| {
            members.remove(&id);
            members
        });
        self.rooms.retain(|_, members| !members.is_empty());
    }

    /// Get all member connections of a room
    pub fn members(&self, room: &str) -> Vec<Arc<Connection>> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of members in a room
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    /// Find the named connection if it is a member of the room
    pub fn find_by_name(&self, name: &str, room: &str) -> Option<Arc<Connection>> {
        let id = *self.names.get(name)?;
        if !self.rooms.get(room)?.contains(&id) {
            return None;
        }
        self.get(id)
    }

    /// Broadcast a frame to every named member of a room
    ///
    /// Fire-and-forget per recipient: a full outbound queue disconnects
    /// that recipient rather than stalling delivery to the others.
    /// Broadcasting to a room with no members is a no-op.
    pub async fn broadcast(&self, room: &str, frame: &ServerFrame) {
        let members = self.members(room);
        if members.is_empty() {
            return;
        }

        let bytes = frame.encode();
        for connection in members {
            if connection.display_name().await.is_none() {
                continue;
            }
            self.deliver(&connection, Outbound::Frame(bytes.clone()));
        }
    }

    /// Queue an item for one connection, applying the overflow policy
    pub fn deliver(&self, connection: &Arc<Connection>, item: Outbound) {
        use tokio::sync::mpsc::error::TrySendError;

        match connection.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    id = %connection.id(),
                    "Outbound queue full, disconnecting slow consumer"
                );
                connection.force_close();
            }
            Err(TrySendError::Closed(_)) => {
                // writer already gone; cleanup is in flight
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("names", &self.names.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
