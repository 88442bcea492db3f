//! Room join/leave handlers
//!
//! Rooms spring into existence on first join and vanish when their last
//! member leaves. Joins broadcast unconditionally, so the joiner sees its
//! own join notice; leave notices go out after the leaver is removed, so
//! they reach the remaining members only.

use super::{reply, server_message, HandlerResult};
use crate::connection::Connection;
use crate::protocol::ServerFrame;
use crate::server::GatewayState;
use relay_core::is_valid_name;
use std::sync::Arc;

/// Handle a room join request
pub async fn handle_join(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
) -> HandlerResult<()> {
    if !is_valid_name(room) {
        return Ok(());
    }
    let Some(name) = connection.display_name().await else {
        return Ok(());
    };
    if !connection.add_room(room).await {
        // already a member
        return Ok(());
    }

    state.registry().join_room(connection.id(), room);
    reply(
        state,
        connection,
        &ServerFrame::RoomJoined {
            room: room.to_string(),
        },
    );
    state
        .registry()
        .broadcast(room, &server_message(room, &format!("{name} has joined the room")))
        .await;

    tracing::debug!(id = %connection.id(), room = %room, "Joined room");
    Ok(())
}

/// Handle a room leave request
pub async fn handle_leave(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
) -> HandlerResult<()> {
    if !is_valid_name(room) {
        return Ok(());
    }
    let Some(name) = connection.display_name().await else {
        return Ok(());
    };
    if !connection.remove_room(room).await {
        // not a member
        return Ok(());
    }

    state.registry().leave_room(connection.id(), room);
    reply(
        state,
        connection,
        &ServerFrame::RoomLeft {
            room: room.to_string(),
        },
    );
    state
        .registry()
        .broadcast(room, &server_message(room, &format!("{name} has left the room")))
        .await;

    tracing::debug!(id = %connection.id(), room = %room, "Left room");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionRegistry, Outbound};
    use crate::transcode::ImageTranscoder;
    use relay_common::AppConfig;
    use tokio::sync::mpsc;

    fn test_state() -> GatewayState {
        GatewayState::new(
            ConnectionRegistry::new_shared(),
            Arc::new(ImageTranscoder),
            AppConfig::default(),
        )
    }

    async fn named(state: &GatewayState, name: &str) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(16);
        let conn = Connection::new(tx);
        state.registry().insert(conn.clone());
        state.registry().claim_name(conn.id(), name);
        conn.set_display_name(name.to_string()).await;
        (conn, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Outbound>) -> Vec<ServerFrame> {
        let mut frames = Vec::new();
        while let Ok(item) = rx.try_recv() {
            if let Outbound::Frame(bytes) = item {
                frames.push(ServerFrame::decode(&bytes).unwrap());
            }
        }
        frames
    }

    #[tokio::test]
    async fn test_join_confirms_and_announces_to_joiner() {
        let state = test_state();
        let (conn, mut rx) = named(&state, "alice").await;

        handle_join(&state, &conn, "general").await.unwrap();

        let frames = drain(&mut rx);
        assert_eq!(
            frames,
            vec![
                ServerFrame::RoomJoined {
                    room: "general".to_string()
                },
                server_message("general", "alice has joined the room"),
            ]
        );
        assert_eq!(state.registry().member_count("general"), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_is_ignored() {
        let state = test_state();
        let (conn, mut rx) = named(&state, "alice").await;

        handle_join(&state, &conn, "general").await.unwrap();
        drain(&mut rx);

        handle_join(&state, &conn, "general").await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_room_name_is_ignored() {
        let state = test_state();
        let (conn, mut rx) = named(&state, "alice").await;

        handle_join(&state, &conn, "no spaces here").await.unwrap();
        assert!(drain(&mut rx).is_empty());
        assert!(conn.rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_members_only() {
        let state = test_state();
        let (alice, mut alice_rx) = named(&state, "alice").await;
        let (bob, mut bob_rx) = named(&state, "bob").await;

        handle_join(&state, &alice, "general").await.unwrap();
        handle_join(&state, &bob, "general").await.unwrap();
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        handle_leave(&state, &alice, "general").await.unwrap();

        let alice_frames = drain(&mut alice_rx);
        assert_eq!(
            alice_frames,
            vec![ServerFrame::RoomLeft {
                room: "general".to_string()
            }]
        );

        let bob_frames = drain(&mut bob_rx);
        assert_eq!(
            bob_frames,
            vec![server_message("general", "alice has left the room")]
        );
    }

    #[tokio::test]
    async fn test_leave_of_non_member_room_is_ignored() {
        let state = test_state();
        let (conn, mut rx) = named(&state, "alice").await;

        handle_leave(&state, &conn, "general").await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }
}
