//! Frame handlers
//!
//! Decodes inbound frames and applies the session state machine. The
//! "quiet until logged in" policy lives here: before a connection claims a
//! name, everything except name claims and pings is dropped without a
//! reply.

mod attachment;
mod command;
mod error;
mod message;
mod name;
mod room;

pub use error::{HandlerError, HandlerResult};

use crate::connection::{Connection, Outbound};
use crate::protocol::{ClientFrame, ServerFrame};
use crate::server::GatewayState;
use relay_core::Segment;
use std::sync::Arc;

/// Dispatch incoming client frames to the appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle one raw inbound frame
    ///
    /// Decode failures bubble up for the connection loop to trace; every
    /// other failure mode is handled (or deliberately swallowed) here.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        bytes: &[u8],
    ) -> HandlerResult<()> {
        let frame = ClientFrame::decode(bytes)?;

        // quiet until logged in
        if !matches!(frame, ClientFrame::Ping | ClientFrame::RequestName { .. })
            && !connection.is_named().await
        {
            tracing::trace!(id = %connection.id(), "Frame from unnamed connection ignored");
            return Ok(());
        }

        match frame {
            ClientFrame::Ping => {
                reply(state, connection, &ServerFrame::Pong);
                Ok(())
            }
            ClientFrame::RequestName { name } => name::handle(state, connection, &name).await,
            ClientFrame::JoinRoom { room } => room::handle_join(state, connection, &room).await,
            ClientFrame::LeaveRoom { room } => room::handle_leave(state, connection, &room).await,
            ClientFrame::SendMessage { room, text } => {
                message::handle(state, connection, &room, &text).await
            }
            ClientFrame::SendAttachment { room, mime, data } => {
                attachment::handle(state, connection, room, mime, data).await
            }
        }
    }
}

/// Unicast a frame to one connection
pub(crate) fn reply(state: &GatewayState, connection: &Arc<Connection>, frame: &ServerFrame) {
    state
        .registry()
        .deliver(connection, Outbound::Frame(frame.encode()));
}

/// Build a one-segment server notice for a room
pub(crate) fn server_message(room: &str, text: &str) -> ServerFrame {
    ServerFrame::Message {
        room: room.to_string(),
        segments: vec![Segment::server(text)],
    }
}

/// Unicast a one-segment server notice to one connection
pub(crate) fn reply_server_text(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
    text: &str,
) {
    reply(state, connection, &server_message(room, text));
}
