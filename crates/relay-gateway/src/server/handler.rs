//! WebSocket handler
//!
//! Owns the per-connection task trio: a reader that decodes and dispatches
//! inbound frames, a writer that drains the bounded outbound queue, and the
//! force-close signal. Whichever finishes first tears the connection down.

use crate::connection::{Connection, Outbound};
use crate::handlers::{server_message, MessageDispatcher};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Close code a client sends when it leaves deliberately
const GOING_AWAY: u16 = 1001;

/// Headroom above the upload limit for the opcode, room, MIME type, and
/// sentinels that frame an upload
const UPLOAD_FRAME_OVERHEAD: usize = 256;

/// WebSocket chat handler
pub async fn chat_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let max_frame = state.config().limits.max_upload_bytes + UPLOAD_FRAME_OVERHEAD;
    ws.max_message_size(max_frame)
        .on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<Outbound>(state.config().limits.outbound_queue);
    let connection = Connection::new(tx);
    state.registry().insert(connection.clone());

    tracing::info!(id = %connection.id(), "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // writer: drain the outbound queue into the socket
    let id_send = connection.id();
    let mut send_task = tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            let message = match item {
                Outbound::Frame(bytes) => Message::Binary(bytes),
                Outbound::Ping => Message::Ping(Vec::new()),
            };
            if ws_sink.send(message).await.is_err() {
                tracing::debug!(id = %id_send, "Failed to write to WebSocket");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // reader: decode and dispatch inbound frames
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = ws_stream.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    if let Err(error) =
                        MessageDispatcher::dispatch(&state_recv, &connection_recv, &data).await
                    {
                        // malformed frames are dropped; the connection lives on
                        tracing::trace!(
                            id = %connection_recv.id(),
                            error = %error,
                            "Dropping malformed frame"
                        );
                    }
                }
                Ok(Message::Text(_)) => {
                    tracing::trace!(
                        id = %connection_recv.id(),
                        "Dropping unexpected text message"
                    );
                }
                Ok(Message::Ping(_)) => {
                    // pong reply is handled by axum
                }
                Ok(Message::Pong(_)) => {
                    connection_recv.mark_alive().await;
                }
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        connection_recv.record_close_code(frame.code).await;
                    }
                    tracing::info!(id = %connection_recv.id(), "Client closed connection");
                    break;
                }
                Err(error) => {
                    tracing::debug!(
                        id = %connection_recv.id(),
                        error = %error,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => {
            tracing::debug!(id = %connection.id(), "Receive task ended");
        }
        _ = &mut send_task => {
            tracing::debug!(id = %connection.id(), "Send task ended");
        }
        () = connection.closed() => {
            tracing::debug!(id = %connection.id(), "Connection force-closed");
        }
    }

    recv_task.abort();
    send_task.abort();

    cleanup_connection(&state, &connection).await;
}

/// Remove a departing connection and tell its rooms
///
/// Removal happens before the notices go out, so the departing connection
/// never receives its own notice. A 1001 close frame means the client left
/// deliberately; everything else reads as a lost connection.
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    let name = connection.display_name().await;
    let rooms = connection.rooms().await;

    state.registry().remove(connection.id()).await;
    tracing::info!(id = %connection.id(), "Connection cleaned up");

    let Some(name) = name else {
        return;
    };

    let verb = if connection.close_code().await == Some(GOING_AWAY) {
        "has left the room"
    } else {
        "has lost connection"
    };

    for room in rooms {
        state
            .registry()
            .broadcast(&room, &server_message(&room, &format!("{name} {verb}")))
            .await;
    }
}
