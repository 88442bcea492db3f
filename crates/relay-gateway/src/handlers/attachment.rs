//! Attachment upload handler
//!
//! The gateway validates the envelope (room, MIME type, size) and hands the
//! raw bytes to the transcoding collaborator on a blocking thread. The
//! uploader alone receives the outcome: the transcoded attachment frame on
//! success, a server notice on failure. Nothing is broadcast.

use super::{server_message, HandlerResult};
use crate::connection::{Connection, Outbound};
use crate::protocol::ServerFrame;
use crate::server::GatewayState;
use crate::transcode::is_allowed_image_type;
use relay_core::is_valid_name;
use std::sync::Arc;

/// Reply sent to the uploader when the collaborator fails
const TRANSCODE_FAILED: &str = "An error occurred while trying to process your file upload";

/// Handle an attachment upload
pub async fn handle(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: String,
    mime: String,
    data: Vec<u8>,
) -> HandlerResult<()> {
    if !is_valid_name(&room) {
        return Ok(());
    }
    if !is_allowed_image_type(&mime) {
        return Ok(());
    }
    if data.len() > state.config().limits.max_upload_bytes {
        return Ok(());
    }
    let Some(sender) = connection.display_name().await else {
        return Ok(());
    };

    let registry = state.registry().clone();
    let transcoder = state.transcoder().clone();
    let connection = connection.clone();

    // transcoding is CPU-bound; keep it off the connection task
    tokio::spawn(async move {
        let result =
            tokio::task::spawn_blocking(move || transcoder.transcode(&data, &mime)).await;

        let outbound = match result {
            Ok(Ok(transcoded)) => Outbound::Frame(
                ServerFrame::Attachment {
                    sender,
                    room,
                    data: transcoded,
                }
                .encode(),
            ),
            Ok(Err(error)) => {
                tracing::error!(id = %connection.id(), error = %error, "Attachment transcoding failed");
                Outbound::Frame(server_message(&room, TRANSCODE_FAILED).encode())
            }
            Err(join_error) => {
                tracing::error!(id = %connection.id(), error = %join_error, "Transcoding task failed");
                Outbound::Frame(server_message(&room, TRANSCODE_FAILED).encode())
            }
        };

        registry.deliver(&connection, outbound);
    });

    Ok(())
}
