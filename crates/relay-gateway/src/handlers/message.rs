//! Chat message handler
//!
//! Validates, routes slash commands, or formats and broadcasts. A
//! broadcast message is the sender header (bold name, ": ", block break)
//! followed by the formatter's output.

use super::{command, HandlerResult};
use crate::connection::Connection;
use crate::protocol::ServerFrame;
use crate::server::GatewayState;
use relay_core::{is_valid_name, parse_markdown, MessageStyle, Segment, MAX_TEXT_BYTES};
use std::sync::Arc;

/// Handle a chat message for a room
pub async fn handle(
    state: &GatewayState,
    connection: &Arc<Connection>,
    room: &str,
    text: &str,
) -> HandlerResult<()> {
    if !is_valid_name(room) {
        return Ok(());
    }
    if text.is_empty() || text.len() > MAX_TEXT_BYTES {
        return Ok(());
    }
    if !connection.is_member(room).await {
        return Ok(());
    }

    if let Some(input) = text.strip_prefix('/') {
        return command::handle(state, connection, room, input).await;
    }

    let Some(sender) = connection.display_name().await else {
        return Ok(());
    };

    let mut segments = vec![
        Segment::styled(MessageStyle::BOLD, sender),
        Segment::plain(": "),
        Segment::NewBlock,
    ];
    segments.extend(parse_markdown(text));

    state
        .registry()
        .broadcast(
            room,
            &ServerFrame::Message {
                room: room.to_string(),
                segments,
            },
        )
        .await;
    Ok(())
}
