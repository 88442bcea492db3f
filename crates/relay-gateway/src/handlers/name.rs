//! Name claim handler
//!
//! Names are claimed atomically against the registry's name index, so two
//! racing claims of the same name resolve to exactly one `NameAccepted`.
//! Renaming after login is allowed and announces itself to every joined
//! room under the old name.

use super::{reply, server_message, HandlerResult};
use crate::connection::Connection;
use crate::protocol::ServerFrame;
use crate::server::GatewayState;
use relay_core::is_valid_name;
use std::sync::Arc;

/// Handle a name claim or rename
pub async fn handle(
    state: &GatewayState,
    connection: &Arc<Connection>,
    name: &str,
) -> HandlerResult<()> {
    if !is_valid_name(name) {
        return Ok(());
    }

    let registry = state.registry();
    if !registry.claim_name(connection.id(), name) {
        reply(state, connection, &ServerFrame::NameFailure);
        return Ok(());
    }

    let previous = connection.display_name().await;
    if let Some(old) = &previous {
        let notice = format!("{old} has changed their name to {name}");
        for room in connection.rooms().await {
            registry.broadcast(&room, &server_message(&room, &notice)).await;
        }
    }

    connection.set_display_name(name.to_string()).await;
    if let Some(old) = previous {
        registry.release_name(connection.id(), &old);
    }

    tracing::info!(id = %connection.id(), name = %name, "Name claimed");
    reply(
        state,
        connection,
        &ServerFrame::NameAccepted {
            name: name.to_string(),
        },
    );
    Ok(())
}
