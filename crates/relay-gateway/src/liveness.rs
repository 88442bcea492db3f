//! Liveness monitor
//!
//! One global task sweeps every connection on a fixed period. A connection
//! that has not answered the previous sweep's probe is forcibly
//! disconnected; everyone else gets a fresh WebSocket ping and is marked as
//! awaiting the pong. This is the only place the gateway proactively severs
//! connections.
//!
//! The application-level Ping/Pong opcodes are unrelated: those exist for
//! the far end to probe us and are never consulted here.

use crate::connection::{ConnectionRegistry, Outbound};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Spawn the liveness sweep task
pub fn spawn_monitor(registry: Arc<ConnectionRegistry>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            sweep(&registry).await;
        }
    })
}

/// One sweep over all connections
async fn sweep(registry: &ConnectionRegistry) {
    for connection in registry.all() {
        if connection.awaiting_pong().await {
            tracing::info!(id = %connection.id(), "Heartbeat timed out, disconnecting");
            connection.force_close();
            continue;
        }

        connection.mark_probed().await;
        registry.deliver(&connection, Outbound::Ping);
    }
}
