//! Events consumed by the session actor.

use crate::connection::Outbound;
use crate::types::{ConnectionId, MoveRequest};
use std::net::SocketAddr;

/// Everything that can happen to the game, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    /// A WebSocket handshake completed.
    Connected {
        connection_id: ConnectionId,
        remote_addr: SocketAddr,
        outbound: Outbound,
    },
    /// The transport closed, for whatever reason.
    Disconnected { connection_id: ConnectionId },
    MoveRequested {
        connection_id: ConnectionId,
        request: MoveRequest,
    },
    /// One second of clock time elapsed.
    Tick,
    /// Stop processing events.
    Shutdown,
}
