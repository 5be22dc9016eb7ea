//! Client connection representation.

use crate::messaging::ServerMessage;
use std::net::SocketAddr;
use std::time::SystemTime;
use tokio::sync::mpsc;

/// Queue feeding a connection's writer task.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// An individual client connection as seen by the session.
///
/// The session never touches the socket; it only enqueues messages that
/// the connection's writer task drains.
#[derive(Debug)]
pub struct ClientConnection {
    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: SystemTime,

    outbound: Outbound,
}

impl ClientConnection {
    pub fn new(remote_addr: SocketAddr, outbound: Outbound) -> Self {
        Self {
            remote_addr,
            connected_at: SystemTime::now(),
            outbound,
        }
    }

    /// Queues a message for delivery. Returns `false` if the writer is gone.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}
