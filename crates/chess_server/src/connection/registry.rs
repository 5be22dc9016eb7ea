//! Role assignment and fan-out delivery.

use super::ClientConnection;
use crate::messaging::ServerMessage;
use crate::types::{ConnectionId, Role, Side};
use std::collections::HashMap;
use tracing::{info, trace};

/// The two player seats. A seat is only vacated when its holder disconnects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSlots {
    pub first: Option<ConnectionId>,
    pub second: Option<ConnectionId>,
}

impl PlayerSlots {
    /// Connection seated on `side`, if any.
    pub fn holder(&self, side: Side) -> Option<ConnectionId> {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    pub fn both_occupied(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    fn side_of(&self, connection_id: ConnectionId) -> Option<Side> {
        if self.first == Some(connection_id) {
            Some(Side::First)
        } else if self.second == Some(connection_id) {
            Some(Side::Second)
        } else {
            None
        }
    }
}

/// Live connections and their roles, first come first served.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ClientConnection>,
    slots: PlayerSlots,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and seats it in the first free slot, if any.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - Fresh identity of the connection
    /// * `client` - Outbound handle used by [`send_to`](Self::send_to) and
    ///   [`broadcast`](Self::broadcast)
    ///
    /// # Returns
    ///
    /// `FirstPlayer` or `SecondPlayer` while a seat is free, `Observer`
    /// once both are taken.
    pub fn on_connect(&mut self, connection_id: ConnectionId, client: ClientConnection) -> Role {
        let role = if self.slots.first.is_none() {
            self.slots.first = Some(connection_id);
            Role::FirstPlayer
        } else if self.slots.second.is_none() {
            self.slots.second = Some(connection_id);
            Role::SecondPlayer
        } else {
            Role::Observer
        };

        info!(
            "🔗 Connection {} from {} joined as {:?}",
            connection_id, client.remote_addr, role
        );
        self.connections.insert(connection_id, client);
        role
    }

    /// Forgets a connection and frees its slot. Returns the role it held,
    /// or `None` if the connection was unknown.
    pub fn on_disconnect(&mut self, connection_id: ConnectionId) -> Option<Role> {
        let role = self.role_of(connection_id);
        match self.slots.side_of(connection_id) {
            Some(Side::First) => self.slots.first = None,
            Some(Side::Second) => self.slots.second = None,
            None => {}
        }

        let client = self.connections.remove(&connection_id)?;
        info!(
            "❌ Connection {} from {} ({:?}) left",
            connection_id, client.remote_addr, role
        );
        Some(role)
    }

    /// Role of a connection; unknown connections are observers.
    pub fn role_of(&self, connection_id: ConnectionId) -> Role {
        self.slots
            .side_of(connection_id)
            .map(Role::from)
            .unwrap_or(Role::Observer)
    }

    pub fn slots(&self) -> PlayerSlots {
        self.slots
    }

    pub fn both_occupied(&self) -> bool {
        self.slots.both_occupied()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sends to one connection. Delivery failures are ignored.
    pub fn send_to(&self, connection_id: ConnectionId, message: ServerMessage) {
        match self.connections.get(&connection_id) {
            Some(client) => {
                if !client.send(message) {
                    trace!("Dropped message for closed connection {}", connection_id);
                }
            }
            None => trace!("No connection {} to send to", connection_id),
        }
    }

    /// Sends to every connection, players and observers alike. A closed
    /// connection never stops delivery to the rest.
    pub fn broadcast(&self, message: ServerMessage) {
        for (connection_id, client) in &self.connections {
            if !client.send(message.clone()) {
                trace!("Dropped broadcast for closed connection {}", connection_id);
            }
        }
    }
}
