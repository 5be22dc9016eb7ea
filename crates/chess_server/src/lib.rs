//! # Chess Server - Authoritative Session Coordinator
//!
//! Hosts a single two-player chess game over WebSockets. The server seats
//! the first two connections as players, lets everyone else watch, keeps
//! one countdown clock per side and is the only authority on whose turn it
//! is and whether a move was accepted.
//!
//! ## Architecture Overview
//!
//! * **Session actor** - [`GameSession`] owns all game state. Every input
//!   (connect, disconnect, move request, clock tick) is an event on one
//!   queue, handled to completion before the next one starts.
//! * **Connections** - one task per WebSocket decodes frames into session
//!   events; a writer task drains the connection's outbound queue.
//! * **Clock** - an interval task enqueues a tick every second once the
//!   first move has been accepted.
//! * **Rules** - legality and terminal detection are delegated to a
//!   [`RulesEngine`], backed by `shakmaty` in [`StandardChess`].
//!
//! ### Message Flow
//!
//! 1. Client sends `{"event":"move","data":{"from":"e2","to":"e4"}}`
//! 2. The connection task enqueues a `MoveRequested` event
//! 3. The session checks the turn, consults the rules engine and either
//!    rejects the request privately or broadcasts `position` then `move`
//! 4. Clock ticks broadcast `clock`; the end of the game broadcasts a
//!    single `gameOver`
//!
//! ## Error Handling
//!
//! Rejected moves are normal outcomes and never errors. [`ServerError`]
//! covers network, protocol, configuration and internal failures.

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::GameServer;
pub use session::{run_session, GameSession, SessionEvent};
pub use utils::{create_server, create_server_with_config};

pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod messaging;
pub mod rules;
pub mod server;
pub mod session;
pub mod types;
pub mod utils;

pub use rules::{RulesEngine, StandardChess};
pub use types::{
    ClockState, ConnectionId, GameOverNotice, GameOverReason, GameStatus, MoveRequest, Position,
    Role, Side, Winner,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = create_server().expect("default server");
        assert_eq!(server.config(), &ServerConfig::default());
        assert_eq!(server.active_connections(), 0);
    }

    #[test]
    fn test_server_creation_rejects_bad_position() {
        let config = ServerConfig {
            starting_position: Some("8/8/8 w".to_string()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            create_server_with_config(config),
            Err(ServerError::Rules(_))
        ));
    }

    #[test]
    fn test_server_creation_rejects_finished_position() {
        let config = ServerConfig {
            starting_position: Some("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1".to_string()),
            ..ServerConfig::default()
        };
        assert!(matches!(
            create_server_with_config(config),
            Err(ServerError::Config(_))
        ));
    }
}
