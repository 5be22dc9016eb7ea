//! Server configuration types and defaults.

use crate::error::ServerError;
use crate::rules::StandardChess;
use crate::types::Position;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for a [`GameServer`](crate::GameServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections, players and observers
    /// included. Connections beyond this are closed before the handshake.
    pub max_connections: usize,

    /// Initial time on each side's clock, in seconds
    pub clock_seconds: u32,

    /// FEN to start from instead of the standard opening position
    pub starting_position: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            max_connections: 64,
            clock_seconds: 600,
            starting_position: None,
        }
    }
}

impl ServerConfig {
    /// Checks that the configuration can host a playable game.
    ///
    /// # Errors
    ///
    /// * [`ServerError::Config`] if fewer than two connections are allowed,
    ///   the clock has no time, or the starting position is already over
    /// * [`ServerError::Rules`] if the starting position cannot be parsed
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.max_connections < 2 {
            return Err(ServerError::Config(format!(
                "max_connections must allow both players, got {}",
                self.max_connections
            )));
        }

        if self.clock_seconds == 0 {
            return Err(ServerError::Config(
                "clock_seconds must be greater than zero".to_string(),
            ));
        }

        if let Some(fen) = &self.starting_position {
            let rules = StandardChess::from_position(&Position(fen.clone()))?;
            if !rules.has_legal_moves() {
                return Err(ServerError::Config(format!(
                    "Starting position is already finished: {fen}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:3000");
        assert_eq!(config.max_connections, 64);
        assert_eq!(config.clock_seconds, 600);
        assert!(config.starting_position.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unplayable_games() {
        let config = ServerConfig {
            max_connections: 1,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));

        let config = ServerConfig {
            clock_seconds: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));

        let config = ServerConfig {
            starting_position: Some("not a fen".to_string()),
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::Rules(_))));
    }

    #[test]
    fn test_validate_rejects_finished_starting_positions() {
        for fen in [
            "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1",
            "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
        ] {
            let config = ServerConfig {
                starting_position: Some(fen.to_string()),
                ..ServerConfig::default()
            };
            match config.validate() {
                Err(ServerError::Config(message)) => assert!(message.contains("already finished")),
                other => panic!("expected config error for {fen}, got {other:?}"),
            }
        }

        let config = ServerConfig {
            starting_position: Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".to_string()),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
