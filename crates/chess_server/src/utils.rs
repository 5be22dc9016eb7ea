//! Convenience constructors.

use crate::{GameServer, ServerConfig, ServerError};

/// A server with the default configuration: 127.0.0.1:3000, ten minutes
/// per side, standard starting position.
pub fn create_server() -> Result<GameServer, ServerError> {
    create_server_with_config(ServerConfig::default())
}

pub fn create_server_with_config(config: ServerConfig) -> Result<GameServer, ServerError> {
    GameServer::new(config)
}
