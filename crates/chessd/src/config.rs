//! Configuration file handling for the chess server daemon.
//!
//! Loads the TOML configuration, applies CLI overrides, validates the
//! result and converts it into the library's [`ServerConfig`].

use crate::cli::CliArgs;
use anyhow::{bail, Context, Result};
use chess_server::{ServerConfig, ServerError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Environment variable holding a full bind address.
pub const BIND_ENV_VAR: &str = "CHESSD_BIND";
/// Environment variable holding only the port; the configured host is kept.
pub const PORT_ENV_VAR: &str = "PORT";

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:3000")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Maximum number of concurrent connections, observers included
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_connections() -> usize {
    64
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Initial time on each side's clock, in seconds
    #[serde(default = "default_clock_seconds")]
    pub clock_seconds: u32,
    /// FEN of the starting position; the standard one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_position: Option<String>,
}

fn default_clock_seconds() -> u32 {
    600
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            clock_seconds: default_clock_seconds(),
            starting_position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file. A missing file is created with
    /// the default configuration, which is then used.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)
                .context("Failed to serialize default configuration")?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies environment overrides on top of file values.
    ///
    /// # Arguments
    ///
    /// * `bind` - Value of `CHESSD_BIND`, replacing the whole bind address
    /// * `port` - Value of `PORT`, replacing only the port
    ///
    /// The values are not checked here; a bad port surfaces from
    /// [`validate`](Self::validate) as an invalid bind address.
    pub fn apply_env_overrides(&mut self, bind: Option<String>, port: Option<String>) {
        if let Some(bind) = bind {
            self.server.bind_address = bind.trim().to_string();
        }
        if let Some(port) = port {
            let host = self
                .server
                .bind_address
                .rsplit_once(':')
                .map_or(self.server.bind_address.as_str(), |(host, _)| host);
            self.server.bind_address = format!("{host}:{}", port.trim());
        }
    }

    /// Command line values win over file and environment values.
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(bind_address) = &args.bind_address {
            self.server.bind_address = bind_address.clone();
        }
        if let Some(log_level) = &args.log_level {
            self.logging.level = log_level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
        if let Some(clock_seconds) = args.clock_seconds {
            self.game.clock_seconds = clock_seconds;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            bail!("Invalid bind address: {}", self.server.bind_address);
        }

        self.to_server_config()?.validate()?;

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level: {}. Must be one of: {VALID_LOG_LEVELS:?}",
                self.logging.level
            );
        }

        Ok(())
    }

    /// Converts to the library configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the bind address does not parse.
    pub fn to_server_config(&self) -> Result<ServerConfig, ServerError> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse().map_err(|_| {
                ServerError::Config(format!("Invalid bind address: {}", self.server.bind_address))
            })?,
            max_connections: self.server.max_connections,
            clock_seconds: self.game.clock_seconds,
            starting_position: self.game.starting_position.clone(),
        })
    }
}
