//! Service shell for the chess server: CLI, configuration, logging and
//! graceful shutdown around [`chess_server::GameServer`].

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::{Context, Result};
use chess_server::GameServer;
use cli::CliArgs;
use config::AppConfig;
use std::sync::Arc;
use tracing::{error, info};

pub struct Application {
    config: AppConfig,
    server: Arc<GameServer>,
}

impl Application {
    pub async fn new(args: CliArgs) -> Result<Self> {
        // Configuration is loaded before logging exists
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        config.apply_env_overrides(
            std::env::var(config::BIND_ENV_VAR).ok(),
            std::env::var(config::PORT_ENV_VAR).ok(),
        );
        config.apply_overrides(&args);
        config
            .validate()
            .context("Configuration validation failed")?;

        logging::setup_logging(&config.logging)?;
        info!(
            "🔧 Logging initialized with level: {}",
            config.logging.level
        );

        let server_config = config.to_server_config()?;
        let server = GameServer::new(server_config).context("Failed to create game server")?;
        info!("📂 Config: {}", args.config_path.display());

        Ok(Self {
            config,
            server: Arc::new(server),
        })
    }

    pub async fn run(self) -> Result<()> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!("  ⏱️ Clock: {}s per side", self.config.game.clock_seconds);
        if let Some(fen) = &self.config.game.starting_position {
            info!("  ♟️ Starting position: {}", fen);
        }

        let mut server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move { server.start().await })
        };

        info!("🛑 Press Ctrl+C to gracefully shutdown");

        tokio::select! {
            signal = signals::wait_for_shutdown_signal() => {
                signal.context("Failed to listen for shutdown signals")?;
                info!("🛑 Shutdown signal received, initiating graceful shutdown...");
                self.server.shutdown().await?;
            }
            // The server only returns on its own if it failed to start
            result = &mut server_handle => {
                return result.context("Server task panicked")?.context("Server failed");
            }
        }

        server_handle
            .await
            .context("Server task panicked")?
            .context("Server failed during shutdown")?;

        info!("✅ Chess server shutdown complete");
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let app = Application::new(args)
        .await
        .context("Failed to start application")?;

    if let Err(e) = app.run().await {
        error!("❌ Application error: {:?}", e);
        return Err(e);
    }

    Ok(())
}
