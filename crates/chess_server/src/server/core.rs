//! Core game server implementation.
//!
//! `GameServer` owns the listener and the accept loop, spawns the session
//! actor and hands every accepted socket to [`handle_connection`].

use crate::{
    config::ServerConfig,
    error::ServerError,
    server::handlers::handle_connection,
    session::{run_session, GameSession, SessionEvent},
};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

type PendingSession = (GameSession, mpsc::UnboundedReceiver<SessionEvent>);

/// The chess game server.
///
/// One server hosts exactly one game. The session is built eagerly so a
/// bad starting position is reported before anything is bound, and is
/// moved onto its actor when [`serve`](GameServer::serve) runs.
pub struct GameServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Queue feeding the session actor
    events: mpsc::UnboundedSender<SessionEvent>,

    /// The session until the server starts serving
    pending: Mutex<Option<PendingSession>>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,

    /// Connections currently past the limit check
    active_connections: Arc<AtomicUsize>,
}

impl GameServer {
    /// Creates a server and its game session.
    ///
    /// # Arguments
    ///
    /// * `config` - Listener, connection limit and game settings
    ///
    /// # Returns
    ///
    /// A server that has not bound anything yet; call [`start`](GameServer::start)
    /// or [`bind`](GameServer::bind) and [`serve`](GameServer::serve).
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the configuration cannot host a
    /// playable game and [`ServerError::Rules`] if the configured starting
    /// position cannot be loaded.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let (events, events_rx) = mpsc::unbounded_channel();
        let session = GameSession::from_config(&config, events.clone())?;
        let (shutdown_sender, _) = broadcast::channel(1);

        Ok(Self {
            config,
            events,
            pending: Mutex::new(Some((session, events_rx))),
            shutdown_sender,
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Binds to the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Network`] if the listener cannot be created
    /// and [`ServerError::Internal`] if the server was already started.
    pub async fn start(&self) -> Result<(), ServerError> {
        info!("🚀 Starting chess server on {}", self.config.bind_address);
        let listener = self.bind()?;
        self.serve(listener).await
    }

    /// Creates the listening socket with `SO_REUSEADDR` set.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Network`] if any socket step fails, e.g. the
    /// address is already in use.
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.bind_address;
        let domain = if address.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("Socket creation failed: {e}")))?;
        socket.set_reuse_address(true).ok();

        socket
            .bind(&address.into())
            .map_err(|e| ServerError::Network(format!("Bind failed: {e}")))?;
        socket
            .listen(1024)
            .map_err(|e| ServerError::Network(format!("Listen failed: {e}")))?;

        let std_listener: StdTcpListener = socket.into();
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("Failed to set non-blocking: {e}")))?;

        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::Network(format!("Tokio listener creation failed: {e}")))?;

        let local = listener.local_addr().unwrap_or(address);
        info!("✅ Listening on {}", local);
        Ok(listener)
    }

    /// Runs the session actor and the accept loop on `listener` until
    /// [`shutdown`](GameServer::shutdown) is called.
    ///
    /// # Arguments
    ///
    /// * `listener` - An already bound listener, usually from [`bind`](GameServer::bind)
    ///
    /// # Errors
    ///
    /// Can only run once per server; a second call returns
    /// [`ServerError::Internal`].
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let (session, events_rx) = self
            .pending
            .lock()
            .map_err(|_| ServerError::Internal("Session lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| ServerError::Internal("Server already started".to_string()))?;

        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        let session_task = tokio::spawn(run_session(session, events_rx));

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => self.spawn_connection(stream, addr),
                    Err(e) => error!("Failed to accept connection: {}", e),
                },
                _ = shutdown_receiver.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        let _ = self.events.send(SessionEvent::Shutdown);
        match session_task.await {
            Ok(session) => info!("🏁 Final game state: {:?}", session),
            Err(e) => error!("Session task failed: {}", e),
        }

        info!("Server stopped");
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let active = self.active_connections.fetch_add(1, Ordering::SeqCst);
        if active >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::SeqCst);
            warn!(
                "Connection limit of {} reached, dropping {}",
                self.config.max_connections, addr
            );
            drop(stream);
            return;
        }

        let events = self.events.clone();
        let shutdown = self.shutdown_sender.subscribe();
        let active_connections = self.active_connections.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, events, shutdown).await {
                error!("Connection error: {}", e);
            }
            active_connections.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Stops the accept loop, closes every connection and ends the session.
    ///
    /// Returns immediately; [`serve`](GameServer::serve) returns once the
    /// session actor has drained. Calling it before the server runs has no
    /// effect.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }
}
