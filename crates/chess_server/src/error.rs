//! Error types for the chess server.

use crate::rules::RulesError;
use thiserror::Error;

/// Structured server errors.
///
/// Rejected moves and events arriving after the game ended are normal
/// outcomes of arbitration and never surface as a `ServerError`.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket creation, binding, handshake or send failures.
    #[error("Network error: {0}")]
    Network(String),

    /// A frame that could not be decoded as a client message.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration supplied at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failures of the server's own machinery (e.g. the session task is gone).
    #[error("Internal error: {0}")]
    Internal(String),

    /// The rules engine could not serve a request.
    #[error("Rules engine error: {0}")]
    Rules(#[from] RulesError),
}
