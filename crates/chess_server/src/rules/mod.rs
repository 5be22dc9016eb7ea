//! Rules engine boundary.
//!
//! The coordinator never decides legality itself: it hands every move
//! request to a [`RulesEngine`] and acts on the [`MoveOutcome`]. Rejections
//! are values, not errors; a [`RulesError`] means the engine itself is
//! unusable and ends the current game.

pub mod standard;

pub use standard::StandardChess;

use crate::types::{MoveRequest, Position, Side};
use thiserror::Error;

/// Why a position is terminal, as reported by the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    Checkmate,
    Stalemate,
    /// Insufficient material, fifty-move rule or threefold repetition.
    OtherDraw,
    None,
}

/// Result of asking the engine to play a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied {
        new_position: Position,
        is_terminal: bool,
        terminal_reason: TerminalReason,
    },
    /// Illegal in the current position, or the request could not be parsed.
    Rejected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid position '{position}': {reason}")]
    InvalidPosition { position: String, reason: String },

    #[error("Engine failure: {0}")]
    Engine(String),
}

/// Synchronous, CPU-only capability that owns the board.
///
/// Implementations must not block or perform I/O; the coordinator calls
/// them inside a single, uninterrupted arbitration step.
pub trait RulesEngine: Send {
    /// Serializes the current position for transmission.
    fn current_position(&self) -> Result<Position, RulesError>;

    /// Replaces the engine's position. Only used before a game starts.
    fn load_position(&mut self, position: &Position) -> Result<(), RulesError>;

    /// Attempts to play `request` in the current position.
    fn try_apply_move(&mut self, request: &MoveRequest) -> Result<MoveOutcome, RulesError>;

    /// The side to move after the last applied move.
    fn side_to_move(&self) -> Side;
}
