//! Standard chess rules backed by `shakmaty`.

use super::{MoveOutcome, RulesEngine, RulesError, TerminalReason};
use crate::types::{MoveRequest, Position, Side};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position as _, Role, Square};
use std::collections::HashMap;

/// Standard chess with threefold-repetition tracking.
///
/// `shakmaty` positions carry no history, so the engine keeps a count of
/// every position key (placement, side, castling rights, en passant) seen
/// since the last [`RulesEngine::load_position`].
#[derive(Debug, Clone)]
pub struct StandardChess {
    position: Chess,
    repetitions: HashMap<String, u32>,
}

impl StandardChess {
    /// Creates an engine at the standard starting position.
    pub fn new() -> Self {
        let mut engine = Self {
            position: Chess::default(),
            repetitions: HashMap::new(),
        };
        engine.record_position();
        engine
    }

    /// Creates an engine at an arbitrary FEN position.
    pub fn from_position(position: &Position) -> Result<Self, RulesError> {
        let mut engine = Self::new();
        engine.load_position(position)?;
        Ok(engine)
    }

    /// `false` when the side to move is already checkmated or stalemated.
    pub fn has_legal_moves(&self) -> bool {
        !self.position.legal_moves().is_empty()
    }

    fn fen(&self) -> String {
        Fen(self.position.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    /// Counts one more occurrence of the current position and returns the total.
    fn record_position(&mut self) -> u32 {
        let key = self
            .fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ");
        let count = self.repetitions.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Maps a client request onto a legal move, or `None` if there is none.
    ///
    /// Clients send a promotion hint with every move, so the plain move is
    /// tried first and the hint only matters when the plain move is illegal.
    fn resolve_move(&self, request: &MoveRequest) -> Option<Move> {
        let from: Square = request.from_square.trim().parse().ok()?;
        let to: Square = request.to_square.trim().parse().ok()?;
        let promotion = parse_promotion(request.promotion_hint.as_deref())?;

        let plain = UciMove::Normal {
            from,
            to,
            promotion: None,
        };
        match plain.to_move(&self.position) {
            Ok(legal) => Some(legal),
            Err(_) => UciMove::Normal {
                from,
                to,
                promotion: Some(promotion),
            }
            .to_move(&self.position)
            .ok(),
        }
    }

    fn terminal_reason(&self, occurrences: u32) -> TerminalReason {
        if self.position.is_checkmate() {
            TerminalReason::Checkmate
        } else if self.position.is_stalemate() {
            TerminalReason::Stalemate
        } else if self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || occurrences >= 3
        {
            TerminalReason::OtherDraw
        } else {
            TerminalReason::None
        }
    }
}

impl Default for StandardChess {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a promotion hint; no hint means queen. `None` if unparseable.
fn parse_promotion(hint: Option<&str>) -> Option<Role> {
    let Some(hint) = hint else {
        return Some(Role::Queen);
    };
    let mut chars = hint.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Role::from_char(c.to_ascii_lowercase())
            .filter(|role| matches!(role, Role::Knight | Role::Bishop | Role::Rook | Role::Queen)),
        _ => None,
    }
}

impl RulesEngine for StandardChess {
    fn current_position(&self) -> Result<Position, RulesError> {
        Ok(Position(self.fen()))
    }

    fn load_position(&mut self, position: &Position) -> Result<(), RulesError> {
        let invalid = |reason: String| RulesError::InvalidPosition {
            position: position.to_string(),
            reason,
        };
        let fen: Fen = position
            .as_str()
            .trim()
            .parse()
            .map_err(|e| invalid(format!("{e}")))?;
        self.position = fen
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        self.repetitions.clear();
        self.record_position();
        Ok(())
    }

    fn try_apply_move(&mut self, request: &MoveRequest) -> Result<MoveOutcome, RulesError> {
        let Some(legal) = self.resolve_move(request) else {
            return Ok(MoveOutcome::Rejected);
        };

        self.position = self
            .position
            .clone()
            .play(&legal)
            .map_err(|e| RulesError::Engine(format!("{e}")))?;

        let occurrences = self.record_position();
        let terminal_reason = self.terminal_reason(occurrences);
        Ok(MoveOutcome::Applied {
            new_position: Position(self.fen()),
            is_terminal: terminal_reason != TerminalReason::None,
            terminal_reason,
        })
    }

    fn side_to_move(&self) -> Side {
        match self.position.turn() {
            Color::White => Side::First,
            Color::Black => Side::Second,
        }
    }
}
