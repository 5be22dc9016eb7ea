//! Core data model shared by every component of the session coordinator.
//!
//! These types double as the JSON payloads of the wire protocol, so their
//! serde representation is part of the public contract with clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, process-unique identity of a live transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two competing parties. `First` plays white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// The part a connection plays in the game, derived from the player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    FirstPlayer,
    SecondPlayer,
    Observer,
}

impl Role {
    /// The side this role may move for, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Role::FirstPlayer => Some(Side::First),
            Role::SecondPlayer => Some(Side::Second),
            Role::Observer => None,
        }
    }
}

impl From<Side> for Role {
    fn from(side: Side) -> Self {
        match side {
            Side::First => Role::FirstPlayer,
            Side::Second => Role::SecondPlayer,
        }
    }
}

/// Serialized board state, opaque to everything but the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub String);

impl Position {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A move as submitted by a client, in square-name form (e.g. `e2` → `e4`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "from")]
    pub from_square: String,
    #[serde(rename = "to")]
    pub to_square: String,
    #[serde(rename = "promotion", default, skip_serializing_if = "Option::is_none")]
    pub promotion_hint: Option<String>,
}

impl MoveRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_square: from.into(),
            to_square: to.into(),
            promotion_hint: None,
        }
    }

    pub fn with_promotion(mut self, piece: impl Into<String>) -> Self {
        self.promotion_hint = Some(piece.into());
        self
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from_square, self.to_square)?;
        if let Some(promotion) = &self.promotion_hint {
            write!(f, "={}", promotion)?;
        }
        Ok(())
    }
}

/// Remaining whole seconds on each side's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub first: u32,
    pub second: u32,
}

impl ClockState {
    pub fn new(seconds: u32) -> Self {
        Self {
            first: seconds,
            second: seconds,
        }
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    pub(crate) fn remaining_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Checkmate,
    Draw,
    Timeout,
    Other,
}

/// Winner as announced to clients; `None` for draws and aborted games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    First,
    Second,
    None,
}

impl From<Option<Side>> for Winner {
    fn from(side: Option<Side>) -> Self {
        match side {
            Some(Side::First) => Winner::First,
            Some(Side::Second) => Winner::Second,
            None => Winner::None,
        }
    }
}

/// Lifecycle of the single game instance. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Waiting,
    InProgress,
    Over {
        reason: GameOverReason,
        winner: Option<Side>,
    },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Over { .. })
    }
}

/// Payload of the `gameOver` announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverNotice {
    pub winner: Winner,
    pub reason: GameOverReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::FirstPlayer).unwrap(),
            "\"first-player\""
        );
        assert_eq!(
            serde_json::to_string(&Role::SecondPlayer).unwrap(),
            "\"second-player\""
        );
        assert_eq!(serde_json::to_string(&Role::Observer).unwrap(), "\"observer\"");
    }

    #[test]
    fn test_role_side_mapping() {
        assert_eq!(Role::FirstPlayer.side(), Some(Side::First));
        assert_eq!(Role::SecondPlayer.side(), Some(Side::Second));
        assert_eq!(Role::Observer.side(), None);
        assert_eq!(Role::from(Side::Second), Role::SecondPlayer);
        assert_eq!(Side::First.other(), Side::Second);
    }

    #[test]
    fn test_move_request_uses_short_field_names() {
        let request: MoveRequest =
            serde_json::from_str(r#"{"from":"e7","to":"e8","promotion":"q"}"#).unwrap();
        assert_eq!(request, MoveRequest::new("e7", "e8").with_promotion("q"));

        let without_hint = serde_json::to_value(MoveRequest::new("e2", "e4")).unwrap();
        assert_eq!(without_hint, serde_json::json!({ "from": "e2", "to": "e4" }));
    }

    #[test]
    fn test_game_over_notice_shape() {
        let notice = GameOverNotice {
            winner: Winner::from(None),
            reason: GameOverReason::Draw,
        };
        assert_eq!(
            serde_json::to_value(notice).unwrap(),
            serde_json::json!({ "winner": "none", "reason": "Draw" })
        );
    }
}
