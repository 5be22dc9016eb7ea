//! Message type definitions for client-server communication.

use crate::types::{ClockState, GameOverNotice, MoveRequest, Position, Role};
use serde::{Deserialize, Serialize};

/// A message sent from the server to one or all clients.
///
/// # Example
///
/// ```json
/// { "event": "clock", "data": { "first": 598, "second": 600 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent once, right after connect.
    Role(Role),
    /// Current board; sent at connect and after every accepted move.
    Position(Position),
    /// The last accepted move, broadcast after its `position`.
    Move(MoveRequest),
    Clock(ClockState),
    /// Echo of a rejected request, only to the requester.
    InvalidMove(MoveRequest),
    GameOver(GameOverNotice),
    /// A frame that could not be decoded at all.
    Error { message: String },
}

/// A message sent from a client to the server.
///
/// # Example
///
/// ```json
/// { "event": "move", "data": { "from": "e2", "to": "e4", "promotion": "q" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Move(MoveRequest),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameOverReason, Winner};
    use serde_json::json;

    #[test]
    fn test_server_message_envelopes() {
        assert_eq!(
            serde_json::to_value(ServerMessage::Role(Role::Observer)).unwrap(),
            json!({ "event": "role", "data": "observer" })
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::Clock(ClockState::new(600))).unwrap(),
            json!({ "event": "clock", "data": { "first": 600, "second": 600 } })
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::InvalidMove(MoveRequest::new("e2", "e5")))
                .unwrap(),
            json!({ "event": "invalidMove", "data": { "from": "e2", "to": "e5" } })
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::GameOver(GameOverNotice {
                winner: Winner::First,
                reason: GameOverReason::Timeout,
            }))
            .unwrap(),
            json!({ "event": "gameOver", "data": { "winner": "first", "reason": "Timeout" } })
        );
    }

    #[test]
    fn test_position_is_a_bare_string() {
        let message = ServerMessage::Position(Position("8/8/8/8/8/8/8/8 w - - 0 1".into()));
        assert_eq!(
            serde_json::to_value(message).unwrap(),
            json!({ "event": "position", "data": "8/8/8/8/8/8/8/8 w - - 0 1" })
        );
    }
}
