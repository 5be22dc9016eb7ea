//! The single game session and the actor that drives it.
//!
//! All mutation of game state happens inside [`run_session`], one queued
//! [`SessionEvent`] at a time. Connection tasks and the clock ticker only
//! ever enqueue events.

mod coordinator;
pub mod event;

pub use coordinator::GameSession;
pub use event::SessionEvent;

use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tracing::info;

/// Processes events until a shutdown event arrives or every sender is gone.
/// Returns the session so callers can inspect the final state.
pub async fn run_session(
    mut session: GameSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) -> GameSession {
    info!("🎮 Game session started");

    while let Some(event) = events.recv().await {
        if let ControlFlow::Break(()) = session.handle_event(event) {
            break;
        }
    }

    info!("🛑 Game session stopped in status {:?}", session.status());
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::messaging::ServerMessage;
    use crate::types::{ConnectionId, GameStatus, MoveRequest, Role};

    #[tokio::test]
    async fn test_actor_applies_events_in_order() {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = GameSession::from_config(&ServerConfig::default(), events_tx.clone())
            .expect("default config builds a session");
        let actor = tokio::spawn(run_session(session, events_rx));

        let (white_tx, mut white_rx) = mpsc::unbounded_channel();
        let (black_tx, _black_rx) = mpsc::unbounded_channel();
        let white = ConnectionId::new();
        let black = ConnectionId::new();

        for (connection_id, outbound) in [(white, white_tx), (black, black_tx)] {
            events_tx
                .send(SessionEvent::Connected {
                    connection_id,
                    remote_addr: "127.0.0.1:6000".parse().unwrap(),
                    outbound,
                })
                .unwrap();
        }
        // The same move twice: only the first one can be accepted
        for _ in 0..2 {
            events_tx
                .send(SessionEvent::MoveRequested {
                    connection_id: white,
                    request: MoveRequest::new("e2", "e4"),
                })
                .unwrap();
        }
        events_tx.send(SessionEvent::Shutdown).unwrap();

        let session = actor.await.unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.registry().len(), 2);

        let mut received = Vec::new();
        while let Ok(message) = white_rx.try_recv() {
            received.push(message);
        }
        assert_eq!(received[0], ServerMessage::Role(Role::FirstPlayer));
        assert_eq!(
            received.last(),
            Some(&ServerMessage::InvalidMove(MoveRequest::new("e2", "e4")))
        );
    }

    #[test]
    fn test_from_config_rejects_bad_starting_position() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let config = ServerConfig {
            starting_position: Some("not a position".to_string()),
            ..ServerConfig::default()
        };
        assert!(GameSession::from_config(&config, events_tx).is_err());
    }

    #[test]
    fn test_from_config_uses_starting_position() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let fen = "4k3/8/8/8/8/8/8/4K2R b K - 0 1";
        let config = ServerConfig {
            starting_position: Some(fen.to_string()),
            clock_seconds: 90,
            ..ServerConfig::default()
        };
        let session = GameSession::from_config(&config, events_tx).unwrap();
        assert_eq!(session.position().as_str(), fen);
        assert_eq!(session.side_to_move(), crate::types::Side::Second);
        assert_eq!(session.clock_state().first, 90);
    }
}
