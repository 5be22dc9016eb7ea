//! Decoding of client frames and routing them onto the session queue.

use crate::{
    error::ServerError,
    messaging::{ClientMessage, ServerMessage},
    session::SessionEvent,
    types::ConnectionId,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Parses a raw text frame as a [`ClientMessage`].
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ServerError> {
    serde_json::from_str(text).map_err(|e| ServerError::Protocol(format!("Invalid message: {e}")))
}

pub fn encode_server_message(message: &ServerMessage) -> Result<String, ServerError> {
    serde_json::to_string(message)
        .map_err(|e| ServerError::Internal(format!("Failed to serialize message: {e}")))
}

/// Decodes a client frame and enqueues the matching session event.
///
/// Routing never touches session state; the actor decides what the message
/// means once it reaches the front of the queue.
pub fn route_client_message(
    text: &str,
    connection_id: ConnectionId,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), ServerError> {
    let message = decode_client_message(text)?;

    let event = match message {
        ClientMessage::Move(request) => {
            debug!("📨 Move {} from connection {}", request, connection_id);
            SessionEvent::MoveRequested {
                connection_id,
                request,
            }
        }
    };

    events
        .send(event)
        .map_err(|_| ServerError::Internal("Session is not running".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveRequest;

    #[test]
    fn test_decode_move() {
        let message =
            decode_client_message(r#"{"event":"move","data":{"from":"e2","to":"e4","promotion":"q"}}"#)
                .unwrap();
        assert_eq!(
            message,
            ClientMessage::Move(MoveRequest::new("e2", "e4").with_promotion("q"))
        );
    }

    #[test]
    fn test_decode_rejects_unknown_events_and_garbage() {
        assert!(matches!(
            decode_client_message(r#"{"event":"resign","data":null}"#),
            Err(ServerError::Protocol(_))
        ));
        assert!(matches!(
            decode_client_message("e2e4"),
            Err(ServerError::Protocol(_))
        ));
        assert!(matches!(
            decode_client_message(r#"{"event":"move","data":{"from":"e2"}}"#),
            Err(ServerError::Protocol(_))
        ));
    }

    #[test]
    fn test_route_enqueues_move_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::new();

        route_client_message(
            r#"{"event":"move","data":{"from":"g1","to":"f3"}}"#,
            connection_id,
            &tx,
        )
        .unwrap();

        match rx.try_recv().unwrap() {
            SessionEvent::MoveRequested {
                connection_id: routed,
                request,
            } => {
                assert_eq!(routed, connection_id);
                assert_eq!(request, MoveRequest::new("g1", "f3"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_route_fails_when_session_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let result = route_client_message(
            r#"{"event":"move","data":{"from":"g1","to":"f3"}}"#,
            ConnectionId::new(),
            &tx,
        );
        assert!(matches!(result, Err(ServerError::Internal(_))));
    }
}
