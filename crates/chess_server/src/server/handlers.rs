//! Per-connection WebSocket handling.

use crate::{
    error::ServerError,
    messaging::{encode_server_message, route_client_message, ServerMessage},
    session::SessionEvent,
    types::ConnectionId,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Drives one client from handshake to disconnect.
///
/// Outgoing messages are queued by the session and written by a dedicated
/// writer task. Incoming text frames are decoded and enqueued on the
/// session queue; frames that cannot be decoded get an `error` reply.
/// Exactly one `Disconnected` event is sent for every `Connected` one.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<SessionEvent>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed for {addr}: {e}")))?;

    let (mut ws_sink, mut ws_receiver) = ws_stream.split();
    let connection_id = ConnectionId::new();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    events
        .send(SessionEvent::Connected {
            connection_id,
            remote_addr: addr,
            outbound: outbound.clone(),
        })
        .map_err(|_| ServerError::Internal("Session is not running".to_string()))?;

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = match encode_server_message(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Dropping message for {}: {}", connection_id, e);
                    continue;
                }
            };
            if let Err(e) = ws_sink.send(Message::Text(text.into())).await {
                debug!("Write to {} failed: {}", connection_id, e);
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    loop {
        let frame = tokio::select! {
            frame = ws_receiver.next() => frame,
            _ = shutdown.recv() => {
                debug!("Closing connection {} for shutdown", connection_id);
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                match route_client_message(&text, connection_id, &events) {
                    Ok(()) => {}
                    Err(ServerError::Protocol(message)) => {
                        warn!("Undecodable frame from {}: {}", connection_id, message);
                        let _ = outbound.send(ServerMessage::Error { message });
                    }
                    Err(e) => {
                        error!("Error handling message from {}: {}", connection_id, e);
                        break;
                    }
                }
            }
            Some(Ok(Message::Binary(_))) => {
                warn!("Ignoring binary frame from {}", connection_id);
            }
            Some(Ok(Message::Close(_))) => {
                info!("Connection {} requested close", connection_id);
                break;
            }
            // Pings are answered by tungstenite itself
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("WebSocket error for connection {}: {}", connection_id, e);
                break;
            }
            None => break,
        }
    }

    let _ = events.send(SessionEvent::Disconnected { connection_id });
    writer.abort();
    Ok(())
}
