//! Wire protocol between clients and the server.
//!
//! Every frame is a JSON text frame with an `{event, data}` envelope.

pub mod router;
pub mod types;

pub use router::{decode_client_message, encode_server_message, route_client_message};
pub use types::{ClientMessage, ServerMessage};
