//! Network front end: the listener, the accept loop and one task per
//! WebSocket connection.

pub mod core;
pub mod handlers;

pub use self::core::GameServer;
pub use handlers::handle_connection;
