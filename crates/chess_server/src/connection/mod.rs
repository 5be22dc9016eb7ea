//! Connection management for the single game instance.
//!
//! This module tracks live connections, their outbound queues and which
//! of them hold the two player slots.

pub mod client;
pub mod registry;

pub use client::{ClientConnection, Outbound};
pub use registry::{ConnectionRegistry, PlayerSlots};
