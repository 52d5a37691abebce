//! WebSocket change feed.
//!
//! Provides connection tracking for shutdown and the HTTP upgrade handler
//! that streams board change signals to each client.

mod handler;
pub mod manager;

pub use handler::ws_handler;
pub use manager::WsManager;
