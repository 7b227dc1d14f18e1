//! Unix socket IPC: protocol types, server, and clients.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{SessionClient, send_message};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{IpcServer, SessionHandler};
