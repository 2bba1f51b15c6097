//! Line Chat Server Library
//!
//! A multi-user chat server over plain TCP. Clients connect with any
//! line-oriented tool (`nc`, `telnet`), pick a username, and every line
//! they type is broadcast to everybody else. New arrivals get the full
//! chat history replayed before they see live traffic.
//!
//! # Features
//! - Newline-delimited UTF-8 protocol, no framing
//! - Welcome banner and username prompt
//! - Join / leave notices and timestamped chat lines
//! - In-memory history replayed on join
//! - `/quit` command
//! - Fixed admission ceiling
//!
//! # Architecture
//! - `ChatHub` holds the registry of sessions and the history log behind
//!   a single lock, so joins, broadcasts and leaves are linearizable
//! - Each connection runs `handle_connection` in its own task, plus a
//!   writer task fed by the session's `mpsc` channel
//! - `ChatServer` runs the accept loop and admission control
//!
//! # Example
//! ```ignore
//! use line_chat::{ChatServer, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), line_chat::AppError> {
//!     let config = Config { port: 9000, ..Config::default() };
//!     ChatServer::new(config).run().await
//! }
//! ```

pub mod banner;
pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod hub;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use history::History;
pub use hub::{AdmissionGuard, ChatHub};
pub use message::{Input, Style};
pub use registry::Registry;
pub use server::ChatServer;
pub use session::Session;
pub use types::SessionId;
