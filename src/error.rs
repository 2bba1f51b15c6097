//! Error types for the chat server
//!
//! Defines application-level errors and session send errors.
//! Uses thiserror for ergonomic error definitions.

use std::net::SocketAddr;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Application-level errors
///
/// Everything except `Bind` is scoped to a single connection and ends
/// only that connection.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on a client stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error (over-long line, invalid UTF-8, IO underneath)
    #[error("Line codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Listener could not be bound (fatal at startup)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Message send errors
///
/// Occurs when a session cannot take another line right now.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The session's outbound queue is full (client not reading)
    #[error("Channel full")]
    Full,
}
