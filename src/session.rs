//! Session struct definition
//!
//! Represents a connected user with their display name and output channel.

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::types::SessionId;

/// Connected session information
///
/// Created once the username has been chosen. The username never changes
/// afterwards. Every line sent through `sender` is written to the client's
/// stream by that session's writer task, followed by a newline.
///
/// Delivery never waits. A session whose channel is full or gone is
/// marked as closing, and its handler tears it down.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Display name chosen at join time
    pub username: String,
    /// Server → Client line channel
    pub sender: mpsc::Sender<String>,
    /// Cancelled once the session can no longer keep up
    closing: CancellationToken,
}

impl Session {
    /// Create a new session with the given ID, username and sender channel
    pub fn new(id: SessionId, username: impl Into<String>, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            username: username.into(),
            sender,
            closing: CancellationToken::new(),
        }
    }

    /// Queue a line for this session without waiting
    ///
    /// A full or closed channel marks the session as closing.
    pub fn deliver(&self, line: impl Into<String>) -> Result<(), SendError> {
        match self.sender.try_send(line.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.close();
                Err(SendError::Full)
            }
            Err(TrySendError::Closed(_)) => {
                self.close();
                Err(SendError::ChannelClosed)
            }
        }
    }

    /// Mark the session as closing
    pub fn close(&self) {
        self.closing.cancel();
    }

    /// Check whether the session has been marked as closing
    pub fn is_closing(&self) -> bool {
        self.closing.is_cancelled()
    }

    /// Resolves once the session has been marked as closing
    pub async fn closed(&self) {
        self.closing.cancelled().await
    }

    /// Token shared with the session's writer task
    pub(crate) fn closing_token(&self) -> CancellationToken {
        self.closing.clone()
    }
}
