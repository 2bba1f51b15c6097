//! Registry of connected sessions
//!
//! The set of sessions that receive broadcasts. A `Registry` carries no
//! lock of its own; it lives inside the hub state and is only ever
//! touched while the hub lock is held, which is what makes membership
//! changes and snapshot iteration atomic relative to each other.

use std::collections::HashMap;

use crate::session::Session;
use crate::types::SessionId;

/// Currently connected sessions: SessionId -> Session
///
/// Keyed by identity so that a session appears at most once and removal
/// does not need a scan.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<SessionId, Session>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session
    ///
    /// Returns false if a session with the same id was already present,
    /// in which case the stored entry is replaced.
    pub fn add(&mut self, session: Session) -> bool {
        self.sessions.insert(session.id, session).is_none()
    }

    /// Remove a session by identity
    ///
    /// Removing an absent session is a no-op.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Check whether a session is registered
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Iterate over every registered session
    ///
    /// Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Iterate over every registered session except `exclude`
    pub fn recipients(&self, exclude: Option<SessionId>) -> impl Iterator<Item = &Session> {
        self.iter().filter(move |s| Some(s.id) != exclude)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session is registered
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
