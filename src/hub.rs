//! Shared chat state and broadcaster
//!
//! `ChatHub` owns the registry and the history log behind one
//! `tokio::sync::Mutex`. Every membership change, fan-out and history
//! append happens while that lock is held, so they are linearizable
//! with respect to each other:
//!
//! - join: replay history → register → notify others → append
//! - post: notify others → echo to sender → append
//! - leave: deregister → notify everyone left → append
//!
//! A joining session therefore sees every earlier line exactly once
//! (through replay) and every later line exactly once (live).
//!
//! Nothing awaits while the lock is held. Deliveries use `try_send` on
//! each session's channel; a session that cannot keep up is marked as
//! closing and dropped by its own handler. The only suspension point is
//! taking the lock, so a caller cancelled there has changed nothing.
//!
//! The active-session counter used for admission control is a separate
//! atomic; it has no ordering relationship with the state above.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::SendError;
use crate::history::History;
use crate::registry::Registry;
use crate::session::Session;
use crate::types::SessionId;

/// State guarded by the hub lock
#[derive(Debug, Default)]
struct HubState {
    registry: Registry,
    history: History,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<HubState>,
    active: AtomicUsize,
    max_sessions: usize,
}

/// Handle to the shared chat state
///
/// Cheap to clone; every connection task holds one.
#[derive(Debug, Clone)]
pub struct ChatHub {
    inner: Arc<Inner>,
}

impl ChatHub {
    /// Create an empty hub admitting at most `max_sessions` concurrent sessions
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(HubState::default()),
                active: AtomicUsize::new(0),
                max_sessions,
            }),
        }
    }

    /// Admission ceiling
    pub fn max_sessions(&self) -> usize {
        self.inner.max_sessions
    }

    /// Number of admitted connections (including those still choosing a name)
    pub fn active_count(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Take an admission slot
    ///
    /// Returns `None` when the ceiling is reached. The slot is released
    /// when the returned guard is dropped.
    pub fn try_admit(&self) -> Option<AdmissionGuard> {
        let max = self.inner.max_sessions;
        self.inner
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;

        Some(AdmissionGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Deliver `line` to every registered session except `exclude`, then record it
    ///
    /// Returns the number of sessions the line was delivered to. A failed
    /// delivery never aborts the fan-out.
    pub async fn broadcast(&self, exclude: Option<SessionId>, line: String) -> usize {
        let mut state = self.inner.state.lock().await;
        let delivered = fan_out(&state.registry, exclude, &line);
        state.history.append(line);
        delivered
    }

    /// Register a session that just picked its username
    ///
    /// Replays the full history to it, adds it to the registry, announces
    /// `notice` to everybody else and records `notice`.
    pub async fn join(&self, session: Session, notice: String) {
        let mut state = self.inner.state.lock().await;

        let replayed = state.history.replay_to(&session);
        debug!("Replayed {} history lines to {}", replayed, session.id);

        let id = session.id;
        let username = session.username.clone();
        state.registry.add(session);

        fan_out(&state.registry, Some(id), &notice);
        state.history.append(notice);

        info!(
            "Session {} joined as '{}' ({} online)",
            id,
            username,
            state.registry.len()
        );
    }

    /// Publish a chat line from `sender`
    ///
    /// Other sessions receive it through the fan-out; the sender gets one
    /// direct copy. A sender that has already left posts nothing.
    pub async fn post(&self, sender: &Session, line: String) {
        let mut state = self.inner.state.lock().await;

        if !state.registry.contains(sender.id) {
            debug!("Dropping line from departed session {}", sender.id);
            return;
        }

        fan_out(&state.registry, Some(sender.id), &line);
        if let Err(e) = sender.deliver(line.as_str()) {
            debug!("Echo to {} failed: {}", sender.id, e);
        }
        state.history.append(line);
    }

    /// Deregister a session and announce `notice` to everyone still here
    ///
    /// Returns false, and announces nothing, if the session was not registered.
    pub async fn leave(&self, id: SessionId, notice: String) -> bool {
        let mut state = self.inner.state.lock().await;

        let Some(session) = state.registry.remove(id) else {
            return false;
        };

        fan_out(&state.registry, None, &notice);
        state.history.append(notice);

        if state.registry.is_empty() {
            info!("Session {} ('{}') left, chat is empty", id, session.username);
        } else {
            info!(
                "Session {} ('{}') left ({} online)",
                id,
                session.username,
                state.registry.len()
            );
        }
        true
    }

    /// Number of registered sessions
    pub async fn member_count(&self) -> usize {
        self.inner.state.lock().await.registry.len()
    }

    /// Copy of the history log, oldest first
    pub async fn history(&self) -> Vec<String> {
        let state = self.inner.state.lock().await;
        state.history.iter().map(str::to_owned).collect()
    }
}

/// Queue `line` for every session in `registry` except `exclude`
fn fan_out(registry: &Registry, exclude: Option<SessionId>, line: &str) -> usize {
    let mut delivered = 0;
    for session in registry.recipients(exclude) {
        match session.deliver(line) {
            Ok(()) => delivered += 1,
            Err(SendError::Full) => {
                warn!("Session {} is not reading, disconnecting it", session.id)
            }
            Err(SendError::ChannelClosed) => debug!("Skipping closed session {}", session.id),
        }
    }
    delivered
}

/// One admitted connection
///
/// Dropping it gives the slot back.
#[derive(Debug)]
pub struct AdmissionGuard {
    inner: Arc<Inner>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.inner.active.fetch_sub(1, Ordering::SeqCst);
    }
}
