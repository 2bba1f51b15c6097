//! Chat history log
//!
//! Append-only, in-memory record of every line broadcast since the
//! process started. Like the registry it is only reachable through the
//! hub lock.

use crate::session::Session;

/// Ordered sequence of emitted lines
///
/// Never truncated. Append order is emission order.
#[derive(Debug, Default)]
pub struct History {
    lines: Vec<String>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the end of the history
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Queue every stored line, oldest first, for `session`
    ///
    /// The whole backlog goes out as one newline-joined write, so its
    /// length is not bounded by the session's channel capacity. Returns
    /// the number of lines queued, 0 if the session could not take it.
    pub fn replay_to(&self, session: &Session) -> usize {
        if self.lines.is_empty() {
            return 0;
        }

        match session.deliver(self.lines.join("\n")) {
            Ok(()) => self.lines.len(),
            Err(_) => 0,
        }
    }

    /// Iterate over stored lines in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}
