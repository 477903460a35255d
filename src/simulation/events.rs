//! Action log and UI cues
//!
//! The action log is the player-facing history of the session: append-only,
//! stamped with the day it happened on. Cues are fire-and-forget signals for
//! the host (sound, animation); the engine only records them.

use serde::Serialize;

use crate::core::types::Day;

/// An entry in the action log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub day: Day,
    pub message: String,
    /// Highlighted in the host UI
    pub important: bool,
}

/// Append-only action log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, day: Day, message: impl Into<String>, important: bool) {
        self.entries.push(LogEntry {
            day,
            message: message.into(),
            important,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` entries, oldest first
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

/// Host-facing side effect signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cue {
    Vaccination,
    Quarantine,
    LinkBreak,
    /// Informational tool used (test or trace)
    Inspection,
    InfectionSpread,
    DayAdvance,
    GameOver,
    ActionDenied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_append_only_in_order() {
        let mut log = ActionLog::new();
        assert!(log.is_empty());
        log.push(1, "first", true);
        log.push(1, String::from("second"), false);
        log.push(2, "third", false);

        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].message, "first");
        assert!(log.entries()[0].important);
        assert_eq!(log.last().map(|e| e.day), Some(2));
    }

    #[test]
    fn test_tail() {
        let mut log = ActionLog::new();
        for i in 0..5 {
            log.push(1, format!("entry {}", i), false);
        }
        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].message, "entry 3");
        assert_eq!(log.tail(10).len(), 5);
    }
}
