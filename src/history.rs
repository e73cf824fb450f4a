//! A student's recent check-ins, newest first, capped in length.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attempt::{AttendanceAttempt, SessionInfo};
use crate::config::DEFAULT_HISTORY_CAP;
use crate::session::Mark;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub attempt_id: Uuid,
    pub session_id: Uuid,
    pub class_name: String,
    pub timestamp: i64,
    pub status: Mark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceHistory {
    entries: VecDeque<HistoryEntry>,
    cap: usize,
}

impl AttendanceHistory {
    /// Empty history holding at most `cap` entries (at least one).
    #[must_use]
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self { entries: VecDeque::with_capacity(cap), cap }
    }

    /// Prepend an entry, dropping the oldest beyond the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    pub(crate) fn record_success(&mut self, attempt: &AttendanceAttempt, info: &SessionInfo) {
        self.record(HistoryEntry {
            attempt_id: attempt.id,
            session_id: attempt.session_id,
            class_name: info.class_name.clone(),
            timestamp: info.timestamp,
            status: Mark::Present,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}

impl Default for AttendanceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
