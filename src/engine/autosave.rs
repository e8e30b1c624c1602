//! Debounced autosave scheduling
//!
//! The scheduler only tracks deadlines; the host polls [`take_due`] and
//! persists whatever it returns. Every new edit pushes the deadline back.
//!
//! [`take_due`]: AutosaveScheduler::take_due

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::EditorId;

/// Per-editor autosave deadlines
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    delay: Duration,
    deadlines: HashMap<EditorId, Instant>,
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    pub fn delay_duration(&self) -> Duration {
        self.delay
    }

    /// (Re)start the countdown for `id`
    pub fn schedule(&mut self, id: EditorId, now: Instant) {
        self.deadlines.insert(id, now + self.delay);
    }

    /// Push back a pending autosave; returns false if none is pending
    pub fn delay(&mut self, id: EditorId, now: Instant) -> bool {
        match self.deadlines.get_mut(&id) {
            Some(deadline) => {
                *deadline = now + self.delay;
                true
            }
            None => false,
        }
    }

    /// Drop a pending autosave; returns whether one was pending
    pub fn cancel(&mut self, id: EditorId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    pub fn pending(&self, id: EditorId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: EditorId) -> Option<Instant> {
        self.deadlines.get(&id).copied()
    }

    /// Remove and return every editor whose deadline has passed, earliest
    /// first
    pub fn take_due(&mut self, now: Instant) -> Vec<EditorId> {
        let mut due: Vec<(Instant, EditorId)> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}
