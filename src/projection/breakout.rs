//! Breakout control - the ordered set of active grouping keys

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::RecordField;

/// Active discriminators, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakoutControl {
    active: IndexSet<RecordField>,
}

impl BreakoutControl {
    pub fn new(fields: impl IntoIterator<Item = RecordField>) -> Self {
        Self {
            active: fields.into_iter().collect(),
        }
    }

    /// Replace the active set (duplicates keep their first position)
    pub fn set(&mut self, fields: impl IntoIterator<Item = RecordField>) {
        self.active = fields.into_iter().collect();
    }

    /// Append `field` as the innermost key; returns false if already active
    pub fn add(&mut self, field: RecordField) -> bool {
        self.active.insert(field)
    }

    pub fn remove(&mut self, field: RecordField) -> bool {
        self.active.shift_remove(&field)
    }

    /// Add or remove `field`; returns whether it is now active
    pub fn toggle(&mut self, field: RecordField) -> bool {
        if self.remove(field) {
            false
        } else {
            self.add(field)
        }
    }

    /// Move an active key to `index` (clamped); returns false if inactive
    pub fn move_to(&mut self, field: RecordField, index: usize) -> bool {
        let Some(from) = self.active.get_index_of(&field) else {
            return false;
        };
        let to = index.min(self.active.len() - 1);
        self.active.move_index(from, to);
        true
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn contains(&self, field: RecordField) -> bool {
        self.active.contains(&field)
    }

    pub fn primary(&self) -> Option<RecordField> {
        self.active.first().copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = RecordField> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
