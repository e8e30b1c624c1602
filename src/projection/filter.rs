//! Filter controls - per-field visibility of values

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{Record, RecordField};

/// Hidden values of one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterControl {
    hidden: HashSet<String>,
    hide_empty: bool,
}

impl FilterControl {
    /// Whether records/sections with `value` are shown (`None` = no value)
    pub fn is_visible(&self, value: Option<&str>) -> bool {
        match value {
            Some(value) => !self.hidden.contains(value),
            None => !self.hide_empty,
        }
    }

    pub fn set_visible(&mut self, value: Option<&str>, visible: bool) {
        match value {
            Some(value) if visible => {
                self.hidden.remove(value);
            }
            Some(value) => {
                self.hidden.insert(value.to_string());
            }
            None => self.hide_empty = !visible,
        }
    }

    /// Flip a value's visibility; returns whether it is now visible
    pub fn toggle(&mut self, value: Option<&str>) -> bool {
        let visible = !self.is_visible(value);
        self.set_visible(value, visible);
        visible
    }

    /// Whether anything is hidden
    pub fn is_active(&self) -> bool {
        self.hide_empty || !self.hidden.is_empty()
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
        self.hide_empty = false;
    }
}

/// Filter controls keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    controls: IndexMap<RecordField, FilterControl>,
}

impl FilterSet {
    pub fn control(&self, field: RecordField) -> Option<&FilterControl> {
        self.controls.get(&field)
    }

    pub fn control_mut(&mut self, field: RecordField) -> &mut FilterControl {
        self.controls.entry(field).or_default()
    }

    pub fn is_visible(&self, field: RecordField, value: Option<&str>) -> bool {
        self.controls
            .get(&field)
            .map_or(true, |control| control.is_visible(value))
    }

    /// Whether a record passes every filter
    pub fn accepts(&self, record: &Record) -> bool {
        self.controls
            .iter()
            .all(|(&field, control)| control.is_visible(record.hash_value(field)))
    }

    /// Whether any filter on `field` hides something
    pub fn is_filtering(&self, field: RecordField) -> bool {
        self.controls.get(&field).is_some_and(FilterControl::is_active)
    }

    /// Fields with at least one hidden value
    pub fn active_fields(&self) -> impl Iterator<Item = RecordField> + '_ {
        self.controls
            .iter()
            .filter(|(_, control)| control.is_active())
            .map(|(&field, _)| field)
    }

    pub fn clear(&mut self) {
        self.controls.clear();
    }
}
