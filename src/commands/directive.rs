//! Directives - the post-processing a command asks for
//!
//! A command never touches geometry or the camera itself. It returns the
//! set of follow-up steps it needs and the engine runs them once, in a
//! fixed order, after the command has finished.

use bitflags::bitflags;

use crate::model::RecordId;

bitflags! {
    /// Follow-up work requested by a command
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Directive: u8 {
        /// The collection changed; the command belongs on the undo stack
        const RECORD = 1 << 0;
        /// The change should be persisted (debounced)
        const AUTOSAVE = 1 << 1;
        /// Section membership may have changed
        const REBUILD_BREAKOUTS = 1 << 2;
        /// Only geometry changed
        const RECALCULATE_POSITIONS = 1 << 3;
        /// Make the focused record the only selection
        const EXCLUSIVE_SELECT = 1 << 4;
        /// Scroll the focused record into view
        const MOVE_CAMERA = 1 << 5;

        /// Any edit to the collection
        const EDIT = Self::RECORD.bits() | Self::AUTOSAVE.bits();
        /// An edit that moved records between sections
        const STRUCTURAL = Self::EDIT.bits() | Self::REBUILD_BREAKOUTS.bits();
    }
}

/// Directive flags plus the record they refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directives {
    pub flags: Directive,
    /// Target of `EXCLUSIVE_SELECT` / `MOVE_CAMERA`
    pub focus: Option<RecordId>,
}

impl Directives {
    pub fn new(flags: Directive) -> Self {
        Self { flags, focus: None }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_focus(mut self, record: RecordId) -> Self {
        self.focus = Some(record);
        self
    }

    /// Combine with the directives of a later command
    ///
    /// Flags are OR-ed; the later focus wins.
    pub fn merge(&mut self, other: Directives) {
        self.flags |= other.flags;
        if other.focus.is_some() {
            self.focus = other.focus;
        }
    }

    pub fn contains(&self, flags: Directive) -> bool {
        self.flags.contains(flags)
    }

    /// Whether the command goes on the undo stack
    pub fn is_undoable(&self) -> bool {
        self.flags.contains(Directive::RECORD)
    }

    /// Whether a committed command should (re)schedule an autosave
    pub fn wants_autosave(&self) -> bool {
        self.flags.contains(Directive::RECORD | Directive::AUTOSAVE)
    }
}

impl From<Directive> for Directives {
    fn from(flags: Directive) -> Self {
        Self::new(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_ors_flags_and_keeps_last_focus() {
        let first = RecordId::new();
        let second = RecordId::new();
        let mut directives = Directives::new(Directive::EDIT).with_focus(first);
        directives.merge(Directive::RECALCULATE_POSITIONS.into());
        assert_eq!(directives.focus, Some(first));
        directives.merge(Directives::new(Directive::MOVE_CAMERA).with_focus(second));
        assert_eq!(directives.focus, Some(second));
        assert!(directives.contains(Directive::RECORD | Directive::MOVE_CAMERA));
        assert!(directives.is_undoable());
    }

    #[test]
    fn test_autosave_needs_record_bit() {
        assert!(!Directives::new(Directive::AUTOSAVE).wants_autosave());
        assert!(Directives::new(Directive::STRUCTURAL).wants_autosave());
        assert!(!Directives::none().is_undoable());
    }
}
