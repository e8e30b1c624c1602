//! View actions (applied, never recorded for undo)
//!
//! None of these carry [`Directive::RECORD`], so the engine runs them and
//! drops them. `undo` is still implemented where the inverse is obvious.

use super::{Directive, Directives, EditorCommand};
use crate::engine::MappingFileEditor;
use crate::error::{EditorError, Result};
use crate::model::{RecordField, RecordId};
use crate::projection::ItemId;

/// Collapse or expand one section
///
/// Record items are rejected; use [`SetRecordsCollapsed`] for those.
#[derive(Debug, Clone, Copy)]
pub struct ToggleSectionCollapsed {
    pub item: ItemId,
}

impl EditorCommand for ToggleSectionCollapsed {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let item = editor
            .view
            .get(self.item)
            .ok_or(EditorError::ItemNotFound(self.item.0))?;
        if !item.is_section() {
            return Err(EditorError::NotASection(self.item.0));
        }
        let collapsed = editor.view.toggle_collapsed(self.item)?;
        tracing::debug!(item = %self.item, collapsed, "toggled section");
        Ok(Directive::REBUILD_BREAKOUTS.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.execute(editor)
    }
}

/// Collapse or expand every record (`all`) or the selected ones
#[derive(Debug, Clone, Copy)]
pub struct SetRecordsCollapsed {
    pub all: bool,
    pub collapsed: bool,
}

impl EditorCommand for SetRecordsCollapsed {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.set_records_collapsed(self.all, self.collapsed);
        Ok(Directive::RECALCULATE_POSITIONS.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.set_records_collapsed(self.all, !self.collapsed);
        Ok(Directive::RECALCULATE_POSITIONS.into())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectItem {
    pub item: ItemId,
    pub exclusive: bool,
}

impl EditorCommand for SelectItem {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.select(self.item, self.exclusive)?;
        Ok(Directives::none())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.unselect(self.item)?;
        Ok(Directives::none())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl EditorCommand for SelectAll {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.select_all();
        Ok(Directives::none())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.unselect_all();
        Ok(Directives::none())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnselectAll {
    prev: Vec<ItemId>,
}

impl EditorCommand for UnselectAll {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.prev = editor.view.selection().to_vec();
        editor.view.unselect_all();
        Ok(Directives::none())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        for &item in &self.prev {
            editor.view.select(item, false)?;
        }
        Ok(Directives::none())
    }
}

/// Replace the active breakouts
#[derive(Debug, Clone)]
pub struct SetBreakouts {
    fields: Vec<RecordField>,
    prev: Vec<RecordField>,
}

impl SetBreakouts {
    pub fn new(fields: impl IntoIterator<Item = RecordField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            prev: Vec::new(),
        }
    }
}

impl EditorCommand for SetBreakouts {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.prev = editor.view.breakouts.fields().collect();
        editor.view.breakouts.set(self.fields.iter().copied());
        Ok(Directive::REBUILD_BREAKOUTS.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.breakouts.set(self.prev.iter().copied());
        Ok(Directive::REBUILD_BREAKOUTS.into())
    }
}

/// Add or remove one breakout (added as the innermost key)
#[derive(Debug, Clone, Copy)]
pub struct ToggleBreakout {
    pub field: RecordField,
}

impl EditorCommand for ToggleBreakout {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let active = editor.view.breakouts.toggle(self.field);
        tracing::debug!(field = %self.field, active, "toggled breakout");
        Ok(Directive::REBUILD_BREAKOUTS.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.execute(editor)
    }
}

/// Show or hide one value of a field (`None` is "no value")
#[derive(Debug, Clone)]
pub struct ToggleFilterValue {
    pub field: RecordField,
    pub value: Option<String>,
}

impl EditorCommand for ToggleFilterValue {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let visible = editor
            .view
            .filters
            .control_mut(self.field)
            .toggle(self.value.as_deref());
        tracing::debug!(field = %self.field, value = ?self.value, visible, "toggled filter");
        Ok(Directive::REBUILD_BREAKOUTS.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.execute(editor)
    }
}

/// Scroll a record into view and select it
#[derive(Debug, Clone, Copy)]
pub struct MoveCameraToRecord {
    pub record: RecordId,
}

impl EditorCommand for MoveCameraToRecord {
    fn execute(&mut self, _: &mut MappingFileEditor) -> Result<Directives> {
        Ok(Directives::new(Directive::MOVE_CAMERA | Directive::EXCLUSIVE_SELECT)
            .with_focus(self.record))
    }

    fn undo(&mut self, _: &mut MappingFileEditor) -> Result<Directives> {
        Ok(Directives::none())
    }
}

/// Scroll by a signed number of units
#[derive(Debug, Clone, Copy)]
pub struct ScrollCamera {
    pub delta: isize,
}

impl EditorCommand for ScrollCamera {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.scroll_by(self.delta);
        Ok(Directives::none())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor.view.scroll_by(-self.delta);
        Ok(Directives::none())
    }
}
