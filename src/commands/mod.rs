//! Editor commands
//!
//! Every mutation of an editor (record edits as well as view actions) is an
//! [`EditorCommand`]. Commands receive the editor they act on when they run
//! and report the follow-up work they need as [`Directives`]. Commands whose
//! directives carry [`Directive::RECORD`] are kept for undo/redo.

pub mod directive;
pub mod group;
pub mod record;
pub mod view;

use std::fmt;

pub use directive::{Directive, Directives};
pub use group::{GroupCommand, RollbackOrder};
pub use record::{
    create_record, cut_selected, delete_selected, paste_records, DeleteRecords, InsertRecords,
    SetFrameworkObject, SetListItemProperty, SetReferences, SetStringProperty,
};
pub use view::{
    MoveCameraToRecord, ScrollCamera, SelectAll, SelectItem, SetBreakouts, SetRecordsCollapsed,
    ToggleBreakout, ToggleFilterValue, ToggleSectionCollapsed, UnselectAll,
};

use crate::engine::MappingFileEditor;
use crate::error::Result;
use crate::model::RecordField;
use crate::projection::ViewProjection;

/// A reversible operation on one editor
///
/// `execute` and `undo` either succeed completely or leave the editor as
/// they found it.
pub trait EditorCommand: fmt::Debug {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives>;

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives>;

    fn redo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.execute(editor)
    }
}

/// Directives for an edit of `field` on a record
///
/// Rebuilds only when the field drives grouping or filtering.
pub(crate) fn edit_directives(view: &ViewProjection, field: Option<RecordField>) -> Directives {
    let rebuild = field.is_some_and(|field| {
        view.breakouts.contains(field) || view.filters.is_filtering(field)
    });
    if rebuild {
        Directives::new(Directive::STRUCTURAL)
    } else {
        Directives::new(Directive::EDIT)
    }
}
