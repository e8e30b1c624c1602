//! Record edits (undoable)

use std::collections::HashSet;

use super::{edit_directives, Directive, Directives, EditorCommand, GroupCommand};
use crate::engine::MappingFileEditor;
use crate::error::{EditorError, Result};
use crate::exchange::{self, MappingObject};
use crate::model::{
    FrameworkObjectProperty, ListField, ListItemProperty, Record, RecordField, RecordId, Side,
    StringField,
};

// ============================================================================
// Property edits
// ============================================================================

/// Replace a text property
#[derive(Debug, Clone)]
pub struct SetStringProperty {
    record: RecordId,
    field: StringField,
    value: Option<String>,
    prev: Option<String>,
}

impl SetStringProperty {
    pub fn new(record: RecordId, field: StringField, value: Option<String>) -> Self {
        Self {
            record,
            field,
            value,
            prev: None,
        }
    }
}

impl EditorCommand for SetStringProperty {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.prev = editor
            .file
            .set_text(self.record, self.field, self.value.clone())?;
        Ok(edit_directives(&editor.view, self.field.record_field()))
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor
            .file
            .set_text(self.record, self.field, self.prev.clone())?;
        Ok(edit_directives(&editor.view, self.field.record_field()))
    }
}

/// Replace a record's reference list
#[derive(Debug, Clone)]
pub struct SetReferences {
    record: RecordId,
    references: Vec<String>,
    prev: Vec<String>,
}

impl SetReferences {
    pub fn new(record: RecordId, references: Vec<String>) -> Self {
        Self {
            record,
            references,
            prev: Vec::new(),
        }
    }
}

impl EditorCommand for SetReferences {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.prev = editor
            .file
            .set_references(self.record, self.references.clone())?;
        Ok(Directive::EDIT.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        editor
            .file
            .set_references(self.record, self.prev.clone())?;
        Ok(Directive::EDIT.into())
    }
}

/// Select a list option; fails for values outside the catalog
#[derive(Debug, Clone)]
pub struct SetListItemProperty {
    record: RecordId,
    field: ListField,
    value: Option<String>,
    prev: Option<ListItemProperty>,
}

impl SetListItemProperty {
    pub fn new(record: RecordId, field: ListField, value: Option<String>) -> Self {
        Self {
            record,
            field,
            value,
            prev: None,
        }
    }
}

impl EditorCommand for SetListItemProperty {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let prev = editor.file.record(self.record)?.list_item(self.field).clone();
        editor
            .file
            .set_list_item(self.record, self.field, self.value.as_deref())?;
        self.prev = Some(prev);
        Ok(edit_directives(&editor.view, Some(RecordField::from(self.field))))
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        if let Some(prev) = &self.prev {
            editor.file.restore_list_item(self.record, self.field, prev)?;
        }
        Ok(edit_directives(&editor.view, Some(RecordField::from(self.field))))
    }
}

/// Bind a record's source or target object
///
/// A `text` of `None` takes the listing's text for the id.
#[derive(Debug, Clone)]
pub struct SetFrameworkObject {
    record: RecordId,
    side: Side,
    object_id: Option<String>,
    text: Option<String>,
    prev: Option<FrameworkObjectProperty>,
}

impl SetFrameworkObject {
    pub fn new(record: RecordId, side: Side, object_id: Option<String>, text: Option<String>) -> Self {
        Self {
            record,
            side,
            object_id,
            text,
            prev: None,
        }
    }
}

impl EditorCommand for SetFrameworkObject {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let prev = editor.file.record(self.record)?.object(self.side).clone();
        let bound = editor.file.set_object(
            self.record,
            self.side,
            self.object_id.as_deref(),
            self.text.as_deref(),
        )?;
        if !bound {
            tracing::warn!(
                record = %self.record,
                side = %self.side,
                object = ?self.object_id,
                "object does not match the listing, value cached"
            );
        }
        self.prev = Some(prev);
        Ok(edit_directives(&editor.view, Some(RecordField::from(self.side))))
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        if let Some(prev) = &self.prev {
            editor.file.restore_object(self.record, self.side, prev)?;
        }
        Ok(edit_directives(&editor.view, Some(RecordField::from(self.side))))
    }
}

// ============================================================================
// Structural edits
// ============================================================================

/// Insert detached records at a position (create, paste, import)
///
/// While not applied, the command owns the records; while applied, the
/// collection does.
#[derive(Debug, Clone)]
pub struct InsertRecords {
    records: Vec<Record>,
    at: Option<usize>,
    inserted: Vec<RecordId>,
}

impl InsertRecords {
    /// Insert at `at`, or append when `None`
    pub fn new(records: Vec<Record>, at: Option<usize>) -> Self {
        Self {
            records,
            at,
            inserted: Vec::new(),
        }
    }

    pub fn ids(&self) -> Vec<RecordId> {
        if self.inserted.is_empty() {
            self.records.iter().map(Record::id).collect()
        } else {
            self.inserted.clone()
        }
    }

    /// Reject the batch before touching the collection
    fn check(&self, editor: &MappingFileEditor) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.records.len());
        for record in &self.records {
            let id = record.id();
            if editor.file.contains(id) || !seen.insert(id) {
                return Err(EditorError::DuplicateRecord(id));
            }
            if record.is_attached() {
                return Err(EditorError::AttachedElsewhere(id));
            }
        }
        Ok(())
    }
}

impl EditorCommand for InsertRecords {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.check(editor)?;
        let base = self.at.unwrap_or(editor.file.len()).min(editor.file.len());
        self.inserted.clear();
        for (offset, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            let id = record.id();
            editor.file.insert_at(base + offset, record)?;
            self.inserted.push(id);
        }
        tracing::debug!(count = self.inserted.len(), at = base, "inserted records");

        let mut directives = Directives::new(
            Directive::STRUCTURAL | Directive::EXCLUSIVE_SELECT | Directive::MOVE_CAMERA,
        );
        directives.focus = self.inserted.last().copied();
        Ok(directives)
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let mut records = Vec::with_capacity(self.inserted.len());
        for &id in self.inserted.iter().rev() {
            let (_, record) = editor.file.remove(id)?;
            records.push(record);
        }
        records.reverse();
        self.records = records;
        self.inserted.clear();
        Ok(Directive::STRUCTURAL.into())
    }
}

/// Remove records, restoring their positions on undo
#[derive(Debug, Clone)]
pub struct DeleteRecords {
    ids: Vec<RecordId>,
    removed: Vec<(usize, Record)>,
}

impl DeleteRecords {
    pub fn new(ids: Vec<RecordId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }
}

impl EditorCommand for DeleteRecords {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.check(editor)?;
        self.removed.clear();
        for &id in &self.ids {
            match editor.file.remove(id) {
                Ok(removed) => self.removed.push(removed),
                Err(err) => {
                    self.restore(editor)?;
                    return Err(err);
                }
            }
        }
        tracing::debug!(count = self.removed.len(), "deleted records");
        Ok(Directive::STRUCTURAL.into())
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.restore(editor)?;
        Ok(Directive::STRUCTURAL.into())
    }
}

impl DeleteRecords {
    /// Every id must exist, once
    fn check(&self, editor: &MappingFileEditor) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        for &id in &self.ids {
            editor.file.record(id)?;
            if !seen.insert(id) {
                return Err(EditorError::RecordNotFound(id));
            }
        }
        Ok(())
    }

    /// Put removed records back at their old indices
    fn restore(&mut self, editor: &mut MappingFileEditor) -> Result<()> {
        // Indices were taken one removal at a time, so restore in reverse
        while let Some((index, record)) = self.removed.pop() {
            editor.file.insert_at(index, record)?;
        }
        Ok(())
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Index just after the last selected record, if any
fn after_selection(editor: &MappingFileEditor) -> Option<usize> {
    editor
        .view
        .selected_records()
        .into_iter()
        .filter_map(|id| editor.file.index_of(id))
        .max()
        .map(|index| index + 1)
}

/// A new record stamped from the collection's template, appended
pub fn create_record(editor: &MappingFileEditor) -> InsertRecords {
    InsertRecords::new(vec![editor.file.create_record()], None)
}

/// Records minted from flat objects (fresh ids), inserted after the
/// selection or appended
pub fn paste_records(editor: &MappingFileEditor, objects: &[MappingObject]) -> InsertRecords {
    let records = exchange::import_mapping_objects(&editor.file, objects);
    InsertRecords::new(records, after_selection(editor))
}

/// Delete every selected record
pub fn delete_selected(editor: &MappingFileEditor) -> DeleteRecords {
    DeleteRecords::new(editor.view.selected_records())
}

/// Export the selected records and delete them as one undoable step
pub fn cut_selected(editor: &MappingFileEditor) -> Result<(Vec<MappingObject>, GroupCommand)> {
    let ids = editor.view.selected_records();
    let records = ids
        .iter()
        .map(|&id| editor.file.record(id))
        .collect::<Result<Vec<_>>>()?;
    let objects = exchange::export_mapping_objects(&editor.file, records);
    let group = editor.group().with(DeleteRecords::new(ids));
    Ok((objects, group))
}
