//! Command engine
//!
//! Owns the open editors, runs commands against them and interprets the
//! directives they return. Interpretation order is fixed: rebuild (or just
//! re-layout), then camera and selection, then autosave scheduling, since
//! the camera needs post-rebuild offsets.

pub mod autosave;
pub mod history;

use std::time::Instant;

use indexmap::IndexMap;

pub use autosave::AutosaveScheduler;
pub use history::History;

use crate::commands::{Directive, Directives, EditorCommand, GroupCommand, RollbackOrder};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::exchange::{self, MappingFileDocument, MappingObject};
use crate::model::RecordCollection;
use crate::projection::ViewProjection;

/// Identifies an open editor
pub type EditorId = u64;

/// One open mapping file: its records, its view and its history
#[derive(Debug)]
pub struct MappingFileEditor {
    id: EditorId,
    pub file: RecordCollection,
    pub view: ViewProjection,
    history: History<Box<dyn EditorCommand>>,
    rollback_order: RollbackOrder,
}

impl MappingFileEditor {
    pub fn new(id: EditorId, file: RecordCollection, config: &EditorConfig) -> Self {
        let mut view = ViewProjection::new(config.metrics, 0);
        view.breakouts.set(config.default_breakouts.iter().copied());
        view.rebuild_breakouts(&file);
        Self {
            id,
            file,
            view,
            history: History::with_max_size(config.history_limit),
            rollback_order: config.rollback_order,
        }
    }

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn history(&self) -> &History<Box<dyn EditorCommand>> {
        &self.history
    }

    /// An empty group command using this editor's rollback order
    pub fn group(&self) -> GroupCommand {
        GroupCommand::new().with_rollback_order(self.rollback_order)
    }

    /// Flat export of the selected records, in view order
    pub fn copy_selected(&self) -> Result<Vec<MappingObject>> {
        let records = self
            .view
            .selected_records()
            .into_iter()
            .map(|id| self.file.record(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(exchange::export_mapping_objects(&self.file, records))
    }

    /// Run the follow-up work a command asked for
    fn interpret(&mut self, directives: &Directives) -> Result<()> {
        if directives.contains(Directive::REBUILD_BREAKOUTS) {
            self.view.rebuild_breakouts(&self.file);
        } else if directives.contains(Directive::RECALCULATE_POSITIONS) {
            self.view.recalculate_positions();
        }
        let Some(record) = directives.focus else {
            return Ok(());
        };
        if !self.view.is_record_visible(record) {
            tracing::debug!(%record, "focused record is not visible");
            return Ok(());
        }
        if directives.contains(Directive::MOVE_CAMERA) {
            self.view.move_to_record(record, false)?;
        }
        if directives.contains(Directive::EXCLUSIVE_SELECT) {
            self.view.select_record(record, true)?;
        }
        Ok(())
    }
}

/// Open editors plus the shared autosave scheduler
#[derive(Debug)]
pub struct CommandEngine {
    editors: IndexMap<EditorId, MappingFileEditor>,
    next_id: EditorId,
    autosave: AutosaveScheduler,
    config: EditorConfig,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CommandEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            editors: IndexMap::new(),
            next_id: 1,
            autosave: AutosaveScheduler::new(config.autosave_delay()),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    // === Editors ===

    pub fn open(&mut self, file: RecordCollection) -> EditorId {
        let id = self.next_id;
        self.next_id += 1;
        tracing::info!(editor = id, file = %file.id, records = file.len(), "opened editor");
        self.editors
            .insert(id, MappingFileEditor::new(id, file, &self.config));
        id
    }

    pub fn close(&mut self, id: EditorId) -> Result<MappingFileEditor> {
        let editor = self
            .editors
            .shift_remove(&id)
            .ok_or(EditorError::EditorNotFound(id))?;
        self.autosave.cancel(id);
        tracing::info!(editor = id, "closed editor");
        Ok(editor)
    }

    pub fn editor(&self, id: EditorId) -> Result<&MappingFileEditor> {
        self.editors.get(&id).ok_or(EditorError::EditorNotFound(id))
    }

    pub fn editor_mut(&mut self, id: EditorId) -> Result<&mut MappingFileEditor> {
        self.editors
            .get_mut(&id)
            .ok_or(EditorError::EditorNotFound(id))
    }

    pub fn editor_ids(&self) -> impl Iterator<Item = EditorId> + '_ {
        self.editors.keys().copied()
    }

    // === Commands ===

    /// Run a command and interpret its directives
    ///
    /// Commands carrying [`Directive::RECORD`] go on the undo stack (which
    /// clears the redo stack); everything else is applied and dropped.
    pub fn execute(
        &mut self,
        id: EditorId,
        command: impl EditorCommand + 'static,
        now: Instant,
    ) -> Result<Directives> {
        self.execute_boxed(id, Box::new(command), now)
    }

    pub fn execute_boxed(
        &mut self,
        id: EditorId,
        mut command: Box<dyn EditorCommand>,
        now: Instant,
    ) -> Result<Directives> {
        let editor = self
            .editors
            .get_mut(&id)
            .ok_or(EditorError::EditorNotFound(id))?;
        let directives = command.execute(editor)?;
        tracing::debug!(editor = id, flags = ?directives.flags, "executed command");
        if directives.is_undoable() {
            editor.history.push(command);
        }
        editor.interpret(&directives)?;
        if directives.wants_autosave() {
            self.autosave.schedule(id, now);
        }
        Ok(directives)
    }

    /// Undo the most recent recorded command; no-op when there is none
    pub fn undo(&mut self, id: EditorId, now: Instant) -> Result<Directives> {
        let editor = self
            .editors
            .get_mut(&id)
            .ok_or(EditorError::EditorNotFound(id))?;
        let Some(mut command) = editor.history.pop_undo() else {
            return Ok(Directives::none());
        };
        let directives = command.undo(editor).inspect_err(|err| {
            tracing::error!(editor = id, error = %err, "undo failed, command dropped");
        })?;
        editor.history.push_undone(command);
        editor.interpret(&directives)?;
        if directives.wants_autosave() {
            self.autosave.schedule(id, now);
        }
        Ok(directives)
    }

    /// Redo the most recently undone command; no-op when there is none
    pub fn redo(&mut self, id: EditorId, now: Instant) -> Result<Directives> {
        let editor = self
            .editors
            .get_mut(&id)
            .ok_or(EditorError::EditorNotFound(id))?;
        let Some(mut command) = editor.history.pop_redo() else {
            return Ok(Directives::none());
        };
        let directives = command.redo(editor).inspect_err(|err| {
            tracing::error!(editor = id, error = %err, "redo failed, command dropped");
        })?;
        editor.history.push_redone(command);
        editor.interpret(&directives)?;
        if directives.wants_autosave() {
            self.autosave.schedule(id, now);
        }
        Ok(directives)
    }

    pub fn can_undo(&self, id: EditorId) -> bool {
        self.editors.get(&id).is_some_and(|e| e.history.can_undo())
    }

    pub fn can_redo(&self, id: EditorId) -> bool {
        self.editors.get(&id).is_some_and(|e| e.history.can_redo())
    }

    // === Persistence hooks ===

    /// Snapshot an editor for saving; cancels its pending autosave
    pub fn save(&mut self, id: EditorId) -> Result<MappingFileDocument> {
        let editor = self.editor(id)?;
        let document = exchange::export_document(&editor.file);
        if self.autosave.cancel(id) {
            tracing::debug!(editor = id, "cancelled pending autosave");
        }
        Ok(document)
    }

    /// Editors whose autosave is due; the host persists them
    pub fn due_autosaves(&mut self, now: Instant) -> Vec<EditorId> {
        let due = self.autosave.take_due(now);
        if !due.is_empty() {
            tracing::info!(editors = ?due, "autosave due");
        }
        due
    }

    pub fn copy_selected(&self, id: EditorId) -> Result<Vec<MappingObject>> {
        self.editor(id)?.copy_selected()
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::test_support::editor_with_records;
    use super::*;
    use crate::commands::{
        create_record, SelectAll, SetListItemProperty, SetStringProperty, ToggleBreakout,
    };
    use crate::model::{ListField, RecordField, StringField};

    fn engine_with_records(count: usize) -> (CommandEngine, EditorId, Vec<crate::model::RecordId>) {
        let (editor, ids) = editor_with_records(count);
        let mut engine = CommandEngine::default();
        let id = engine.open(editor.file);
        (engine, id, ids)
    }

    #[test]
    fn test_record_commands_are_undoable() {
        let now = Instant::now();
        let (mut engine, id, ids) = engine_with_records(1);
        engine
            .execute(id, SetStringProperty::new(ids[0], StringField::Author, Some("Ada".into())), now)
            .unwrap();
        assert!(engine.can_undo(id));

        engine.undo(id, now).unwrap();
        let author = |engine: &CommandEngine| {
            engine.editor(id).unwrap().file.record(ids[0]).unwrap().author.value().map(str::to_owned)
        };
        assert_eq!(author(&engine), None);
        assert!(engine.can_redo(id));

        engine.redo(id, now).unwrap();
        assert_eq!(author(&engine).as_deref(), Some("Ada"));
    }

    #[test]
    fn test_view_commands_keep_redo_stack() {
        let now = Instant::now();
        let (mut engine, id, ids) = engine_with_records(1);
        engine
            .execute(id, SetStringProperty::new(ids[0], StringField::Comments, Some("x".into())), now)
            .unwrap();
        engine.undo(id, now).unwrap();
        engine.execute(id, SelectAll, now).unwrap();
        assert!(engine.can_redo(id));

        engine
            .execute(id, SetStringProperty::new(ids[0], StringField::Comments, Some("y".into())), now)
            .unwrap();
        assert!(!engine.can_redo(id));
    }

    #[test]
    fn test_failed_command_leaves_no_history() {
        let now = Instant::now();
        let (mut engine, id, ids) = engine_with_records(1);
        let result = engine.execute(
            id,
            SetListItemProperty::new(ids[0], ListField::MappingType, Some("nope".into())),
            now,
        );
        assert!(result.is_err());
        assert!(!engine.can_undo(id));
        assert!(!engine.autosave().pending(id));
    }

    #[test]
    fn test_insert_selects_and_rebuilds() {
        let now = Instant::now();
        let (mut engine, id, _) = engine_with_records(3);
        engine.execute(id, ToggleBreakout { field: RecordField::MappingStatus }, now).unwrap();
        let command = create_record(engine.editor(id).unwrap());
        let new_id = command.ids()[0];
        engine.execute(id, command, now).unwrap();

        let editor = engine.editor(id).unwrap();
        assert!(editor.view.is_record_visible(new_id));
        assert_eq!(editor.view.selected_records(), vec![new_id]);
    }

    #[test]
    fn test_autosave_scheduled_and_cancelled_by_save() {
        let now = Instant::now();
        let (mut engine, id, ids) = engine_with_records(1);
        engine.execute(id, SelectAll, now).unwrap();
        assert!(!engine.autosave().pending(id));

        engine
            .execute(id, SetStringProperty::new(ids[0], StringField::Author, Some("Ada".into())), now)
            .unwrap();
        assert!(engine.autosave().pending(id));
        let document = engine.save(id).unwrap();
        assert_eq!(document.mapping_objects.len(), 1);
        assert!(!engine.autosave().pending(id));

        engine
            .execute(id, SetStringProperty::new(ids[0], StringField::Author, None), now)
            .unwrap();
        let later = now + Duration::from_secs(10);
        assert_eq!(engine.due_autosaves(later), vec![id]);
    }

    #[test]
    fn test_unknown_editor() {
        let mut engine = CommandEngine::default();
        assert_eq!(
            engine.undo(42, Instant::now()).unwrap_err(),
            EditorError::EditorNotFound(42)
        );
        assert!(engine.close(42).is_err());
    }
}
