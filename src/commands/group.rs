//! Composite commands with all-or-nothing semantics

use serde::{Deserialize, Serialize};

use super::{Directives, EditorCommand};
use crate::engine::MappingFileEditor;
use crate::error::Result;

/// Order in which already-applied steps are undone after a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackOrder {
    /// Last applied step first
    #[default]
    Reverse,
    /// First applied step first
    Forward,
}

/// An ordered sequence of commands applied as one
///
/// If a step fails, the steps applied before it are undone and the step's
/// error is returned.
#[derive(Debug, Default)]
pub struct GroupCommand {
    commands: Vec<Box<dyn EditorCommand>>,
    rollback_order: RollbackOrder,
}

impl GroupCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rollback_order(mut self, order: RollbackOrder) -> Self {
        self.rollback_order = order;
        self
    }

    pub fn push(&mut self, command: impl EditorCommand + 'static) {
        self.commands.push(Box::new(command));
    }

    pub fn with(mut self, command: impl EditorCommand + 'static) -> Self {
        self.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn apply(&mut self, editor: &mut MappingFileEditor, redo: bool) -> Result<Directives> {
        let mut directives = Directives::none();
        let mut applied = Vec::with_capacity(self.commands.len());
        for i in 0..self.commands.len() {
            let command = &mut self.commands[i];
            let result = if redo {
                command.redo(editor)
            } else {
                command.execute(editor)
            };
            match result {
                Ok(step) => {
                    directives.merge(step);
                    applied.push(i);
                }
                Err(err) => {
                    tracing::warn!(step = i, error = %err, "group step failed, rolling back");
                    self.rollback(editor, applied);
                    return Err(err);
                }
            }
        }
        Ok(directives)
    }

    fn rollback(&mut self, editor: &mut MappingFileEditor, mut applied: Vec<usize>) {
        if self.rollback_order == RollbackOrder::Reverse {
            applied.reverse();
        }
        for i in applied {
            if let Err(err) = self.commands[i].undo(editor) {
                tracing::error!(step = i, error = %err, "rollback step failed");
            }
        }
    }
}

impl EditorCommand for GroupCommand {
    fn execute(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.apply(editor, false)
    }

    fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        let mut directives = Directives::none();
        for command in self.commands.iter_mut().rev() {
            directives.merge(command.undo(editor)?);
        }
        Ok(directives)
    }

    fn redo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
        self.apply(editor, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Directive, SetStringProperty};
    use crate::engine::test_support::editor_with_records;
    use crate::error::EditorError;
    use crate::model::{RecordId, StringField};

    /// Records the order its undo ran in, optionally failing on execute
    #[derive(Debug)]
    struct Step {
        tag: &'static str,
        fail: bool,
    }

    impl EditorCommand for Step {
        fn execute(&mut self, _: &mut MappingFileEditor) -> Result<Directives> {
            if self.fail {
                return Err(EditorError::UnknownField(self.tag.to_string()));
            }
            Ok(Directive::EDIT.into())
        }

        fn undo(&mut self, editor: &mut MappingFileEditor) -> Result<Directives> {
            let id = editor.file.ids().next().ok_or(EditorError::ItemNotFound(0))?;
            let log = editor.file.record(id)?.comments.value().unwrap_or_default().to_string();
            editor
                .file
                .set_text(id, StringField::Comments, Some(format!("{log}{}", self.tag)))?;
            Ok(Directives::none())
        }
    }

    fn comments(editor: &MappingFileEditor, id: RecordId) -> Option<String> {
        editor
            .file
            .record(id)
            .ok()
            .and_then(|r| r.comments.value().map(str::to_owned))
    }

    #[test]
    fn test_failed_step_rolls_back_applied_steps() {
        let (mut editor, ids) = editor_with_records(1);
        let mut group = GroupCommand::new()
            .with(SetStringProperty::new(ids[0], StringField::Author, Some("Ada".into())))
            .with(Step { tag: "x", fail: true })
            .with(SetStringProperty::new(ids[0], StringField::Author, Some("Bo".into())));

        let err = group.execute(&mut editor).unwrap_err();
        assert_eq!(err, EditorError::UnknownField("x".into()));
        assert_eq!(editor.file.record(ids[0]).unwrap().author.value(), None);
    }

    #[test]
    fn test_rollback_order() {
        let (mut editor, ids) = editor_with_records(1);
        let mut group = GroupCommand::new()
            .with(Step { tag: "a", fail: false })
            .with(Step { tag: "b", fail: false })
            .with(Step { tag: "!", fail: true });
        assert!(group.execute(&mut editor).is_err());
        assert_eq!(comments(&editor, ids[0]).as_deref(), Some("ba"));

        let (mut editor, ids) = editor_with_records(1);
        let mut group = GroupCommand::new()
            .with_rollback_order(RollbackOrder::Forward)
            .with(Step { tag: "a", fail: false })
            .with(Step { tag: "b", fail: false })
            .with(Step { tag: "!", fail: true });
        assert!(group.execute(&mut editor).is_err());
        assert_eq!(comments(&editor, ids[0]).as_deref(), Some("ab"));
    }

    #[test]
    fn test_execute_then_undo_restores() {
        let (mut editor, ids) = editor_with_records(2);
        let mut group = GroupCommand::new()
            .with(SetStringProperty::new(ids[0], StringField::Author, Some("Ada".into())))
            .with(SetStringProperty::new(ids[1], StringField::Comments, Some("n".into())));
        let directives = group.execute(&mut editor).unwrap();
        assert!(directives.is_undoable());
        group.undo(&mut editor).unwrap();
        assert_eq!(editor.file.record(ids[0]).unwrap().author.value(), None);
        assert_eq!(comments(&editor, ids[1]), None);
    }
}
