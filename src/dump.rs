//! View state dump
//!
//! Snapshot of a projected view for printing and diagnostics: either as
//! JSON (`ViewDump` is `Serialize`) or as an indented text listing.

use std::fmt::Write as _;

use serde::Serialize;

use crate::engine::MappingFileEditor;
use crate::model::{ListField, Record, RecordField, Side};
use crate::projection::{ItemId, ItemKind, ViewItem};

#[derive(Debug, Serialize)]
pub struct ViewDump {
    pub file: String,
    pub records: usize,
    pub invalid_records: usize,
    pub breakouts: Vec<RecordField>,
    pub content_height: usize,
    pub camera: CameraDump,
    pub undo_stack_size: usize,
    pub redo_stack_size: usize,
    pub items: Vec<ItemDump>,
}

#[derive(Debug, Serialize)]
pub struct CameraDump {
    pub position: usize,
    pub view_height: usize,
}

#[derive(Debug, Serialize)]
pub struct ItemDump {
    pub id: usize,
    pub kind: &'static str,
    pub label: String,
    pub level: usize,
    pub head_offset: usize,
    pub base_offset: usize,
    pub height: usize,
    pub layer: usize,
    pub collapsed: bool,
    pub selected: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub invalid: bool,
}

impl ViewDump {
    /// Dump the linked items of `editor`, or only those visible in
    /// `[beg, end)` when a window is given
    pub fn from_editor(editor: &MappingFileEditor, window: Option<(usize, usize)>) -> Self {
        let view = &editor.view;
        let ids: Vec<ItemId> = match window {
            Some((beg, end)) => view.items_visible_at(beg, end),
            None => view.items().order(),
        };
        let items = ids
            .into_iter()
            .filter_map(|id| view.get(id).map(|item| (id, item)))
            .map(|(id, item)| ItemDump::new(editor, id, item))
            .collect();
        Self {
            file: editor.file.id.clone(),
            records: editor.file.len(),
            invalid_records: editor.file.invalid_records().len(),
            breakouts: view.breakouts.fields().collect(),
            content_height: view.content_height(),
            camera: CameraDump {
                position: view.camera().position,
                view_height: view.camera().view_height,
            },
            undo_stack_size: editor.history().undo_count(),
            redo_stack_size: editor.history().redo_count(),
            items,
        }
    }

    /// One line per item, indented by level
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({} records, {} invalid, height {})",
            self.file, self.records, self.invalid_records, self.content_height
        );
        for item in &self.items {
            let marker = match (item.kind, item.collapsed) {
                ("section", true) => "+",
                ("section", false) => "-",
                _ if item.invalid => "!",
                _ => " ",
            };
            let _ = writeln!(
                out,
                "{:>6} {:>6}  {}{} {}",
                item.head_offset,
                item.base_offset,
                "  ".repeat(item.level.saturating_sub(1)),
                marker,
                item.label
            );
        }
        out
    }
}

impl ItemDump {
    fn new(editor: &MappingFileEditor, id: ItemId, item: &ViewItem) -> Self {
        let (kind, label, invalid) = match &item.kind {
            ItemKind::Section { name, .. } => ("section", name.clone(), false),
            ItemKind::Record { record } => match editor.file.record(*record) {
                Ok(record) => (
                    "record",
                    record_label(record),
                    !editor.file.is_valid(record.id()).unwrap_or(false),
                ),
                Err(_) => ("record", record.to_string(), true),
            },
        };
        Self {
            id: id.0,
            kind,
            label,
            level: item.level,
            head_offset: item.head_offset,
            base_offset: item.base_offset,
            height: item.height,
            layer: item.layer,
            collapsed: item.collapsed,
            selected: item.selected,
            invalid,
        }
    }
}

fn record_label(record: &Record) -> String {
    let object = |side: Side| record.object(side).object_id().unwrap_or("-").to_string();
    let mut label = format!("{} -> {}", object(Side::Source), object(Side::Target));
    if let Some(kind) = record.list_item(ListField::MappingType).value() {
        let _ = write!(label, " [{kind}]");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::editor_with_records;

    #[test]
    fn test_text_dump_lists_sections_and_records() {
        let (mut editor, _) = editor_with_records(2);
        editor.view.breakouts.add(RecordField::MappingStatus);
        editor.view.rebuild_breakouts(&editor.file);
        let dump = ViewDump::from_editor(&editor, None);
        assert_eq!(dump.items.iter().filter(|item| item.kind == "record").count(), 2);
        assert_eq!(dump.items[0].kind, "section");
        let text = dump.to_text();
        assert!(text.contains("- No Value"));
        assert!(text.contains("- -> -"));
    }
}
