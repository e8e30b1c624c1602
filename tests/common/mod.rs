//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::Instant;

use crossmap::exchange::{self, MappingFileDocument, MappingObject};
use crossmap::model::{Framework, FrameworkEntry, FrameworkStore, ListCatalogs, RecordCollection, RecordId};
use crossmap::{CommandEngine, EditorConfig, EditorId};

/// Techniques known to the registry
pub const TECHNIQUES: [(&str, &str); 3] = [
    ("T1001", "Data Obfuscation"),
    ("T1003", "OS Credential Dumping"),
    ("T1059", "Command and Scripting Interpreter"),
];

/// A registry that knows the ATT&CK target framework but not the NIST
/// source framework, so the source side is dynamic
pub fn registry() -> FrameworkStore {
    let mut store = FrameworkStore::new();
    store.register(Framework {
        id: "attack".into(),
        version: "16".into(),
        entries: TECHNIQUES
            .into_iter()
            .map(|(id, name)| FrameworkEntry {
                id: id.into(),
                name: name.into(),
            })
            .collect(),
    });
    store
}

/// Builder for mapping file documents
pub struct DocumentBuilder {
    document: MappingFileDocument,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            document: MappingFileDocument {
                id: "nist-attack".into(),
                version: "1".into(),
                source_framework: "nist".into(),
                source_version: "rev5".into(),
                target_framework: "attack".into(),
                target_version: "16".into(),
                catalogs: None,
                mapping_objects: Vec::new(),
            },
        }
    }

    /// Add a mapping from `source` to `target` with the given status
    pub fn mapping(mut self, source: &str, target: &str, status: Option<&str>) -> Self {
        self.document.mapping_objects.push(MappingObject {
            source_id: Some(source.into()),
            source_text: Some(format!("{source} text")),
            source_framework: "nist".into(),
            source_version: "rev5".into(),
            target_id: Some(target.into()),
            target_text: TECHNIQUES
                .iter()
                .find(|(id, _)| *id == target)
                .map(|(_, name)| name.to_string()),
            target_framework: "attack".into(),
            target_version: "16".into(),
            mapping_status: status.map(str::to_owned),
            ..MappingObject::default()
        });
        self
    }

    /// Add `count` mappings cycling through the known statuses
    pub fn mappings(mut self, count: usize) -> Self {
        let statuses = [Some("complete"), Some("in_progress"), None];
        let targets = ["T1001", "T1003", "T1059"];
        for i in 0..count {
            self = self.mapping(
                &format!("AC-{}", i % 7),
                targets[i % targets.len()],
                statuses[i % statuses.len()],
            );
        }
        self
    }

    /// Include the default catalogs in the document
    pub fn with_catalogs(mut self) -> Self {
        self.document.catalogs = Some(ListCatalogs::default());
        self
    }

    /// Edit the last added mapping
    pub fn edit_last(mut self, edit: impl FnOnce(&mut MappingObject)) -> Self {
        if let Some(object) = self.document.mapping_objects.last_mut() {
            edit(object);
        }
        self
    }

    pub fn build(self) -> MappingFileDocument {
        self.document
    }

    pub fn open(self) -> RecordCollection {
        exchange::open_collection(&self.document, &registry()).unwrap()
    }
}

/// An engine with one editor open over `document`
pub fn open_engine(document: MappingFileDocument) -> (CommandEngine, EditorId) {
    let file = exchange::open_collection(&document, &registry()).unwrap();
    let mut engine = CommandEngine::new(EditorConfig::default());
    let id = engine.open(file);
    (engine, id)
}

/// Record ids of the editor's collection, in collection order
pub fn record_ids(engine: &CommandEngine, id: EditorId) -> Vec<RecordId> {
    engine.editor(id).unwrap().file.ids().collect()
}

/// Record ids in projected (linked) order
pub fn projected_records(engine: &CommandEngine, id: EditorId) -> Vec<RecordId> {
    engine
        .editor(id)
        .unwrap()
        .view
        .iter()
        .filter_map(|(_, item)| item.record_id())
        .collect()
}

pub fn now() -> Instant {
    Instant::now()
}
