//! crossmap - capability mapping editor core
//!
//! Projects a collection of mapping records into a flat, virtualized list
//! of grouped sections, and edits it through undoable commands whose
//! directives tell the engine how to refresh the view.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod dump;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod model;
pub mod projection;
pub mod tracing;

// Re-export commonly used types
pub use commands::{Directive, Directives, EditorCommand, GroupCommand};
pub use config::EditorConfig;
pub use engine::{CommandEngine, EditorId, MappingFileEditor};
pub use error::{EditorError, RegistryError, Result};
pub use model::RecordCollection;
pub use projection::ViewProjection;
