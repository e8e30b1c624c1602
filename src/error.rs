//! Error types for the mapping editor core
//!
//! Structural misuse (duplicate ids, unknown records, values outside a
//! catalog) is reported through [`EditorError`]. Inconsistent external data
//! is never an error: it goes through the property caching path instead.

use thiserror::Error;

use crate::model::RecordId;

/// Errors raised by the taxonomy registry boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry has no framework with this id and version
    #[error("framework '{id}' version '{version}' not found")]
    NotFound { id: String, version: String },
    /// The registry could not be reached or returned unusable data
    #[error("framework registry unavailable: {0}")]
    Unavailable(String),
}

/// Structural errors raised synchronously by the editor core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// A record with this id is already part of the collection
    #[error("record {0} already exists in the collection")]
    DuplicateRecord(RecordId),
    /// No record with this id exists in the collection
    #[error("record {0} not found")]
    RecordNotFound(RecordId),
    /// The record still belongs to a collection and cannot be inserted
    #[error("record {0} already belongs to a collection")]
    AttachedElsewhere(RecordId),
    /// A list-item value was assigned an id that its catalog does not offer
    #[error("'{value}' is not a valid option for {field}")]
    NotAnOption { field: String, value: String },
    /// A view item handle no longer refers to a live item
    #[error("view item {0} not found")]
    ItemNotFound(usize),
    /// A section-only action was given a record item
    #[error("view item {0} is not a section")]
    NotASection(usize),
    /// A field name could not be parsed
    #[error("unknown record field '{0}'")]
    UnknownField(String),
    /// No open editor has this id
    #[error("editor {0} not found")]
    EditorNotFound(u64),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, EditorError>;
