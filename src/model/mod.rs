//! Entity model - records, their properties, and the catalogs they bind to
//!
//! Everything here is plain data plus the invariants that keep listing
//! reference counts and record back-references consistent. View state lives
//! in [`crate::projection`].

pub mod collection;
pub mod field;
pub mod framework;
pub mod listing;
pub mod property;
pub mod record;

pub use collection::{ListCatalogs, RecordCollection};
pub use field::{FieldKind, ListField, RecordField, Side, StringField};
pub use framework::{resolve_listing, Framework, FrameworkEntry, FrameworkRegistry, FrameworkStore};
pub use listing::{ListCatalog, ListOption, Listing, ListingEntry, ListingKind};
pub use property::{FrameworkObjectProperty, ListItemProperty, PropertyRef, StringProperty};
pub use record::{CollectionId, Record, RecordId};
