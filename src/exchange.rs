//! Flat exchange shape for records
//!
//! [`MappingObject`] is the one-row-per-record shape used by mapping files,
//! the clipboard and imports. Exporting never fails: cached values are
//! written verbatim. Importing never fails either: values a catalog or
//! listing does not know are kept as cached values on the minted record.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    resolve_listing, FrameworkObjectProperty, FrameworkRegistry, ListCatalogs, ListField, Record,
    RecordCollection, Side, StringField,
};

/// One record in flat form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingObject {
    pub source_id: Option<String>,
    pub source_text: Option<String>,
    pub source_framework: String,
    pub source_version: String,
    pub target_id: Option<String>,
    pub target_text: Option<String>,
    pub target_framework: String,
    pub target_version: String,
    pub author: Option<String>,
    pub author_contact: Option<String>,
    pub author_organization: Option<String>,
    pub references: Vec<String>,
    pub comments: Option<String>,
    pub capability_group: Option<String>,
    pub mapping_type: Option<String>,
    pub mapping_status: Option<String>,
    pub score_category: Option<String>,
    pub score_value: Option<String>,
}

impl MappingObject {
    pub fn list_value(&self, field: ListField) -> Option<&str> {
        match field {
            ListField::CapabilityGroup => self.capability_group.as_deref(),
            ListField::MappingType => self.mapping_type.as_deref(),
            ListField::MappingStatus => self.mapping_status.as_deref(),
            ListField::ScoreCategory => self.score_category.as_deref(),
            ListField::ScoreValue => self.score_value.as_deref(),
        }
    }

    fn list_value_mut(&mut self, field: ListField) -> &mut Option<String> {
        match field {
            ListField::CapabilityGroup => &mut self.capability_group,
            ListField::MappingType => &mut self.mapping_type,
            ListField::MappingStatus => &mut self.mapping_status,
            ListField::ScoreCategory => &mut self.score_category,
            ListField::ScoreValue => &mut self.score_value,
        }
    }

    pub fn text_value(&self, field: StringField) -> Option<&str> {
        match field {
            StringField::Author => self.author.as_deref(),
            StringField::AuthorContact => self.author_contact.as_deref(),
            StringField::AuthorOrganization => self.author_organization.as_deref(),
            StringField::Comments => self.comments.as_deref(),
        }
    }

    fn text_value_mut(&mut self, field: StringField) -> &mut Option<String> {
        match field {
            StringField::Author => &mut self.author,
            StringField::AuthorContact => &mut self.author_contact,
            StringField::AuthorOrganization => &mut self.author_organization,
            StringField::Comments => &mut self.comments,
        }
    }
}

const LIST_FIELDS: [ListField; 5] = [
    ListField::CapabilityGroup,
    ListField::MappingType,
    ListField::MappingStatus,
    ListField::ScoreCategory,
    ListField::ScoreValue,
];

const TEXT_FIELDS: [StringField; 4] = [
    StringField::Author,
    StringField::AuthorContact,
    StringField::AuthorOrganization,
    StringField::Comments,
];

// ============================================================================
// Records
// ============================================================================

/// Flatten one record
pub fn export_record(file: &RecordCollection, record: &Record) -> MappingObject {
    let mut object = MappingObject {
        source_id: record.source.object_id().map(str::to_owned),
        source_text: record.source.object_text().map(str::to_owned),
        source_framework: record.source.framework().to_string(),
        source_version: record.source.version().to_string(),
        target_id: record.target.object_id().map(str::to_owned),
        target_text: record.target.object_text().map(str::to_owned),
        target_framework: record.target.framework().to_string(),
        target_version: record.target.version().to_string(),
        references: record.references.clone(),
        ..MappingObject::default()
    };
    for field in LIST_FIELDS {
        *object.list_value_mut(field) = record.list_item(field).export_value(file.catalog(field));
    }
    for field in TEXT_FIELDS {
        *object.text_value_mut(field) = record.text(field).value().map(str::to_owned);
    }
    object
}

/// Flatten records in the given order
pub fn export_mapping_objects<'a>(
    file: &RecordCollection,
    records: impl IntoIterator<Item = &'a Record>,
) -> Vec<MappingObject> {
    records
        .into_iter()
        .map(|record| export_record(file, record))
        .collect()
}

/// Mint a detached record from a flat object under a fresh id
///
/// Framework objects are held cached until the record is inserted; list
/// values are matched by export value (then id), unknown ones are cached.
pub fn import_record(file: &RecordCollection, object: &MappingObject) -> Record {
    let mut record = file.create_record();
    record.source = import_object(
        file,
        Side::Source,
        (&object.source_id, &object.source_text),
        (object.source_framework.as_str(), object.source_version.as_str()),
    );
    record.target = import_object(
        file,
        Side::Target,
        (&object.target_id, &object.target_text),
        (object.target_framework.as_str(), object.target_version.as_str()),
    );
    for field in LIST_FIELDS {
        let catalog = file.catalog(field);
        let value = object.list_value(field);
        let id = value.map(|value| {
            catalog
                .find_export(value)
                .map_or(value, |option| option.id.as_str())
        });
        record.list_item_mut(field).force_set_value(catalog, id);
    }
    for field in TEXT_FIELDS {
        record.text_mut(field).set(object.text_value(field).map(str::to_owned));
    }
    record.references = object.references.clone();
    record
}

fn import_object(
    file: &RecordCollection,
    side: Side,
    (id, text): (&Option<String>, &Option<String>),
    (framework, version): (&str, &str),
) -> FrameworkObjectProperty {
    let listing = file.listing(side);
    let framework = if framework.is_empty() { listing.framework() } else { framework };
    let version = if version.is_empty() { listing.version() } else { version };
    FrameworkObjectProperty::detached(id.clone(), text.clone(), framework, version)
}

/// Mint detached records for every object, in order
pub fn import_mapping_objects(file: &RecordCollection, objects: &[MappingObject]) -> Vec<Record> {
    objects
        .iter()
        .map(|object| import_record(file, object))
        .collect()
}

// ============================================================================
// Documents
// ============================================================================

/// A mapping file: collection metadata plus its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFileDocument {
    pub id: String,
    pub version: String,
    pub source_framework: String,
    pub source_version: String,
    pub target_framework: String,
    pub target_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<ListCatalogs>,
    #[serde(default)]
    pub mapping_objects: Vec<MappingObject>,
}

impl MappingFileDocument {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading mapping file {}", path.display()))?;
        let document: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing mapping file {}", path.display()))?;
        tracing::info!(
            id = %document.id,
            records = document.mapping_objects.len(),
            "loaded mapping file {}",
            path.display()
        );
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self).context("serializing mapping file")?;
        std::fs::write(path, content)
            .with_context(|| format!("writing mapping file {}", path.display()))?;
        tracing::info!(id = %self.id, "saved mapping file {}", path.display());
        Ok(())
    }
}

/// Build a collection from a document, resolving both frameworks through
/// `registry`
pub fn open_collection(
    document: &MappingFileDocument,
    registry: &dyn FrameworkRegistry,
) -> Result<RecordCollection> {
    let source = resolve_listing(registry, &document.source_framework, &document.source_version)?;
    let target = resolve_listing(registry, &document.target_framework, &document.target_version)?;
    let catalogs = document.catalogs.clone().unwrap_or_default();
    let mut file = RecordCollection::new(&document.id, &document.version, source, target, catalogs);
    for record in import_mapping_objects(&file, &document.mapping_objects) {
        file.insert(record)?;
    }
    let invalid = file.invalid_records().len();
    if invalid > 0 {
        tracing::warn!(id = %document.id, invalid, "mapping file has records needing review");
    }
    Ok(file)
}

/// Snapshot a collection as a document
pub fn export_document(file: &RecordCollection) -> MappingFileDocument {
    let source = file.listing(Side::Source);
    let target = file.listing(Side::Target);
    MappingFileDocument {
        id: file.id.clone(),
        version: file.version.clone(),
        source_framework: source.framework().to_string(),
        source_version: source.version().to_string(),
        target_framework: target.framework().to_string(),
        target_version: target.version().to_string(),
        catalogs: Some(file.catalogs().clone()),
        mapping_objects: export_mapping_objects(file, file.records()),
    }
}
