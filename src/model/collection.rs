//! Record collections
//!
//! A [`RecordCollection`] owns an ordered id→record map together with the
//! listings and catalogs its records are bound to. All catalog-bound edits
//! go through the collection so listing reference counts stay exact.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::field::{FieldKind, ListField, RecordField, Side, StringField};
use super::listing::{ListCatalog, ListOption, Listing};
use super::property::{FrameworkObjectProperty, ListItemProperty};
use super::record::{CollectionId, Record, RecordId};
use crate::{EditorError, Result};

// ============================================================================
// Catalogs
// ============================================================================

/// The option sets behind every list-item field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListCatalogs {
    pub capability_group: ListCatalog,
    pub mapping_type: ListCatalog,
    pub mapping_status: ListCatalog,
    pub score_category: ListCatalog,
    pub score_value: ListCatalog,
}

impl ListCatalogs {
    pub fn get(&self, field: ListField) -> &ListCatalog {
        match field {
            ListField::CapabilityGroup => &self.capability_group,
            ListField::MappingType => &self.mapping_type,
            ListField::MappingStatus => &self.mapping_status,
            ListField::ScoreCategory => &self.score_category,
            ListField::ScoreValue => &self.score_value,
        }
    }

    pub fn get_mut(&mut self, field: ListField) -> &mut ListCatalog {
        match field {
            ListField::CapabilityGroup => &mut self.capability_group,
            ListField::MappingType => &mut self.mapping_type,
            ListField::MappingStatus => &mut self.mapping_status,
            ListField::ScoreCategory => &mut self.score_category,
            ListField::ScoreValue => &mut self.score_value,
        }
    }
}

impl Default for ListCatalogs {
    fn default() -> Self {
        let field = |f: ListField| f.to_string();
        Self {
            capability_group: ListCatalog::new(&field(ListField::CapabilityGroup), []),
            mapping_type: ListCatalog::new(
                &field(ListField::MappingType),
                [
                    ListOption::new("mitigates", "Mitigates"),
                    ListOption::new("protects", "Protects"),
                    ListOption::new("detects", "Detects"),
                    ListOption::new("related_to", "Related To"),
                ],
            ),
            mapping_status: ListCatalog::new(
                &field(ListField::MappingStatus),
                [
                    ListOption::new("complete", "Complete"),
                    ListOption::new("in_progress", "In Progress"),
                    ListOption::new("non_mappable", "Non-Mappable"),
                ],
            ),
            score_category: ListCatalog::new(
                &field(ListField::ScoreCategory),
                [
                    ListOption::new("protect", "Protect"),
                    ListOption::new("detect", "Detect"),
                    ListOption::new("respond", "Respond"),
                ],
            ),
            score_value: ListCatalog::new(
                &field(ListField::ScoreValue),
                [
                    ListOption::new("minimal", "Minimal"),
                    ListOption::new("partial", "Partial"),
                    ListOption::new("significant", "Significant"),
                ],
            ),
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Ordered records plus the catalogs they are bound to
#[derive(Debug, Clone)]
pub struct RecordCollection {
    key: CollectionId,
    pub id: String,
    pub version: String,
    source: Listing,
    target: Listing,
    catalogs: ListCatalogs,
    records: IndexMap<RecordId, Record>,
    template: Record,
}

impl RecordCollection {
    pub fn new(id: &str, version: &str, source: Listing, target: Listing, catalogs: ListCatalogs) -> Self {
        let template = Record::new(
            RecordId::new(),
            (source.framework(), source.version()),
            (target.framework(), target.version()),
        );
        Self {
            key: CollectionId::new(),
            id: id.to_string(),
            version: version.to_string(),
            source,
            target,
            catalogs,
            records: IndexMap::new(),
            template,
        }
    }

    pub fn key(&self) -> CollectionId {
        self.key
    }

    pub fn listing(&self, side: Side) -> &Listing {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub fn catalogs(&self) -> &ListCatalogs {
        &self.catalogs
    }

    pub fn catalog(&self, field: ListField) -> &ListCatalog {
        self.catalogs.get(field)
    }

    /// Record whose values stamp new records
    pub fn template(&self) -> &Record {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut Record {
        &mut self.template
    }

    /// Mint a detached record from the template
    pub fn create_record(&self) -> Record {
        self.template.duplicate()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Records in render/export order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.keys().copied()
    }

    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.records.get_index_of(&id)
    }

    pub fn record(&self, id: RecordId) -> Result<&Record> {
        self.records.get(&id).ok_or(EditorError::RecordNotFound(id))
    }

    /// Mutable access for properties that are not catalog-bound; callers
    /// outside the crate go through `set_text`/`set_references`
    pub(crate) fn record_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        self.records.get_mut(&id).ok_or(EditorError::RecordNotFound(id))
    }

    // === Membership ===

    /// Append a detached record
    pub fn insert(&mut self, record: Record) -> Result<()> {
        let len = self.records.len();
        self.insert_at(len, record)
    }

    /// Insert a detached record at `index` (clamped to the end)
    ///
    /// Fails on a duplicate id or a record still owned by a collection.
    pub fn insert_at(&mut self, index: usize, mut record: Record) -> Result<()> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(EditorError::DuplicateRecord(id));
        }
        if record.is_attached() {
            return Err(EditorError::AttachedElsewhere(id));
        }
        self.attach(&mut record);
        let index = index.min(self.records.len());
        self.records.shift_insert(index, id, record);
        Ok(())
    }

    /// Remove a record, returning its former index and the detached record
    pub fn remove(&mut self, id: RecordId) -> Result<(usize, Record)> {
        let (index, _, mut record) = self
            .records
            .shift_remove_full(&id)
            .ok_or(EditorError::RecordNotFound(id))?;
        self.detach(&mut record);
        Ok((index, record))
    }

    fn attach(&mut self, record: &mut Record) {
        record.set_collection(Some(self.key));
        record.source.try_uncache(&mut self.source);
        record.target.try_uncache(&mut self.target);
        for field in LIST_FIELDS {
            record.list_item_mut(field).try_uncache(self.catalogs.get(field));
        }
    }

    fn detach(&mut self, record: &mut Record) {
        record.source.cache(&mut self.source);
        record.target.cache(&mut self.target);
        record.set_collection(None);
    }

    // === Catalog-bound edits ===

    /// Bind a record's framework object (see [`FrameworkObjectProperty::set_value`])
    pub fn set_object(
        &mut self,
        id: RecordId,
        side: Side,
        object_id: Option<&str>,
        text: Option<&str>,
    ) -> Result<bool> {
        let Self {
            records,
            source,
            target,
            ..
        } = self;
        let record = records.get_mut(&id).ok_or(EditorError::RecordNotFound(id))?;
        let listing = match side {
            Side::Source => source,
            Side::Target => target,
        };
        Ok(record
            .object_mut(side)
            .set_value(listing, object_id, text, None, None))
    }

    /// Put a framework object back into a previously captured state
    pub fn restore_object(
        &mut self,
        id: RecordId,
        side: Side,
        prev: &FrameworkObjectProperty,
    ) -> Result<()> {
        let Self {
            records,
            source,
            target,
            ..
        } = self;
        let record = records.get_mut(&id).ok_or(EditorError::RecordNotFound(id))?;
        let listing = match side {
            Side::Source => source,
            Side::Target => target,
        };
        let property = record.object_mut(side);
        if prev.is_cached() {
            property.cache_value(
                listing,
                prev.object_id(),
                prev.object_text(),
                Some(prev.framework()),
                Some(prev.version()),
            );
        } else {
            property.set_value(
                listing,
                prev.object_id(),
                prev.object_text(),
                Some(prev.framework()),
                Some(prev.version()),
            );
        }
        Ok(())
    }

    /// Select a list option, rejecting values the catalog does not offer
    pub fn set_list_item(&mut self, id: RecordId, field: ListField, value: Option<&str>) -> Result<()> {
        let catalog = self.catalogs.get(field);
        let record = self.records.get_mut(&id).ok_or(EditorError::RecordNotFound(id))?;
        record.list_item_mut(field).set_value(catalog, value)
    }

    /// Store a list value without validation (caching unknown options)
    pub fn force_list_item(&mut self, id: RecordId, field: ListField, value: Option<&str>) -> Result<()> {
        let catalog = self.catalogs.get(field);
        let record = self.records.get_mut(&id).ok_or(EditorError::RecordNotFound(id))?;
        record.list_item_mut(field).force_set_value(catalog, value);
        Ok(())
    }

    pub fn restore_list_item(&mut self, id: RecordId, field: ListField, prev: &ListItemProperty) -> Result<()> {
        self.force_list_item(id, field, prev.value())
    }

    /// Replace a text property, returning the previous value
    pub fn set_text(&mut self, id: RecordId, field: StringField, value: Option<String>) -> Result<Option<String>> {
        Ok(self.record_mut(id)?.text_mut(field).set(value))
    }

    /// Replace a record's references, returning the previous list
    pub fn set_references(&mut self, id: RecordId, references: Vec<String>) -> Result<Vec<String>> {
        Ok(std::mem::replace(&mut self.record_mut(id)?.references, references))
    }

    // === Validity ===

    /// Whether the record agrees with this collection's frameworks and
    /// catalogs
    pub fn is_valid(&self, id: RecordId) -> Result<bool> {
        let record = self.record(id)?;
        Ok(self.record_is_valid(record))
    }

    fn record_is_valid(&self, record: &Record) -> bool {
        record.collection() == Some(self.key)
            && self.source.matches(record.source.framework(), record.source.version())
            && self.target.matches(record.target.framework(), record.target.version())
            && !record.has_cached_values()
    }

    pub fn invalid_records(&self) -> Vec<RecordId> {
        self.records
            .values()
            .filter(|r| !self.record_is_valid(r))
            .map(|r| r.id())
            .collect()
    }

    /// Retry every cached value, returning how many records became valid
    pub fn revalidate(&mut self) -> usize {
        let before = self.invalid_records();
        let Self {
            records,
            source,
            target,
            catalogs,
            ..
        } = self;
        for id in &before {
            if let Some(record) = records.get_mut(id) {
                record.source.try_uncache(source);
                record.target.try_uncache(target);
                for field in LIST_FIELDS {
                    record.list_item_mut(field).try_uncache(catalogs.get(field));
                }
            }
        }
        let repaired = before.len() - self.invalid_records().len();
        tracing::info!(repaired, remaining = before.len() - repaired, "revalidated records");
        repaired
    }

    /// Swap one side's listing (e.g. a framework version upgrade)
    ///
    /// Records bound to the old listing's framework/version move to the new
    /// one; values the new listing rejects stay cached. Records already
    /// labelled with some other framework keep their label and are only
    /// retried. Returns the previous listing.
    pub fn replace_listing(&mut self, side: Side, listing: Listing) -> Listing {
        let Self {
            records,
            source,
            target,
            template,
            ..
        } = self;
        let slot = match side {
            Side::Source => source,
            Side::Target => target,
        };
        for record in records.values_mut() {
            record.object_mut(side).cache(slot);
        }
        let previous = std::mem::replace(slot, listing);
        let (framework, version) = (slot.framework().to_string(), slot.version().to_string());
        let (mut migrated, mut cached) = (0, 0);
        for record in records.values_mut() {
            let property = record.object_mut(side);
            let bound = if previous.matches(property.framework(), property.version()) {
                migrated += 1;
                let (object_id, text) = (
                    property.object_id().map(str::to_owned),
                    property.object_text().map(str::to_owned),
                );
                property.set_value(
                    slot,
                    object_id.as_deref(),
                    text.as_deref(),
                    Some(&framework),
                    Some(&version),
                )
            } else {
                property.try_uncache(slot)
            };
            if !bound {
                cached += 1;
            }
        }
        *template.object_mut(side) = FrameworkObjectProperty::detached(None, None, &framework, &version);
        tracing::info!(%side, %framework, %version, migrated, cached, "replaced listing");
        previous
    }

    // === Domains ===

    /// Every value a field can take, as `(id, display name)` in catalog
    /// order (first-seen order for text fields)
    pub fn field_domain(&self, field: RecordField) -> Vec<(String, String)> {
        match field.kind() {
            FieldKind::Object(side) => self
                .listing(side)
                .entries()
                .map(|(id, text)| (id.to_string(), object_name(id, text)))
                .collect(),
            FieldKind::List(list) => self
                .catalog(list)
                .options()
                .map(|o| (o.id.clone(), o.text.clone()))
                .collect(),
            FieldKind::Text(_) => {
                let mut seen = IndexMap::new();
                for record in self.records.values() {
                    if let Some(value) = record.hash_value(field) {
                        seen.entry(value.to_string())
                            .or_insert_with(|| value.to_string());
                    }
                }
                seen.into_iter().collect()
            }
        }
    }

    /// Display name of a field value
    pub fn value_name(&self, field: RecordField, value: &str) -> String {
        match field.kind() {
            FieldKind::Object(side) => match self.listing(side).text(value) {
                Some(text) => object_name(value, text),
                None => value.to_string(),
            },
            FieldKind::List(list) => self
                .catalog(list)
                .get(value)
                .map_or_else(|| value.to_string(), |o| o.text.clone()),
            FieldKind::Text(_) => value.to_string(),
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

fn object_name(id: &str, text: &str) -> String {
    if text.is_empty() {
        id.to_string()
    } else {
        format!("{id}: {text}")
    }
}
