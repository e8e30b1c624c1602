//! Mapping records
//!
//! A [`Record`] links one source framework object to one target framework
//! object, with typed descriptive properties. Records are minted detached
//! (every catalog-bound property cached) and become live when inserted into
//! a [`RecordCollection`](super::RecordCollection).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{FieldKind, ListField, RecordField, Side, StringField};
use super::property::{FrameworkObjectProperty, ListItemProperty, PropertyRef, StringProperty};

/// Immutable record identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime identity of a collection, used for record back-references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(pub Uuid);

impl CollectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One mapping entry
///
/// Catalog-bound properties are only writable through the owning
/// [`RecordCollection`](crate::model::RecordCollection), which keeps listing
/// reference counts in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    pub(crate) source: FrameworkObjectProperty,
    pub(crate) target: FrameworkObjectProperty,
    pub(crate) capability_group: ListItemProperty,
    pub(crate) mapping_type: ListItemProperty,
    pub(crate) mapping_status: ListItemProperty,
    pub(crate) score_category: ListItemProperty,
    pub(crate) score_value: ListItemProperty,
    pub author: StringProperty,
    pub author_contact: StringProperty,
    pub author_organization: StringProperty,
    pub comments: StringProperty,
    pub references: Vec<String>,
    collection: Option<CollectionId>,
}

impl Record {
    /// An empty, detached record bound to the given frameworks
    pub fn new(
        id: RecordId,
        source: (&str, &str),
        target: (&str, &str),
    ) -> Self {
        Self {
            id,
            source: FrameworkObjectProperty::detached(None, None, source.0, source.1),
            target: FrameworkObjectProperty::detached(None, None, target.0, target.1),
            capability_group: ListItemProperty::default(),
            mapping_type: ListItemProperty::default(),
            mapping_status: ListItemProperty::default(),
            score_category: ListItemProperty::default(),
            score_value: ListItemProperty::default(),
            author: StringProperty::default(),
            author_contact: StringProperty::default(),
            author_organization: StringProperty::default(),
            comments: StringProperty::default(),
            references: Vec::new(),
            collection: None,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The owning collection, if attached
    pub fn collection(&self) -> Option<CollectionId> {
        self.collection
    }

    pub fn is_attached(&self) -> bool {
        self.collection.is_some()
    }

    pub(crate) fn set_collection(&mut self, collection: Option<CollectionId>) {
        self.collection = collection;
    }

    /// Copy of this record under a fresh id, detached
    ///
    /// Framework objects come back cached; they hold no listing reference
    /// until the copy is inserted.
    pub fn duplicate(&self) -> Record {
        let mut record = self.clone();
        record.id = RecordId::new();
        record.collection = None;
        for side in [Side::Source, Side::Target] {
            let object = record.object(side);
            let detached = FrameworkObjectProperty::detached(
                object.object_id().map(str::to_owned),
                object.object_text().map(str::to_owned),
                object.framework(),
                object.version(),
            );
            *record.object_mut(side) = detached;
        }
        record
    }

    pub fn source(&self) -> &FrameworkObjectProperty {
        &self.source
    }

    pub fn target(&self) -> &FrameworkObjectProperty {
        &self.target
    }

    pub fn object(&self, side: Side) -> &FrameworkObjectProperty {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub(crate) fn object_mut(&mut self, side: Side) -> &mut FrameworkObjectProperty {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    pub fn list_item(&self, field: ListField) -> &ListItemProperty {
        match field {
            ListField::CapabilityGroup => &self.capability_group,
            ListField::MappingType => &self.mapping_type,
            ListField::MappingStatus => &self.mapping_status,
            ListField::ScoreCategory => &self.score_category,
            ListField::ScoreValue => &self.score_value,
        }
    }

    pub(crate) fn list_item_mut(&mut self, field: ListField) -> &mut ListItemProperty {
        match field {
            ListField::CapabilityGroup => &mut self.capability_group,
            ListField::MappingType => &mut self.mapping_type,
            ListField::MappingStatus => &mut self.mapping_status,
            ListField::ScoreCategory => &mut self.score_category,
            ListField::ScoreValue => &mut self.score_value,
        }
    }

    pub fn text(&self, field: StringField) -> &StringProperty {
        match field {
            StringField::Author => &self.author,
            StringField::AuthorContact => &self.author_contact,
            StringField::AuthorOrganization => &self.author_organization,
            StringField::Comments => &self.comments,
        }
    }

    pub fn text_mut(&mut self, field: StringField) -> &mut StringProperty {
        match field {
            StringField::Author => &mut self.author,
            StringField::AuthorContact => &mut self.author_contact,
            StringField::AuthorOrganization => &mut self.author_organization,
            StringField::Comments => &mut self.comments,
        }
    }

    pub fn property(&self, field: RecordField) -> PropertyRef<'_> {
        match field.kind() {
            FieldKind::Object(side) => PropertyRef::FrameworkObject(self.object(side)),
            FieldKind::List(list) => PropertyRef::ListItem(self.list_item(list)),
            FieldKind::Text(text) => PropertyRef::String(self.text(text)),
        }
    }

    /// The value this record routes under for `field`
    pub fn hash_value(&self, field: RecordField) -> Option<&str> {
        self.property(field).hash_value()
    }

    /// Whether any catalog-bound property is cached
    pub fn has_cached_values(&self) -> bool {
        self.source.is_cached()
            || self.target.is_cached()
            || [
                &self.capability_group,
                &self.mapping_type,
                &self.mapping_status,
                &self.score_category,
                &self.score_value,
            ]
            .iter()
            .any(|p| p.is_cached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_detached_and_cached() {
        let record = Record::new(RecordId::new(), ("nist", "rev5"), ("attack", "16"));
        assert!(!record.is_attached());
        assert!(record.source.is_cached());
        assert!(record.has_cached_values());
        assert_eq!(record.hash_value(RecordField::SourceObject), None);
    }

    #[test]
    fn test_duplicate_mints_new_id() {
        let mut record = Record::new(RecordId::new(), ("nist", "rev5"), ("attack", "16"));
        record.author.set(Some("Ada".to_string()));
        let copy = record.duplicate();
        assert_ne!(copy.id(), record.id());
        assert_eq!(copy.author.value(), Some("Ada"));
    }

    #[test]
    fn test_empty_author_hashes_as_no_value() {
        let mut record = Record::new(RecordId::new(), ("nist", "rev5"), ("attack", "16"));
        record.author.set(Some(String::new()));
        assert_eq!(record.hash_value(RecordField::Author), None);
        record.author.set(Some("Ada".to_string()));
        assert_eq!(record.hash_value(RecordField::Author), Some("Ada"));
    }
}
