//! Record field identifiers
//!
//! A [`RecordField`] names any property that can be used as a breakout key
//! or filtered on. The narrower enums ([`Side`], [`ListField`],
//! [`StringField`]) are used by commands that only make sense for one kind
//! of property.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Which end of a mapping a framework object property describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

/// Properties whose value is chosen from a [`ListCatalog`](super::ListCatalog)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListField {
    CapabilityGroup,
    MappingType,
    MappingStatus,
    ScoreCategory,
    ScoreValue,
}

/// Free text properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StringField {
    Author,
    AuthorContact,
    AuthorOrganization,
    Comments,
}

/// Every property a record can be grouped or filtered by
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    SourceObject,
    TargetObject,
    CapabilityGroup,
    MappingType,
    MappingStatus,
    ScoreCategory,
    ScoreValue,
    Author,
    AuthorOrganization,
}

/// The property kind behind a [`RecordField`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Object(Side),
    List(ListField),
    Text(StringField),
}

impl RecordField {
    pub fn kind(self) -> FieldKind {
        match self {
            RecordField::SourceObject => FieldKind::Object(Side::Source),
            RecordField::TargetObject => FieldKind::Object(Side::Target),
            RecordField::CapabilityGroup => FieldKind::List(ListField::CapabilityGroup),
            RecordField::MappingType => FieldKind::List(ListField::MappingType),
            RecordField::MappingStatus => FieldKind::List(ListField::MappingStatus),
            RecordField::ScoreCategory => FieldKind::List(ListField::ScoreCategory),
            RecordField::ScoreValue => FieldKind::List(ListField::ScoreValue),
            RecordField::Author => FieldKind::Text(StringField::Author),
            RecordField::AuthorOrganization => FieldKind::Text(StringField::AuthorOrganization),
        }
    }

    /// Parse a snake_case field name
    pub fn parse(name: &str) -> crate::Result<Self> {
        name.parse()
            .map_err(|_| crate::EditorError::UnknownField(name.to_string()))
    }
}

impl From<Side> for RecordField {
    fn from(side: Side) -> Self {
        match side {
            Side::Source => RecordField::SourceObject,
            Side::Target => RecordField::TargetObject,
        }
    }
}

impl From<ListField> for RecordField {
    fn from(field: ListField) -> Self {
        match field {
            ListField::CapabilityGroup => RecordField::CapabilityGroup,
            ListField::MappingType => RecordField::MappingType,
            ListField::MappingStatus => RecordField::MappingStatus,
            ListField::ScoreCategory => RecordField::ScoreCategory,
            ListField::ScoreValue => RecordField::ScoreValue,
        }
    }
}

impl StringField {
    /// The breakout field for this text property, if it can be grouped by
    pub fn record_field(self) -> Option<RecordField> {
        match self {
            StringField::Author => Some(RecordField::Author),
            StringField::AuthorOrganization => Some(RecordField::AuthorOrganization),
            StringField::AuthorContact | StringField::Comments => None,
        }
    }
}
