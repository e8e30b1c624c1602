//! View items - the rows of the projected view
//!
//! Items live in a slab so their handles stay stable across rebuilds; the
//! linear order is kept in a separate link table that is replaced wholesale
//! every time the projection is relinked.

use std::collections::HashMap;
use std::fmt;

use slab::Slab;

use crate::model::{RecordField, RecordId};

/// Stable handle of a view item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a section: the discriminator and the value it groups by
///
/// `value` is `None` for the "no value" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub field: RecordField,
    pub value: Option<String>,
}

impl SectionKey {
    pub fn new(field: RecordField, value: Option<&str>) -> Self {
        Self {
            field,
            value: value.map(str::to_owned),
        }
    }
}

/// What a view item stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A grouping node; never wraps a record
    Section { key: SectionKey, name: String },
    /// Exactly one record
    Record { record: RecordId },
}

/// One row of the projected view with its logical geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItem {
    pub kind: ItemKind,
    /// Offset of the item's top edge
    pub head_offset: usize,
    pub height: usize,
    /// Gap below the item
    pub padding: usize,
    /// Offset where the item's span ends (for sections, the end of the
    /// hang region below the last visible descendant)
    pub base_offset: usize,
    /// Indentation level; level 0 is reserved for the warning column
    pub level: usize,
    /// Stacking order for hovering section headers (higher draws above)
    pub layer: usize,
    pub collapsed: bool,
    pub selected: bool,
}

impl ViewItem {
    pub fn section(key: SectionKey, name: String) -> Self {
        Self::with_kind(ItemKind::Section { key, name })
    }

    pub fn record(record: RecordId) -> Self {
        Self::with_kind(ItemKind::Record { record })
    }

    fn with_kind(kind: ItemKind) -> Self {
        Self {
            kind,
            head_offset: 0,
            height: 0,
            padding: 0,
            base_offset: 0,
            level: 0,
            layer: 0,
            collapsed: false,
            selected: false,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, ItemKind::Section { .. })
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self.kind {
            ItemKind::Record { record } => Some(record),
            ItemKind::Section { .. } => None,
        }
    }

    pub fn section_key(&self) -> Option<&SectionKey> {
        match &self.kind {
            ItemKind::Section { key, .. } => Some(key),
            ItemKind::Record { .. } => None,
        }
    }

    /// Section display name
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Section { name, .. } => Some(name),
            ItemKind::Record { .. } => None,
        }
    }

    /// Whether the item's span intersects `[beg, end)`
    pub fn intersects(&self, beg: usize, end: usize) -> bool {
        self.head_offset < end && self.base_offset > beg
    }
}

/// Neighbours of a linked item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Link {
    prev: Option<ItemId>,
    next: Option<ItemId>,
}

/// Item arena plus the linear order of the linked items
#[derive(Debug, Clone, Default)]
pub struct ViewItems {
    items: Slab<ViewItem>,
    links: HashMap<ItemId, Link>,
    head: Option<ItemId>,
}

impl ViewItems {
    pub fn insert(&mut self, item: ViewItem) -> ItemId {
        ItemId(self.items.insert(item))
    }

    /// Drop an item from the arena (and from the order, if linked)
    pub fn remove(&mut self, id: ItemId) -> Option<ViewItem> {
        if let Some(link) = self.links.remove(&id) {
            if let Some(prev) = link.prev {
                if let Some(l) = self.links.get_mut(&prev) {
                    l.next = link.next;
                }
            }
            if let Some(next) = link.next {
                if let Some(l) = self.links.get_mut(&next) {
                    l.prev = link.prev;
                }
            }
            if self.head == Some(id) {
                self.head = link.next;
            }
        }
        self.items.try_remove(id.0)
    }

    pub fn get(&self, id: ItemId) -> Option<&ViewItem> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut ViewItem> {
        self.items.get_mut(id.0)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(id.0)
    }

    /// Replace the linear order
    ///
    /// Built from a sequence, so the list is always acyclic and each item
    /// appears at most once.
    pub fn link(&mut self, order: &[ItemId]) {
        self.links.clear();
        for (i, &id) in order.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| order[p]);
            let next = order.get(i + 1).copied();
            self.links.insert(id, Link { prev, next });
        }
        self.head = order.first().copied();
    }

    pub fn head(&self) -> Option<ItemId> {
        self.head
    }

    pub fn next(&self, id: ItemId) -> Option<ItemId> {
        self.links.get(&id).and_then(|l| l.next)
    }

    pub fn prev(&self, id: ItemId) -> Option<ItemId> {
        self.links.get(&id).and_then(|l| l.prev)
    }

    pub fn is_linked(&self, id: ItemId) -> bool {
        self.links.contains_key(&id)
    }

    /// Number of linked items
    pub fn linked_len(&self) -> usize {
        self.links.len()
    }

    /// Number of items in the arena (linked or not)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Linked items in order
    pub fn iter(&self) -> LinkedItems<'_> {
        LinkedItems {
            items: self,
            cursor: self.head,
        }
    }

    /// Linked item handles in order
    pub fn order(&self) -> Vec<ItemId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Every item in the arena, linked or not
    pub fn all_mut(&mut self) -> impl Iterator<Item = (ItemId, &mut ViewItem)> {
        self.items.iter_mut().map(|(k, item)| (ItemId(k), item))
    }
}

impl std::ops::Index<ItemId> for ViewItems {
    type Output = ViewItem;

    fn index(&self, id: ItemId) -> &ViewItem {
        &self.items[id.0]
    }
}

impl std::ops::IndexMut<ItemId> for ViewItems {
    fn index_mut(&mut self, id: ItemId) -> &mut ViewItem {
        &mut self.items[id.0]
    }
}

/// Iterator following the link table from the head
pub struct LinkedItems<'a> {
    items: &'a ViewItems,
    cursor: Option<ItemId>,
}

impl<'a> Iterator for LinkedItems<'a> {
    type Item = (ItemId, &'a ViewItem);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let item = self.items.get(id)?;
        self.cursor = self.items.next(id);
        Some((id, item))
    }
}
