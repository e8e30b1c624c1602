//! View projection - the grouped, virtualized view of one record collection
//!
//! [`ViewProjection::rebuild_breakouts`] turns the flat collection into a
//! section tree (one level per active breakout), flattens it into the linked
//! item list and lays it out. Item handles for records and sections survive
//! rebuilds, so collapse and selection state does too.

pub mod breakout;
pub mod camera;
pub mod filter;
pub mod geometry;
pub mod index;
pub mod item;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub use breakout::BreakoutControl;
pub use camera::Camera;
pub use filter::{FilterControl, FilterSet};
pub use geometry::{items_visible_at, ViewMetrics};
pub use index::{SectionIndex, SectionNode};
pub use item::{ItemId, ItemKind, SectionKey, ViewItem, ViewItems};

use crate::error::{EditorError, Result};
use crate::model::{RecordCollection, RecordId};

/// Display name of the "no value" bucket
pub const NO_VALUE: &str = "No Value";

/// Grouped view state of one editor
#[derive(Debug, Clone, Default)]
pub struct ViewProjection {
    items: ViewItems,
    index: SectionIndex,
    record_views: HashMap<RecordId, ItemId>,
    pub breakouts: BreakoutControl,
    pub filters: FilterSet,
    metrics: ViewMetrics,
    camera: Camera,
    content_height: usize,
    selection: Vec<ItemId>,
    last_selected: Option<ItemId>,
}

impl ViewProjection {
    pub fn new(metrics: ViewMetrics, view_height: usize) -> Self {
        Self {
            metrics,
            camera: Camera::new(view_height),
            ..Self::default()
        }
    }

    // === Accessors ===

    pub fn items(&self) -> &ViewItems {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&ViewItem> {
        self.items.get(id)
    }

    fn item(&self, id: ItemId) -> Result<&ViewItem> {
        self.items.get(id).ok_or(EditorError::ItemNotFound(id.0))
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut ViewItem> {
        self.items.get_mut(id).ok_or(EditorError::ItemNotFound(id.0))
    }

    /// First item of the linked list
    pub fn head(&self) -> Option<ItemId> {
        self.items.head()
    }

    /// Linked items in view order
    pub fn iter(&self) -> item::LinkedItems<'_> {
        self.items.iter()
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    pub fn metrics(&self) -> &ViewMetrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: ViewMetrics) {
        self.metrics = metrics;
        self.recalculate_positions();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn content_height(&self) -> usize {
        self.content_height
    }

    /// View item wrapping `record`, if the record is in the collection
    pub fn record_item(&self, record: RecordId) -> Option<ItemId> {
        self.record_views.get(&record).copied()
    }

    /// Whether `record` is currently linked into the view
    pub fn is_record_visible(&self, record: RecordId) -> bool {
        self.record_item(record)
            .is_some_and(|id| self.items.is_linked(id))
    }

    /// Records listed after `section` until the next item at its level or
    /// shallower
    pub fn section_records(&self, section: ItemId) -> Result<Vec<RecordId>> {
        let level = self.item(section)?.level;
        let mut records = Vec::new();
        let mut cursor = self.items.next(section);
        while let Some(id) = cursor {
            let item = &self.items[id];
            if item.is_section() && item.level <= level {
                break;
            }
            records.extend(item.record_id());
            cursor = self.items.next(id);
        }
        Ok(records)
    }

    // === Rebuild ===

    /// Rebuild the section tree and the linked list from `file`
    pub fn rebuild_breakouts(&mut self, file: &RecordCollection) {
        self.sync_record_views(file);

        let mut previous = std::mem::take(&mut self.index);
        let mut index = SectionIndex::default();
        let mut order = Vec::with_capacity(file.len());
        let fields: Vec<_> = self.breakouts.fields().collect();

        if let Some(&primary) = fields.first() {
            let name = |key: &SectionKey| section_name(file, key);

            // Every value of the primary field gets a section, used or not
            let domain = std::iter::once(None)
                .chain(file.field_domain(primary).into_iter().map(|(id, _)| Some(id)));
            for value in domain {
                if self.filters.is_visible(primary, value.as_deref()) {
                    let path = [SectionKey { field: primary, value }];
                    index.route(&mut previous, &mut self.items, &path, &name);
                }
            }

            let record_level = fields.len() + 1;
            for record in file.records() {
                let item = self.record_views[&record.id()];
                self.items[item].level = record_level;
                if !self.filters.accepts(record) {
                    continue;
                }
                let path: Vec<_> = fields
                    .iter()
                    .map(|&field| SectionKey::new(field, record.hash_value(field)))
                    .collect();
                if let Some(node) = index.route(&mut previous, &mut self.items, &path, &name) {
                    node.records.push(item);
                }
            }

            let items = &self.items;
            index.sort_with(&|ka: &SectionKey, a: ItemId, kb: &SectionKey, b: ItemId| {
                compare_sections(ka, items[a].name(), kb, items[b].name())
            });
            index.flatten(&mut order);
        } else {
            for record in file.records() {
                let item = self.record_views[&record.id()];
                self.items[item].level = 1;
                if self.filters.accepts(record) {
                    order.push(item);
                }
            }
        }

        // Sections not claimed this pass are gone
        let mut dropped = Vec::new();
        previous.sections(&mut dropped);
        let items = &self.items;
        index.drain_stale(&mut dropped, &|section| items[section].collapsed);
        for section in &dropped {
            self.items.remove(*section);
        }

        self.items.link(&order);
        self.index = index;
        self.rescan_selection();
        self.recalculate_positions();

        tracing::debug!(
            records = file.len(),
            linked = order.len(),
            dropped = dropped.len(),
            breakouts = fields.len(),
            "rebuilt breakouts"
        );
    }

    /// One record view per record, reusing existing ones by id
    fn sync_record_views(&mut self, file: &RecordCollection) {
        let mut live = HashMap::with_capacity(file.len());
        for id in file.ids() {
            let item = match self.record_views.remove(&id) {
                Some(item) => item,
                None => self.items.insert(ViewItem::record(id)),
            };
            live.insert(id, item);
        }
        for (_, orphan) in self.record_views.drain() {
            self.items.remove(orphan);
        }
        self.record_views = live;
    }

    /// Selection is whatever is selected and still linked
    fn rescan_selection(&mut self) {
        let linked: HashSet<ItemId> = self.items.iter().map(|(id, _)| id).collect();
        for (id, item) in self.items.all_mut() {
            if !linked.contains(&id) {
                item.selected = false;
            }
        }
        self.selection = self
            .items
            .iter()
            .filter(|(_, item)| item.selected)
            .map(|(id, _)| id)
            .collect();
        if self
            .last_selected
            .is_some_and(|last| !self.selection.contains(&last))
        {
            self.last_selected = None;
        }
    }

    // === Geometry ===

    /// Lay out the linked items and clamp the camera to the new height
    pub fn recalculate_positions(&mut self) {
        self.content_height = geometry::recalculate_positions(&mut self.items, &self.metrics);
        self.camera.clamp(self.content_height);
    }

    pub fn items_visible_at(&self, beg: usize, end: usize) -> Vec<ItemId> {
        items_visible_at(&self.items, beg, end)
    }

    /// Items intersecting the camera window
    pub fn visible_items(&self) -> Vec<ItemId> {
        let (beg, end) = self.camera.window();
        self.items_visible_at(beg, end)
    }

    // === Camera ===

    /// Band reserved at the top of the viewport for hanging section headers
    pub fn hanger_height(&self) -> usize {
        self.breakouts.len() * self.metrics.section_height
    }

    pub fn set_view_height(&mut self, view_height: usize) {
        self.camera.view_height = view_height;
        self.camera.clamp(self.content_height);
    }

    pub fn set_camera_position(&mut self, position: usize) {
        self.camera.set_position(position, self.content_height);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.camera.scroll_by(delta, self.content_height);
    }

    /// Scroll so `id` sits `position` units below the top of the viewport
    /// (below the hanger band when `from_hangers`)
    ///
    /// Unless `strict`, an item already fully inside the viewport leaves
    /// the camera alone. Returns whether the camera moved.
    pub fn move_to_view_item(
        &mut self,
        id: ItemId,
        position: usize,
        from_hangers: bool,
        strict: bool,
    ) -> Result<bool> {
        let (head, height) = {
            let item = self.item(id)?;
            (item.head_offset, item.height)
        };
        let hanger = if from_hangers { self.hanger_height() } else { 0 };
        if !strict && self.camera.shows(head, height, hanger) {
            return Ok(false);
        }
        let before = self.camera.position;
        let target = head.saturating_sub(position + hanger);
        self.camera.set_position(target, self.content_height);
        Ok(self.camera.position != before)
    }

    /// [`Self::move_to_view_item`] for a record's view item
    pub fn move_to_record(&mut self, record: RecordId, strict: bool) -> Result<bool> {
        let id = self
            .record_item(record)
            .ok_or(EditorError::RecordNotFound(record))?;
        self.move_to_view_item(id, 0, true, strict)
    }

    // === Collapse ===

    /// Flip an item's collapsed flag; returns the new state
    ///
    /// Collapsing a section changes membership, so callers must rebuild;
    /// collapsing a record only changes geometry.
    pub fn toggle_collapsed(&mut self, id: ItemId) -> Result<bool> {
        let item = self.item_mut(id)?;
        item.collapsed = !item.collapsed;
        Ok(item.collapsed)
    }

    pub fn set_collapsed(&mut self, id: ItemId, collapsed: bool) -> Result<()> {
        self.item_mut(id)?.collapsed = collapsed;
        Ok(())
    }

    /// Collapse or expand every record view (or only the selected ones)
    pub fn set_records_collapsed(&mut self, all: bool, collapsed: bool) {
        for (_, item) in self.items.all_mut() {
            if !item.is_section() && (all || item.selected) {
                item.collapsed = collapsed;
            }
        }
    }

    // === Selection ===

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn last_selected(&self) -> Option<ItemId> {
        self.last_selected
    }

    /// Select a linked item, optionally clearing the rest first
    pub fn select(&mut self, id: ItemId, exclusive: bool) -> Result<()> {
        self.item(id)?;
        if exclusive {
            self.unselect_all();
        }
        if !self.items[id].selected {
            self.items[id].selected = true;
            self.selection.push(id);
        }
        self.last_selected = Some(id);
        Ok(())
    }

    pub fn select_record(&mut self, record: RecordId, exclusive: bool) -> Result<()> {
        let id = self
            .record_item(record)
            .ok_or(EditorError::RecordNotFound(record))?;
        self.select(id, exclusive)
    }

    pub fn unselect(&mut self, id: ItemId) -> Result<()> {
        self.item_mut(id)?.selected = false;
        self.selection.retain(|&selected| selected != id);
        if self.last_selected == Some(id) {
            self.last_selected = None;
        }
        Ok(())
    }

    /// Select every linked item
    pub fn select_all(&mut self) {
        for id in self.items.order() {
            self.items[id].selected = true;
        }
        self.selection = self.items.order();
    }

    pub fn unselect_all(&mut self) {
        for id in self.selection.drain(..) {
            if let Some(item) = self.items.get_mut(id) {
                item.selected = false;
            }
        }
        self.last_selected = None;
    }

    /// Records behind the selected record items, in view order
    pub fn selected_records(&self) -> Vec<RecordId> {
        self.items
            .iter()
            .filter(|(_, item)| item.selected)
            .filter_map(|(_, item)| item.record_id())
            .collect()
    }
}

/// Display name of a section
fn section_name(file: &RecordCollection, key: &SectionKey) -> String {
    match &key.value {
        Some(value) => file.value_name(key.field, value),
        None => NO_VALUE.to_string(),
    }
}

/// "No value" first, then case-insensitive name, then raw name
fn compare_sections(
    ka: &SectionKey,
    a: Option<&str>,
    kb: &SectionKey,
    b: Option<&str>,
) -> Ordering {
    match (&ka.value, &kb.value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(_), Some(_)) => {
            let a = a.unwrap_or_default();
            let b = b.unwrap_or_default();
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        }
    }
}
