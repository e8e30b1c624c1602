//! Geometry of the projected view
//!
//! Offsets are logical units, not pixels. A single forward pass lays out
//! every linked item; sections stay open until an item at their level (or
//! shallower) starts, at which point their hang region is closed off.

use serde::{Deserialize, Serialize};

use super::item::{ItemId, ViewItems};

/// Row sizes used by the layout pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewMetrics {
    pub section_height: usize,
    pub record_height_expanded: usize,
    pub record_height_collapsed: usize,
    /// Gap below a record followed by another record
    pub record_padding: usize,
    /// Gap below a record followed by a section header
    pub section_break_padding: usize,
}

impl Default for ViewMetrics {
    fn default() -> Self {
        Self {
            section_height: 35,
            record_height_expanded: 240,
            record_height_collapsed: 45,
            record_padding: 6,
            section_break_padding: 18,
        }
    }
}

/// Lay out every linked item; returns the content height
///
/// O(n) in the number of linked items. Callers that change many records
/// should relink once and call this once.
pub fn recalculate_positions(items: &mut ViewItems, metrics: &ViewMetrics) -> usize {
    let order = items.order();
    let mut open: Vec<ItemId> = Vec::new();
    let mut offset = 0;
    let mut layer = 0;

    for (i, &id) in order.iter().enumerate() {
        layer += 1;
        if items[id].is_section() {
            let level = items[id].level;
            while let Some(&top) = open.last() {
                if items[top].level < level {
                    break;
                }
                items[top].base_offset = offset;
                open.pop();
            }
            let item = &mut items[id];
            item.layer = layer;
            item.head_offset = offset;
            item.height = metrics.section_height;
            item.padding = 0;
            offset += item.height;
            item.base_offset = offset;
            open.push(id);
        } else {
            let next_is_section = order
                .get(i + 1)
                .is_some_and(|&next| items[next].is_section());
            let item = &mut items[id];
            item.layer = layer;
            item.head_offset = offset;
            item.height = if item.collapsed {
                metrics.record_height_collapsed
            } else {
                metrics.record_height_expanded
            };
            item.padding = if next_is_section {
                metrics.section_break_padding
            } else {
                metrics.record_padding
            };
            item.base_offset = offset + item.height;
            offset = item.base_offset + item.padding;
        }
    }
    for top in open.drain(..) {
        items[top].base_offset = offset;
    }

    // Earlier (outer) items stack above later ones
    for &id in &order {
        items[id].layer = layer - items[id].layer;
    }

    tracing::trace!(items = order.len(), height = offset, "recalculated positions");
    offset
}

/// Items whose span intersects `[beg, end)`, in list order
///
/// Head offsets grow monotonically along the list, so the scan ends at the
/// first item starting at or past `end`.
pub fn items_visible_at(items: &ViewItems, beg: usize, end: usize) -> Vec<ItemId> {
    let mut visible = Vec::new();
    for (id, item) in items.iter() {
        if item.head_offset >= end {
            break;
        }
        if item.intersects(beg, end) {
            visible.push(id);
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordField, RecordId};
    use crate::projection::item::{SectionKey, ViewItem};

    fn section(items: &mut ViewItems, level: usize) -> ItemId {
        let mut item = ViewItem::section(SectionKey::new(RecordField::Author, None), String::new());
        item.level = level;
        items.insert(item)
    }

    fn record(items: &mut ViewItems, level: usize, collapsed: bool) -> ItemId {
        let mut item = ViewItem::record(RecordId::new());
        item.level = level;
        item.collapsed = collapsed;
        items.insert(item)
    }

    #[test]
    fn test_flat_records() {
        let metrics = ViewMetrics::default();
        let mut items = ViewItems::default();
        let a = record(&mut items, 1, false);
        let b = record(&mut items, 1, true);
        items.link(&[a, b]);

        let height = recalculate_positions(&mut items, &metrics);
        assert_eq!(items[a].head_offset, 0);
        assert_eq!(items[a].base_offset, 240);
        assert_eq!(items[b].head_offset, 246);
        assert_eq!(items[b].height, 45);
        assert_eq!(height, 246 + 45 + 6);
    }

    #[test]
    fn test_section_hang_region() {
        let metrics = ViewMetrics::default();
        let mut items = ViewItems::default();
        let s1 = section(&mut items, 1);
        let r1 = record(&mut items, 2, true);
        let s2 = section(&mut items, 1);
        let r2 = record(&mut items, 2, true);
        items.link(&[s1, r1, s2, r2]);

        let height = recalculate_positions(&mut items, &metrics);
        // s1 header, r1 with a section break gap
        assert_eq!(items[r1].head_offset, 35);
        assert_eq!(items[r1].padding, 18);
        assert_eq!(items[s1].base_offset, 35 + 45 + 18);
        assert_eq!(items[s2].head_offset, 98);
        assert_eq!(items[s2].base_offset, height);
    }

    #[test]
    fn test_nested_sections_close_at_level() {
        let metrics = ViewMetrics::default();
        let mut items = ViewItems::default();
        let outer = section(&mut items, 1);
        let inner_a = section(&mut items, 2);
        let r1 = record(&mut items, 3, true);
        let inner_b = section(&mut items, 2);
        let r2 = record(&mut items, 3, true);
        items.link(&[outer, inner_a, r1, inner_b, r2]);

        let height = recalculate_positions(&mut items, &metrics);
        assert_eq!(items[inner_a].base_offset, items[inner_b].head_offset);
        assert_eq!(items[outer].base_offset, height);
        assert_eq!(items[inner_b].base_offset, height);
    }

    #[test]
    fn test_layers_descend_along_the_list() {
        let metrics = ViewMetrics::default();
        let mut items = ViewItems::default();
        let s1 = section(&mut items, 1);
        let r1 = record(&mut items, 2, true);
        let s2 = section(&mut items, 1);
        items.link(&[s1, r1, s2]);
        recalculate_positions(&mut items, &metrics);
        assert!(items[s1].layer > items[r1].layer);
        assert!(items[r1].layer > items[s2].layer);
        assert_eq!(items[s2].layer, 0);
    }

    #[test]
    fn test_visible_at_includes_hanging_section() {
        let metrics = ViewMetrics::default();
        let mut items = ViewItems::default();
        let s1 = section(&mut items, 1);
        let records: Vec<_> = (0..10).map(|_| record(&mut items, 2, true)).collect();
        let mut order = vec![s1];
        order.extend(&records);
        items.link(&order);
        recalculate_positions(&mut items, &metrics);

        // records are 51 apart starting at 35
        let visible = items_visible_at(&items, 200, 300);
        assert_eq!(visible[0], s1);
        assert_eq!(&visible[1..], &records[3..6]);
    }

    #[test]
    fn test_visible_at_empty_window() {
        let mut items = ViewItems::default();
        let a = record(&mut items, 1, false);
        items.link(&[a]);
        recalculate_positions(&mut items, &ViewMetrics::default());
        assert!(items_visible_at(&items, 1000, 1100).is_empty());
    }
}
