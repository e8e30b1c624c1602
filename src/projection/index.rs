//! Section index - the grouping tree behind the projected view
//!
//! Each level maps a [`SectionKey`] to a node holding the section's view
//! item, its child sections and (at the deepest level) its records. The
//! index is rebuilt on every pass; nodes from the previous pass are handed
//! down as `stale` so matching sections keep their view item, and with it
//! their collapse and selection state.

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::item::{ItemId, ItemKind, SectionKey, ViewItem, ViewItems};

/// One section and everything grouped under it
#[derive(Debug, Clone)]
pub struct SectionNode {
    pub section: ItemId,
    pub children: SectionIndex,
    /// Record items routed directly into this section
    pub records: Vec<ItemId>,
    /// Previous-pass children not yet claimed in this pass
    stale: SectionIndex,
}

/// One level of the grouping tree
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    nodes: IndexMap<SectionKey, SectionNode>,
}

impl SectionIndex {
    pub fn get(&self, key: &SectionKey) -> Option<&SectionNode> {
        self.nodes.get(key)
    }

    /// Descend one key per level
    pub fn find(&self, path: &[SectionKey]) -> Option<&SectionNode> {
        let (first, rest) = path.split_first()?;
        let node = self.nodes.get(first)?;
        if rest.is_empty() {
            Some(node)
        } else {
            node.children.find(rest)
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionKey, &SectionNode)> {
        self.nodes.iter()
    }

    /// Get or create the node for `key` at this level
    ///
    /// On a miss, a node with the same key is taken out of `stale` if one
    /// exists; `resolve` receives its section item (or `None`) and returns
    /// the item to use. The reused node's old children become the new
    /// node's stale set, so reuse continues one level down.
    pub(crate) fn claim(
        &mut self,
        stale: &mut SectionIndex,
        key: &SectionKey,
        resolve: impl FnOnce(Option<ItemId>) -> ItemId,
    ) -> &mut SectionNode {
        if let Some(i) = self.nodes.get_index_of(key) {
            return &mut self.nodes[i];
        }
        let (reused, previous) = match stale.nodes.shift_remove(key) {
            Some(old) => {
                // A collapsed section kept its unclaimed children aside
                let mut previous = old.children;
                for (key, node) in old.stale.nodes {
                    previous.nodes.entry(key).or_insert(node);
                }
                (Some(old.section), previous)
            }
            None => (None, SectionIndex::default()),
        };
        let node = SectionNode {
            section: resolve(reused),
            children: SectionIndex::default(),
            records: Vec::new(),
            stale: previous,
        };
        let (i, _) = self.nodes.insert_full(key.clone(), node);
        &mut self.nodes[i]
    }

    /// Walk `path` from this level down, creating or reusing one section
    /// per key
    ///
    /// Reused sections get their name refreshed; every section on the path
    /// gets its level set. Returns the deepest node, or `None` when a
    /// section on the path is collapsed (the walk stops there).
    pub(crate) fn route<'a>(
        &'a mut self,
        stale: &'a mut SectionIndex,
        items: &mut ViewItems,
        path: &[SectionKey],
        name: &dyn Fn(&SectionKey) -> String,
    ) -> Option<&'a mut SectionNode> {
        let mut level = self;
        let mut stale = stale;
        for (depth, key) in path.iter().enumerate() {
            let node = level.claim(stale, key, |reused| match reused {
                Some(section) if items.contains(section) => {
                    if let ItemKind::Section { name: current, .. } = &mut items[section].kind {
                        *current = name(key);
                    }
                    section
                }
                _ => items.insert(ViewItem::section(key.clone(), name(key))),
            });
            let view = &mut items[node.section];
            view.level = depth + 1;
            if view.collapsed {
                return None;
            }
            if depth + 1 == path.len() {
                return Some(node);
            }
            level = &mut node.children;
            stale = &mut node.stale;
        }
        None
    }

    /// Sort every level with `cmp`, recursively
    pub(crate) fn sort_with<F>(&mut self, cmp: &F)
    where
        F: Fn(&SectionKey, ItemId, &SectionKey, ItemId) -> Ordering,
    {
        self.nodes
            .sort_by(|ka, a, kb, b| cmp(ka, a.section, kb, b.section));
        for node in self.nodes.values_mut() {
            node.children.sort_with(cmp);
        }
    }

    /// Pre-order traversal: section, its records, then its subsections
    pub fn flatten(&self, out: &mut Vec<ItemId>) {
        for node in self.nodes.values() {
            out.push(node.section);
            out.extend_from_slice(&node.records);
            node.children.flatten(out);
        }
    }

    /// Every section item in this tree
    pub fn sections(&self, out: &mut Vec<ItemId>) {
        for node in self.nodes.values() {
            out.push(node.section);
            node.children.sections(out);
            node.stale.sections(out);
        }
    }

    /// Take every unclaimed previous-pass section out of the tree
    ///
    /// Nodes for which `keep` holds (collapsed sections) retain their
    /// unclaimed children so they can be reused once expanded.
    pub(crate) fn drain_stale(&mut self, out: &mut Vec<ItemId>, keep: &dyn Fn(ItemId) -> bool) {
        for node in self.nodes.values_mut() {
            if keep(node.section) {
                continue;
            }
            std::mem::take(&mut node.stale).sections(out);
            node.children.drain_stale(out, keep);
        }
    }
}
