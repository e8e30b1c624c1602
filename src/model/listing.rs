//! Framework listings and list catalogs
//!
//! A [`Listing`] is the id→text catalog of one framework version. Strict
//! listings have a fixed, pre-registered membership (a framework the
//! registry knows). Dynamic listings create entries on demand and track a
//! live reference count per entry so unused entries disappear again.
//!
//! A [`ListCatalog`] is the fixed option set behind a list-item property
//! (mapping status, score value, ...). Catalogs are not reference counted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Framework listings
// ============================================================================

/// Membership model of a [`Listing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Fixed membership registered up front
    Strict,
    /// Entries created on first use and pruned at zero references
    Dynamic,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub text: String,
    /// Live references (always zero in strict listings)
    refs: usize,
}

impl ListingEntry {
    pub fn references(&self) -> usize {
        self.refs
    }
}

/// Id→text catalog bound to a framework id and version
#[derive(Debug, Clone)]
pub struct Listing {
    framework: String,
    version: String,
    kind: ListingKind,
    entries: IndexMap<String, ListingEntry>,
}

impl Listing {
    /// Create a strict listing with the given `(id, text)` entries
    pub fn strict<I, K, V>(framework: &str, version: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            framework: framework.to_string(),
            version: version.to_string(),
            kind: ListingKind::Strict,
            entries: entries
                .into_iter()
                .map(|(id, text)| {
                    (
                        id.into(),
                        ListingEntry {
                            text: text.into(),
                            refs: 0,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Create an empty dynamic listing
    pub fn dynamic(framework: &str, version: &str) -> Self {
        Self {
            framework: framework.to_string(),
            version: version.to_string(),
            kind: ListingKind::Dynamic,
            entries: IndexMap::new(),
        }
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == ListingKind::Dynamic
    }

    /// Whether a value qualified by `framework`/`version` belongs here
    pub fn matches(&self, framework: &str, version: &str) -> bool {
        self.framework == framework && self.version == version
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|e| e.text.as_str())
    }

    pub fn entry(&self, id: &str) -> Option<&ListingEntry> {
        self.entries.get(id)
    }

    /// Live reference count of `id` (zero if absent)
    pub fn references(&self, id: &str) -> usize {
        self.entries.get(id).map_or(0, |e| e.refs)
    }

    /// Iterate `(id, text)` pairs in registration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, e)| (id.as_str(), e.text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether binding `id` with `text` would succeed
    ///
    /// Strict listings accept only registered ids, with identical text when
    /// text is given. Dynamic listings also accept any unregistered id, and
    /// any text for an entry registered without one.
    pub fn accepts(&self, id: &str, text: Option<&str>) -> bool {
        match (self.entries.get(id), text) {
            (Some(_), None) => true,
            (Some(entry), Some(text)) => {
                entry.text == text || (self.is_dynamic() && entry.text.is_empty())
            }
            (None, _) => self.is_dynamic(),
        }
    }

    /// Move one reference from `prev` to `next`
    ///
    /// `next` is `(id, text)`. A new entry with blank text inherits `prev`'s
    /// text; an existing entry with blank text takes `next`'s. Switching to
    /// the id already held is a no-op, so re-binding an unchanged value never
    /// inflates the count. Strict listings ignore the call.
    pub fn switch_entry(&mut self, next: Option<(&str, &str)>, prev: Option<&str>) {
        if self.kind == ListingKind::Strict {
            return;
        }
        if next.map(|(id, _)| id) == prev {
            if let Some((id, text)) = next {
                self.fill_text(id, text);
            }
            return;
        }
        if let Some((id, text)) = next {
            if self.entries.contains_key(id) {
                self.fill_text(id, text);
            } else {
                let text = if text.is_empty() {
                    prev.and_then(|p| self.text(p)).unwrap_or_default().to_string()
                } else {
                    text.to_string()
                };
                self.entries
                    .insert(id.to_string(), ListingEntry { text, refs: 0 });
            }
            if let Some(entry) = self.entries.get_mut(id) {
                entry.refs += 1;
            }
        }
        if let Some(prev) = prev {
            self.release(prev);
        }
    }

    /// Give a blank entry its first real text
    fn fill_text(&mut self, id: &str, text: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.text.is_empty() && !text.is_empty() {
                entry.text = text.to_string();
            }
        }
    }

    /// Drop one reference from `id` and prune it if it reached zero
    fn release(&mut self, id: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.refs = entry.refs.saturating_sub(1);
        }
        self.prune(id);
    }

    /// Remove `id` if nothing references it any more
    fn prune(&mut self, id: &str) -> bool {
        if self.kind == ListingKind::Dynamic && self.references(id) == 0 {
            if self.entries.shift_remove(id).is_some() {
                tracing::trace!(framework = %self.framework, id, "pruned listing entry");
                return true;
            }
        }
        false
    }
}

// ============================================================================
// List catalogs
// ============================================================================

/// One option of a list-item property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    pub id: String,
    pub text: String,
    /// Value written to the flat export shape
    pub export: String,
}

impl ListOption {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            export: id.to_string(),
        }
    }
}

/// Ordered option set behind a list-item property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCatalog {
    /// Field name used in error messages
    pub name: String,
    options: IndexMap<String, ListOption>,
}

impl ListCatalog {
    pub fn new(name: &str, options: impl IntoIterator<Item = ListOption>) -> Self {
        Self {
            name: name.to_string(),
            options: options.into_iter().map(|o| (o.id.clone(), o)).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ListOption> {
        self.options.get(id)
    }

    /// Find an option by its export value, falling back to its id
    pub fn find_export(&self, export: &str) -> Option<&ListOption> {
        self.options
            .values()
            .find(|o| o.export == export)
            .or_else(|| self.options.get(export))
    }

    pub fn options(&self) -> impl Iterator<Item = &ListOption> {
        self.options.values()
    }

    pub fn insert(&mut self, option: ListOption) {
        self.options.insert(option.id.clone(), option);
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_listing_accepts_only_registered_text() {
        let listing = Listing::strict("attack", "16", [("T1001", "Foo")]);
        assert!(listing.accepts("T1001", Some("Foo")));
        assert!(listing.accepts("T1001", None));
        assert!(!listing.accepts("T1001", Some("Bar")));
        assert!(!listing.accepts("T1002", Some("Foo")));
    }

    #[test]
    fn test_strict_listing_ignores_switches() {
        let mut listing = Listing::strict("attack", "16", [("T1001", "Foo")]);
        listing.switch_entry(Some(("T1001", "Foo")), None);
        assert_eq!(listing.references("T1001"), 0);
        listing.switch_entry(None, Some("T1001"));
        assert!(listing.contains("T1001"));
    }

    #[test]
    fn test_dynamic_switch_creates_and_prunes() {
        let mut listing = Listing::dynamic("custom", "1");
        listing.switch_entry(Some(("A", "Alpha")), None);
        listing.switch_entry(Some(("A", "Alpha")), None);
        assert_eq!(listing.references("A"), 2);

        listing.switch_entry(Some(("B", "Beta")), Some("A"));
        assert_eq!(listing.references("A"), 1);
        assert_eq!(listing.references("B"), 1);

        listing.switch_entry(None, Some("A"));
        assert!(!listing.contains("A"));
        assert!(listing.contains("B"));
    }

    #[test]
    fn test_dynamic_switch_to_same_id_is_net_zero() {
        let mut listing = Listing::dynamic("custom", "1");
        listing.switch_entry(Some(("A", "Alpha")), None);
        listing.switch_entry(Some(("A", "Alpha")), Some("A"));
        assert_eq!(listing.references("A"), 1);
    }

    #[test]
    fn test_dynamic_switch_inherits_blank_text() {
        let mut listing = Listing::dynamic("custom", "1");
        listing.switch_entry(Some(("A", "Alpha")), None);
        listing.switch_entry(Some(("A2", "")), Some("A"));
        assert_eq!(listing.text("A2"), Some("Alpha"));
        assert!(!listing.contains("A"));
    }

    #[test]
    fn test_dynamic_blank_entry_takes_first_text() {
        let mut listing = Listing::dynamic("nist", "rev5");
        listing.switch_entry(Some(("AC-1", "")), None);
        assert_eq!(listing.text("AC-1"), Some(""));
        assert!(listing.accepts("AC-1", Some("Policy")));

        listing.switch_entry(Some(("AC-1", "Policy")), None);
        assert_eq!(listing.text("AC-1"), Some("Policy"));
        assert_eq!(listing.references("AC-1"), 2);
        assert!(!listing.accepts("AC-1", Some("Other")));
    }

    #[test]
    fn test_catalog_find_export() {
        let mut catalog = ListCatalog::new("mapping_status", [ListOption::new("complete", "Complete")]);
        catalog.insert(ListOption {
            id: "wip".to_string(),
            text: "In Progress".to_string(),
            export: "in_progress".to_string(),
        });
        assert_eq!(catalog.find_export("in_progress").map(|o| o.id.as_str()), Some("wip"));
        assert_eq!(catalog.find_export("wip").map(|o| o.id.as_str()), Some("wip"));
        assert!(catalog.find_export("done").is_none());
    }
}
