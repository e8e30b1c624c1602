//! Record property values
//!
//! Properties bound to a catalog can be *cached*: detached from the catalog
//! and held verbatim until they can be re-validated. A cached property still
//! reports the value it holds, it is only flagged as not matching its
//! catalog. Imported data that disagrees with the loaded framework takes
//! this path instead of failing.

use super::listing::{ListCatalog, Listing};
use crate::{EditorError, Result};

// ============================================================================
// String properties
// ============================================================================

/// Nullable free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringProperty {
    value: Option<String>,
}

impl StringProperty {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set(&mut self, value: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.value, value)
    }

    /// Section hash: empty text groups with "no value"
    pub fn hash_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

// ============================================================================
// List item properties
// ============================================================================

/// Reference by id into a [`ListCatalog`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItemProperty {
    value: Option<String>,
    cached: bool,
}

impl ListItemProperty {
    /// The selected option id (or the raw cached value)
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Select an option, rejecting ids the catalog does not offer
    pub fn set_value(&mut self, catalog: &ListCatalog, value: Option<&str>) -> Result<()> {
        if let Some(id) = value {
            if !catalog.contains(id) {
                return Err(EditorError::NotAnOption {
                    field: catalog.name.clone(),
                    value: id.to_string(),
                });
            }
        }
        self.value = value.map(str::to_owned);
        self.cached = false;
        Ok(())
    }

    /// Store `value` without validation, caching it if the catalog lacks it
    pub fn force_set_value(&mut self, catalog: &ListCatalog, value: Option<&str>) {
        self.value = value.map(str::to_owned);
        self.cached = value.is_some_and(|id| !catalog.contains(id));
    }

    /// Re-check a cached value against the catalog
    pub fn try_uncache(&mut self, catalog: &ListCatalog) -> bool {
        if self.cached && self.value.as_deref().is_some_and(|id| catalog.contains(id)) {
            self.cached = false;
        }
        !self.cached
    }

    /// Display text of the selected option
    pub fn text<'a>(&'a self, catalog: &'a ListCatalog) -> Option<&'a str> {
        let id = self.value.as_deref()?;
        if self.cached {
            return Some(id);
        }
        catalog.get(id).map(|o| o.text.as_str())
    }

    /// Value written to the flat export shape
    pub fn export_value(&self, catalog: &ListCatalog) -> Option<String> {
        let id = self.value.as_deref()?;
        if self.cached {
            return Some(id.to_string());
        }
        catalog.get(id).map(|o| o.export.clone())
    }

    /// Section hash: cached values group with "no value"
    pub fn hash_value(&self) -> Option<&str> {
        if self.cached {
            None
        } else {
            self.value.as_deref()
        }
    }
}

// ============================================================================
// Framework object properties
// ============================================================================

/// A framework object (technique, control, ...) referenced by id
///
/// When attached, the framework and version are those of the bound listing
/// and the id holds one reference in it (dynamic listings only). When
/// cached, all four values are held verbatim and no reference is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkObjectProperty {
    object_id: Option<String>,
    object_text: Option<String>,
    framework: String,
    version: String,
    cached: bool,
}

impl FrameworkObjectProperty {
    /// A value not yet bound to any listing
    pub fn detached(
        object_id: Option<String>,
        object_text: Option<String>,
        framework: &str,
        version: &str,
    ) -> Self {
        Self {
            object_id,
            object_text,
            framework: framework.to_string(),
            version: version.to_string(),
            cached: true,
        }
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn object_text(&self) -> Option<&str> {
        self.object_text.as_deref()
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// The id currently holding a reference in the listing
    fn attached_id(&self) -> Option<&str> {
        if self.cached {
            None
        } else {
            self.object_id.as_deref()
        }
    }

    /// Bind to `id` in `listing`
    ///
    /// `framework`/`version` default to the listing's. A `text` of `None`
    /// takes the listing's text for registered ids and stays `None` otherwise. Returns `false` (and
    /// caches the value) when the framework/version differs, when a strict
    /// listing lacks the id or text, or when a dynamic listing already holds
    /// the id with different text.
    pub fn set_value(
        &mut self,
        listing: &mut Listing,
        id: Option<&str>,
        text: Option<&str>,
        framework: Option<&str>,
        version: Option<&str>,
    ) -> bool {
        let framework = framework.unwrap_or(listing.framework()).to_string();
        let version = version.unwrap_or(listing.version()).to_string();
        if !listing.matches(&framework, &version) {
            self.cache_value(listing, id, text, Some(&framework), Some(&version));
            return false;
        }

        let Some(id) = id else {
            listing.switch_entry(None, self.attached_id());
            self.object_id = None;
            self.object_text = None;
            self.framework = framework;
            self.version = version;
            self.cached = false;
            return true;
        };

        if !listing.accepts(id, text) {
            self.cache_value(listing, Some(id), text, Some(&framework), Some(&version));
            return false;
        }

        let prev = self.attached_id().map(str::to_owned);
        listing.switch_entry(Some((id, text.unwrap_or_default())), prev.as_deref());
        self.object_id = Some(id.to_string());
        self.object_text = match text {
            Some(text) => Some(text.to_string()),
            None => listing
                .text(id)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
        };
        self.framework = framework;
        self.version = version;
        self.cached = false;
        true
    }

    /// Detach from `listing` and hold the given value out-of-band
    ///
    /// `framework`/`version` default to the current ones.
    pub fn cache_value(
        &mut self,
        listing: &mut Listing,
        id: Option<&str>,
        text: Option<&str>,
        framework: Option<&str>,
        version: Option<&str>,
    ) {
        listing.switch_entry(None, self.attached_id());
        if let Some(framework) = framework {
            self.framework = framework.to_string();
        }
        if let Some(version) = version {
            self.version = version.to_string();
        }
        self.object_id = id.map(str::to_owned);
        self.object_text = text.map(str::to_owned);
        self.cached = true;
    }

    /// Detach from `listing`, keeping the current value
    pub fn cache(&mut self, listing: &mut Listing) {
        if !self.cached {
            let id = self.object_id.clone();
            let text = self.object_text.clone();
            self.cache_value(listing, id.as_deref(), text.as_deref(), None, None);
        }
    }

    /// Retry binding the cached value (e.g. after a new listing loads)
    pub fn try_uncache(&mut self, listing: &mut Listing) -> bool {
        if !self.cached {
            return true;
        }
        let Self {
            object_id,
            object_text,
            framework,
            version,
            ..
        } = self.clone();
        self.set_value(
            listing,
            object_id.as_deref(),
            object_text.as_deref(),
            Some(&framework),
            Some(&version),
        )
    }

    /// Section hash: cached values group with "no value"
    pub fn hash_value(&self) -> Option<&str> {
        self.attached_id()
    }
}

// ============================================================================
// Uniform access
// ============================================================================

/// Borrowed view of any record property
#[derive(Debug, Clone, Copy)]
pub enum PropertyRef<'a> {
    String(&'a StringProperty),
    ListItem(&'a ListItemProperty),
    FrameworkObject(&'a FrameworkObjectProperty),
}

impl<'a> PropertyRef<'a> {
    /// Value used to route a record into a section
    pub fn hash_value(&self) -> Option<&'a str> {
        match self {
            PropertyRef::String(p) => p.hash_value(),
            PropertyRef::ListItem(p) => p.hash_value(),
            PropertyRef::FrameworkObject(p) => p.hash_value(),
        }
    }

    pub fn is_cached(&self) -> bool {
        match self {
            PropertyRef::String(_) => false,
            PropertyRef::ListItem(p) => p.is_cached(),
            PropertyRef::FrameworkObject(p) => p.is_cached(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListOption;

    fn attack() -> Listing {
        Listing::strict("attack", "16", [("T1001", "Foo"), ("T1002", "Bar")])
    }

    fn empty_object() -> FrameworkObjectProperty {
        FrameworkObjectProperty::detached(None, None, "attack", "16")
    }

    #[test]
    fn test_strict_set_value_matching_text() {
        let mut listing = attack();
        let mut prop = empty_object();
        assert!(prop.set_value(&mut listing, Some("T1001"), Some("Foo"), None, None));
        assert!(!prop.is_cached());
        assert_eq!(prop.object_id(), Some("T1001"));
    }

    #[test]
    fn test_strict_set_value_wrong_text_caches() {
        let mut listing = attack();
        let mut prop = empty_object();
        assert!(!prop.set_value(&mut listing, Some("T1001"), Some("Bar"), None, None));
        assert!(prop.is_cached());
        assert_eq!(prop.object_id(), Some("T1001"));
        assert_eq!(prop.object_text(), Some("Bar"));
        assert_eq!(prop.hash_value(), None);
    }

    #[test]
    fn test_set_value_framework_mismatch_caches() {
        let mut listing = attack();
        let mut prop = empty_object();
        let ok = prop.set_value(&mut listing, Some("T1001"), Some("Foo"), Some("attack"), Some("15"));
        assert!(!ok);
        assert!(prop.is_cached());
        assert_eq!(prop.version(), "15");
    }

    #[test]
    fn test_set_value_without_text_uses_listing_text() {
        let mut listing = attack();
        let mut prop = empty_object();
        assert!(prop.set_value(&mut listing, Some("T1002"), None, None, None));
        assert_eq!(prop.object_text(), Some("Bar"));
    }

    #[test]
    fn test_dynamic_set_value_registers_and_counts() {
        let mut listing = Listing::dynamic("custom", "1");
        let mut a = FrameworkObjectProperty::detached(None, None, "custom", "1");
        let mut b = a.clone();
        assert!(a.set_value(&mut listing, Some("X"), Some("Ex"), None, None));
        assert!(b.set_value(&mut listing, Some("X"), Some("Ex"), None, None));
        assert_eq!(listing.references("X"), 2);

        assert!(!b.set_value(&mut listing, Some("X"), Some("Other"), None, None));
        assert!(b.is_cached());
        assert_eq!(listing.references("X"), 1);

        a.cache(&mut listing);
        assert!(!listing.contains("X"));

        assert!(a.try_uncache(&mut listing));
        assert_eq!(listing.references("X"), 1);
    }

    #[test]
    fn test_dynamic_id_without_text_keeps_no_text() {
        let mut listing = Listing::dynamic("nist", "rev5");
        let mut first = FrameworkObjectProperty::detached(None, None, "nist", "rev5");
        let mut second = first.clone();
        assert!(first.set_value(&mut listing, Some("AC-1"), None, None, None));
        assert_eq!(first.object_text(), None);

        assert!(second.set_value(&mut listing, Some("AC-1"), Some("Policy"), None, None));
        assert!(!second.is_cached());
        assert_eq!(second.object_text(), Some("Policy"));
        assert_eq!(first.object_text(), None);
        assert_eq!(listing.text("AC-1"), Some("Policy"));
    }

    #[test]
    fn test_rebinding_same_id_does_not_inflate_count() {
        let mut listing = Listing::dynamic("custom", "1");
        let mut prop = FrameworkObjectProperty::detached(None, None, "custom", "1");
        prop.set_value(&mut listing, Some("X"), Some("Ex"), None, None);
        prop.set_value(&mut listing, Some("X"), Some("Ex"), None, None);
        assert_eq!(listing.references("X"), 1);
        prop.set_value(&mut listing, None, None, None, None);
        assert!(listing.is_empty());
    }

    #[test]
    fn test_try_uncache_after_listing_upgrade() {
        let mut old = attack();
        let mut prop = empty_object();
        prop.set_value(&mut old, Some("T1001"), Some("Foo"), Some("attack"), Some("17"));
        assert!(prop.is_cached());

        let mut upgraded = Listing::strict("attack", "17", [("T1001", "Foo")]);
        assert!(prop.try_uncache(&mut upgraded));
        assert_eq!(prop.version(), "17");
    }

    #[test]
    fn test_list_item_set_value_rejects_non_member() {
        let catalog = ListCatalog::new("mapping_status", [ListOption::new("complete", "Complete")]);
        let mut prop = ListItemProperty::default();
        assert!(prop.set_value(&catalog, Some("complete")).is_ok());
        assert!(matches!(
            prop.set_value(&catalog, Some("done")),
            Err(EditorError::NotAnOption { .. })
        ));
        assert_eq!(prop.value(), Some("complete"));
    }

    #[test]
    fn test_list_item_force_set_caches_unknown() {
        let mut catalog = ListCatalog::new("mapping_status", [ListOption::new("complete", "Complete")]);
        let mut prop = ListItemProperty::default();
        prop.force_set_value(&catalog, Some("legacy"));
        assert!(prop.is_cached());
        assert_eq!(prop.export_value(&catalog), Some("legacy".to_string()));
        assert_eq!(prop.hash_value(), None);

        catalog.insert(ListOption::new("legacy", "Legacy"));
        assert!(prop.try_uncache(&catalog));
        assert_eq!(prop.text(&catalog), Some("Legacy"));
    }
}
