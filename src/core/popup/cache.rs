//=========================================================================
// Instance Cache
//=========================================================================
//
// Keyed storage of live popup instances plus the path → name index.
//
// Architecture:
//   InstanceCache
//     ├─ entries: HashMap<PopupName, PopupEntry>
//     └─ paths: PathIndex (HashMap<path, PopupName>, first writer wins)
//
// A cached name is never silently replaced: put() on an occupied name
// warns and keeps the existing instance.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{Popup, PopupName};
use crate::core::host::PopupTemplate;

//=== Origin ==============================================================

/// Where a cached instance came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Instantiated from a template handed in by the caller.
    Template,

    /// Instantiated from a template loaded by path.
    Path(String),
}

//=== PopupEntry ==========================================================

/// A cached instance and the manager's bookkeeping about it.
pub struct PopupEntry {
    pub popup: Box<dyn Popup>,
    pub origin: Origin,

    /// Priority from the most recent show (0 until first shown).
    pub priority: i32,

    /// Whether `Popup::init` has run for this instance.
    pub initialized: bool,
}

impl PopupEntry {
    pub fn new(popup: Box<dyn Popup>, origin: Origin) -> Self {
        Self {
            popup,
            origin,
            priority: 0,
            initialized: false,
        }
    }
}

//=== NameResolution ======================================================

/// Result of resolving a request to a popup name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Resolved(PopupName),

    /// The name becomes known only after loading the requested path.
    Unresolved,
}

//=== PathIndex ===========================================================

/// Load path → resolved name, recorded the first time a path loads.
#[derive(Debug, Default)]
pub struct PathIndex {
    names: HashMap<String, PopupName>,
}

impl PathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.names.get(path).map(String::as_str)
    }

    /// Records the name a path resolved to. Later calls for the same path
    /// are ignored; returns whether this call recorded anything.
    pub fn remember(&mut self, path: &str, name: &str) -> bool {
        if self.names.contains_key(path) {
            return false;
        }
        debug!(target: "popup", "Path '{}' resolves to '{}'", path, name);
        self.names.insert(path.to_string(), name.to_string());
        true
    }
}

//=== InstanceCache =======================================================

/// Name-keyed store of live popup instances.
#[derive(Default)]
pub struct InstanceCache {
    entries: HashMap<PopupName, PopupEntry>,
    paths: PathIndex,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Name Resolution --------------------------------------------------

    /// Resolves a request to a name.
    ///
    /// Precedence: explicit name, then the template's declared name, then
    /// the path index.
    pub fn resolve_name(
        &self,
        explicit: Option<&str>,
        template: Option<&dyn PopupTemplate>,
        path: Option<&str>,
    ) -> NameResolution {
        if let Some(name) = explicit {
            return NameResolution::Resolved(name.to_string());
        }
        if let Some(template) = template {
            return NameResolution::Resolved(template.declared_name().to_string());
        }
        match path.and_then(|p| self.paths.lookup(p)) {
            Some(name) => NameResolution::Resolved(name.to_string()),
            None => NameResolution::Unresolved,
        }
    }

    pub fn paths(&self) -> &PathIndex {
        &self.paths
    }

    pub fn remember(&mut self, path: &str, name: &str) -> bool {
        self.paths.remember(path, name)
    }

    //--- Entries ----------------------------------------------------------

    pub fn get(&self, name: &str) -> Option<&PopupEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PopupEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Caches `entry` under `name`. Returns false (keeping the existing
    /// instance) if the name is taken.
    pub fn put(&mut self, name: &str, entry: PopupEntry) -> bool {
        if self.entries.contains_key(name) {
            warn!(target: "popup", "Popup '{}' is already cached, keeping existing instance", name);
            return false;
        }
        self.entries.insert(name.to_string(), entry);
        true
    }

    /// Removes and returns the entry for `name`.
    pub fn evict(&mut self, name: &str) -> Option<PopupEntry> {
        self.entries.remove(name)
    }

    /// Priority recorded for `name`, or 0 if it is not cached.
    pub fn priority(&self, name: &str) -> i32 {
        self.entries.get(name).map(|e| e.priority).unwrap_or(0)
    }

    /// Cached names in sorted order.
    pub fn names(&self) -> Vec<PopupName> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PopupName, &mut PopupEntry)> {
        self.entries.iter_mut()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::headless::HeadlessScene;
    use crate::core::popup::SimpleTemplate;

    fn entry(scene: &mut HeadlessScene, name: &str) -> PopupEntry {
        let popup = SimpleTemplate::new(name).instantiate(scene).unwrap();
        PopupEntry::new(popup, Origin::Template)
    }

    //--- Resolution Tests -------------------------------------------------

    #[test]
    fn explicit_name_wins() {
        let cache = InstanceCache::new();
        let template = SimpleTemplate::new("Declared");

        let resolved = cache.resolve_name(Some("explicit"), Some(&template as &dyn PopupTemplate), Some("ui/p"));
        assert_eq!(resolved, NameResolution::Resolved("explicit".into()));
    }

    #[test]
    fn template_name_beats_path_index() {
        let mut cache = InstanceCache::new();
        cache.remember("ui/p", "from_path");
        let template = SimpleTemplate::new("Declared");

        let resolved = cache.resolve_name(None, Some(&template as &dyn PopupTemplate), Some("ui/p"));
        assert_eq!(resolved, NameResolution::Resolved("Declared".into()));
    }

    #[test]
    fn path_index_is_last_resort() {
        let mut cache = InstanceCache::new();
        assert_eq!(cache.resolve_name(None, None, Some("ui/p")), NameResolution::Unresolved);

        cache.remember("ui/p", "from_path");
        assert_eq!(
            cache.resolve_name(None, None, Some("ui/p")),
            NameResolution::Resolved("from_path".into())
        );
        assert_eq!(cache.resolve_name(None, None, None), NameResolution::Unresolved);
    }

    #[test]
    fn path_index_first_writer_wins() {
        let mut index = PathIndex::new();
        assert!(index.remember("ui/p", "first"));
        assert!(!index.remember("ui/p", "second"));
        assert_eq!(index.lookup("ui/p"), Some("first"));
        assert_eq!(index.lookup("ui/other"), None);
    }

    //--- Entry Tests ------------------------------------------------------

    #[test]
    fn put_refuses_to_replace() {
        let mut scene = HeadlessScene::default();
        let mut cache = InstanceCache::new();
        let first = entry(&mut scene, "A");
        let first_node = first.popup.node();

        assert!(cache.put("A", first));
        assert!(!cache.put("A", entry(&mut scene, "A")));
        assert_eq!(cache.get("A").unwrap().popup.node(), first_node);
        assert_eq!(cache.names(), vec!["A".to_string()]);
    }

    #[test]
    fn evict_and_priority_lookup() {
        let mut scene = HeadlessScene::default();
        let mut cache = InstanceCache::new();
        cache.put("A", entry(&mut scene, "A"));
        cache.get_mut("A").unwrap().priority = 4;

        assert_eq!(cache.priority("A"), 4);
        assert_eq!(cache.priority("missing"), 0);
        assert!(cache.evict("A").is_some());
        assert!(cache.names().is_empty());
    }
}
