//! # Folder Expansion State
//!
//! Which folders are expanded in the tree view. The whole map is one JSON entry
//! (`{"<id>": true, ...}`) under a namespaced key, read once when the store is
//! opened and written back after every change.
//!
//! ## Backends
//!
//! The store is given an ordered list of [`StorageBackend`]s, typically
//! primary (data dir), secondary (cache dir) and a last-resort in-memory one.
//!
//! - **Load**: the first backend holding a parseable entry wins. Unreadable or
//!   corrupt entries are logged and skipped.
//! - **Flush**: backends are tried in order until one accepts the write. If all
//!   of them fail the change is kept in memory for the session and the failure is
//!   logged; nothing is returned as an error.

use crate::error::ShelfError;
use crate::store::backend::StorageBackend;
use std::collections::BTreeMap;

pub type FolderExpansionMap = BTreeMap<String, bool>;

/// Where the last flush landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Persisted { backend: String },
    MemoryOnly,
}

impl PersistStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistStatus::Persisted { .. })
    }
}

pub struct ExpansionStateStore {
    key: String,
    backends: Vec<Box<dyn StorageBackend>>,
    expanded: FolderExpansionMap,
    last_status: Option<PersistStatus>,
}

impl ExpansionStateStore {
    pub fn load(key: &str, backends: Vec<Box<dyn StorageBackend>>) -> Self {
        let mut expanded = FolderExpansionMap::new();
        for backend in &backends {
            match backend.read_entry(key) {
                Ok(Some(raw)) => match serde_json::from_str::<FolderExpansionMap>(&raw) {
                    Ok(map) => {
                        tracing::debug!(backend = backend.name(), entries = map.len(), "expansion state loaded");
                        expanded = map;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(backend = backend.name(), error = %e, "ignoring corrupt expansion state");
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "expansion state unreadable");
                }
            }
        }
        Self {
            key: key.to_string(),
            backends,
            expanded,
            last_status: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> PersistStatus {
        self.expanded.insert(id.to_string(), expanded);
        self.flush()
    }

    /// Flip a folder and return its new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let expanded = !self.is_expanded(id);
        self.set_expanded(id, expanded);
        expanded
    }

    pub fn expanded_ids(&self) -> Vec<String> {
        self.expanded
            .iter()
            .filter(|(_, expanded)| **expanded)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn snapshot(&self) -> FolderExpansionMap {
        self.expanded.clone()
    }

    /// Outcome of the most recent flush, `None` before the first change.
    pub fn last_status(&self) -> Option<&PersistStatus> {
        self.last_status.as_ref()
    }

    /// Write the map to the first backend that accepts it.
    pub fn flush(&mut self) -> PersistStatus {
        let status = self.persist();
        self.last_status = Some(status.clone());
        status
    }

    fn persist(&self) -> PersistStatus {
        let raw = match serde_json::to_string(&self.expanded) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "expansion state not serializable; keeping it in memory");
                return PersistStatus::MemoryOnly;
            }
        };

        for backend in &self.backends {
            match backend.write_entry(&self.key, &raw) {
                Ok(()) => {
                    return PersistStatus::Persisted {
                        backend: backend.name().to_string(),
                    }
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "expansion write failed; trying next backend");
                }
            }
        }

        let exhausted = ShelfError::BackendsExhausted(self.key.clone());
        tracing::warn!(error = %exhausted, "expansion state kept in memory for this session");
        PersistStatus::MemoryOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fs_backend::FsBackend;
    use crate::store::mem_backend::MemBackend;
    use std::rc::Rc;
    use tempfile::TempDir;

    const KEY: &str = "shelf.expansion";

    fn backends(list: &[&Rc<MemBackend>]) -> Vec<Box<dyn StorageBackend>> {
        list.iter()
            .map(|b| Box::new(Rc::clone(b)) as Box<dyn StorageBackend>)
            .collect()
    }

    #[test]
    fn missing_entry_means_everything_collapsed() {
        let primary = Rc::new(MemBackend::named("primary"));
        let store = ExpansionStateStore::load(KEY, backends(&[&primary]));
        assert!(!store.is_expanded("1"));
        assert!(store.expanded_ids().is_empty());
        assert_eq!(store.last_status(), None);
    }

    #[test]
    fn toggle_flushes_to_primary() {
        let primary = Rc::new(MemBackend::named("primary"));
        let secondary = Rc::new(MemBackend::named("secondary"));
        let mut store = ExpansionStateStore::load(KEY, backends(&[&primary, &secondary]));

        assert!(store.toggle("5"));
        assert_eq!(
            store.last_status(),
            Some(&PersistStatus::Persisted {
                backend: "primary".to_string()
            })
        );
        assert_eq!(primary.write_count(), 1);
        assert_eq!(secondary.write_count(), 0);

        assert!(!store.toggle("5"));
        assert_eq!(store.snapshot().get("5"), Some(&false));
    }

    #[test]
    fn write_falls_through_to_next_backend() {
        let primary = Rc::new(MemBackend::named("primary"));
        let fallback = Rc::new(MemBackend::named("fallback"));
        primary.set_simulate_write_error(true);
        let mut store = ExpansionStateStore::load(KEY, backends(&[&primary, &fallback]));

        let status = store.set_expanded("7", true);
        assert_eq!(
            status,
            PersistStatus::Persisted {
                backend: "fallback".to_string()
            }
        );
        assert!(fallback.read_entry(KEY).unwrap().unwrap().contains("\"7\":true"));
    }

    #[test]
    fn all_backends_failing_keeps_memory_state() {
        let primary = Rc::new(MemBackend::named("primary"));
        primary.set_simulate_write_error(true);
        let mut store = ExpansionStateStore::load(KEY, backends(&[&primary]));

        assert_eq!(store.set_expanded("7", true), PersistStatus::MemoryOnly);
        assert!(store.is_expanded("7"));
        assert_eq!(store.expanded_ids(), vec!["7"]);
    }

    #[test]
    fn load_skips_corrupt_and_unreadable_backends() {
        let unreadable = Rc::new(MemBackend::named("unreadable"));
        unreadable.set_simulate_read_error(true);
        let corrupt = Rc::new(MemBackend::named("corrupt"));
        corrupt.insert_raw(KEY, "{ nope");
        let good = Rc::new(MemBackend::named("good"));
        good.insert_raw(KEY, r#"{"3": true, "4": false}"#);

        let store = ExpansionStateStore::load(KEY, backends(&[&unreadable, &corrupt, &good]));
        assert!(store.is_expanded("3"));
        assert!(!store.is_expanded("4"));
    }

    #[test]
    fn first_parseable_entry_wins() {
        let primary = Rc::new(MemBackend::named("primary"));
        primary.insert_raw(KEY, r#"{"1": true}"#);
        let secondary = Rc::new(MemBackend::named("secondary"));
        secondary.insert_raw(KEY, r#"{"2": true}"#);

        let store = ExpansionStateStore::load(KEY, backends(&[&primary, &secondary]));
        assert_eq!(store.expanded_ids(), vec!["1"]);
    }

    #[test]
    fn survives_reopen_on_disk() {
        let dir = TempDir::new().unwrap();
        let open = || {
            ExpansionStateStore::load(
                KEY,
                vec![Box::new(FsBackend::new(dir.path().to_path_buf()).with_name("data"))
                    as Box<dyn StorageBackend>],
            )
        };

        let mut store = open();
        store.set_expanded("1", true);
        store.set_expanded("2", true);
        store.set_expanded("2", false);

        let reopened = open();
        assert_eq!(reopened.expanded_ids(), vec!["1"]);
        assert!(dir.path().join(format!("{}.json", KEY)).exists());
    }
}
