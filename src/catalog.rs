use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{error::CacheError, models::ApplicationEntry};

const CACHE_FILE: &str = "catalog.json";

/// Immutable, fully-built catalog state. Readers hold an `Arc` to one of
/// these; its contents never change after construction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub entries: HashMap<String, ApplicationEntry>,
    pub built_at: u64,
    pub config_fingerprint: String,
}

impl CatalogSnapshot {
    pub fn build(entries: Vec<ApplicationEntry>, config_fingerprint: String) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.app_id.clone(), entry))
            .collect();
        Self {
            entries,
            built_at: unix_now(),
            config_fingerprint,
        }
    }

    pub fn get(&self, app_id: &str) -> Option<&ApplicationEntry> {
        self.entries.get(app_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle over the current snapshot. Reads clone the `Arc` under a
/// brief lock on the pointer; the snapshot itself is never locked, so
/// queries running during a rebuild keep seeing the prior snapshot.
pub struct Catalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot::default())),
        }
    }

    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Publish a new snapshot in one step.
    pub fn swap(&self, snapshot: CatalogSnapshot) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// Serialize the current snapshot to the cache file.
    pub fn persist(&self) -> Result<(), CacheError> {
        let Some(path) = cache_path() else {
            warn!("could not determine cache directory, skipping persist");
            return Ok(());
        };
        self.persist_to(&path)
    }

    pub fn persist_to(&self, path: &PathBuf) -> Result<(), CacheError> {
        let snapshot = self.current();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string(snapshot.as_ref())?;
        fs::write(path, payload)?;
        debug!("persisted {} catalog entries to {path:?}", snapshot.len());
        Ok(())
    }
}

/// Load a previously persisted snapshot so the first queries are not empty
/// while the initial rescan runs. A missing or corrupt cache hydrates to
/// `None`; the scheduler treats that as "rescan now".
pub fn hydrate() -> Option<CatalogSnapshot> {
    hydrate_from(&cache_path()?)
}

pub fn hydrate_from(path: &PathBuf) -> Option<CatalogSnapshot> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<CatalogSnapshot>(&content) {
        Ok(snapshot) => {
            debug!("hydrated {} catalog entries from {path:?}", snapshot.len());
            Some(snapshot)
        }
        Err(err) => {
            warn!("catalog cache {path:?} is corrupt, treating as empty: {err}");
            None
        }
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn cache_path() -> Option<PathBuf> {
    Some(
        dirs::data_local_dir()?
            .join("kindling")
            .join("cache")
            .join(CACHE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationEntry, SourceKind};

    fn entry(name: &str, path: &str) -> ApplicationEntry {
        ApplicationEntry::new(name.into(), path.into(), path.into(), SourceKind::Executable)
    }

    #[test]
    fn swap_publishes_whole_snapshot() {
        let catalog = Catalog::new();
        assert!(catalog.current().is_empty());

        catalog.swap(CatalogSnapshot::build(
            vec![entry("Notepad", "C:\\Windows\\notepad.exe")],
            "fp".into(),
        ));

        let snapshot = catalog.current();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("C:\\Windows\\notepad.exe").is_some());
    }

    #[test]
    fn readers_keep_the_snapshot_they_took() {
        let catalog = Catalog::new();
        catalog.swap(CatalogSnapshot::build(
            vec![entry("Old", "C:\\old.exe")],
            "fp1".into(),
        ));

        let held = catalog.current();
        catalog.swap(CatalogSnapshot::build(
            vec![entry("New", "C:\\new.exe")],
            "fp2".into(),
        ));

        // The held reference still resolves against the pre-swap snapshot.
        assert!(held.get("C:\\old.exe").is_some());
        assert!(held.get("C:\\new.exe").is_none());
        assert!(catalog.current().get("C:\\new.exe").is_some());
    }

    #[test]
    fn persist_and_hydrate_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = Catalog::new();
        let mut aliased = entry("Example", "C:\\Apps\\Example.exe");
        aliased.alias = Some("exapp".into());
        catalog.swap(CatalogSnapshot::build(vec![aliased], "fp".into()));
        catalog.persist_to(&path).unwrap();

        let hydrated = hydrate_from(&path).unwrap();
        assert_eq!(hydrated.len(), 1);
        let restored = hydrated.get("C:\\Apps\\Example.exe").unwrap();
        assert_eq!(restored.alias.as_deref(), Some("exapp"));
        assert_eq!(hydrated.config_fingerprint, "fp");
    }

    #[test]
    fn corrupt_cache_hydrates_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{broken").unwrap();
        assert!(hydrate_from(&path).is_none());
    }

    #[test]
    fn missing_cache_hydrates_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(hydrate_from(&path).is_none());
    }
}
