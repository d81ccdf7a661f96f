use log::{info, warn};

use crate::{catalog::Catalog, error::LaunchError, providers::LaunchSpawner};

/// Resolve an app id against the current snapshot and hand its launch
/// target to the OS spawner. A missing id is recoverable: the entry may
/// have been removed by a rescan since the suggestion was shown, and the
/// caller should refresh its list.
pub fn launch(app_id: &str, catalog: &Catalog, spawner: &dyn LaunchSpawner) -> Result<(), LaunchError> {
    let snapshot = catalog.current();
    let Some(entry) = snapshot.get(app_id) else {
        warn!("launch requested for unknown app id '{app_id}'");
        return Err(LaunchError::EntryNotFound(app_id.to_string()));
    };

    info!("launching '{}' via {}", entry.name, entry.launch_target);
    spawner
        .spawn(&entry.launch_target, entry.source_kind)
        .map_err(|reason| LaunchError::SpawnFailed {
            target: entry.launch_target.clone(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::CatalogSnapshot,
        models::{ApplicationEntry, SourceKind},
    };
    use std::sync::Mutex;

    struct RecordingSpawner {
        launched: Mutex<Vec<(String, SourceKind)>>,
    }

    impl RecordingSpawner {
        fn new() -> Self {
            Self {
                launched: Mutex::new(Vec::new()),
            }
        }
    }

    impl LaunchSpawner for RecordingSpawner {
        fn spawn(&self, target: &str, kind: SourceKind) -> Result<(), String> {
            self.launched.lock().unwrap().push((target.into(), kind));
            Ok(())
        }
    }

    #[test]
    fn resolves_id_to_target_and_kind() {
        let catalog = Catalog::new();
        let mut entry = ApplicationEntry::new(
            "Editor".into(),
            "C:\\Apps\\editor.lnk".into(),
            "C:\\Apps\\editor.exe".into(),
            SourceKind::Shortcut,
        );
        entry.app_id = "C:\\Apps\\editor.lnk".into();
        catalog.swap(CatalogSnapshot::build(vec![entry], "fp".into()));

        let spawner = RecordingSpawner::new();
        launch("C:\\Apps\\editor.lnk", &catalog, &spawner).unwrap();

        let launched = spawner.launched.lock().unwrap();
        assert_eq!(
            launched.as_slice(),
            [("C:\\Apps\\editor.exe".to_string(), SourceKind::Shortcut)]
        );
    }

    #[test]
    fn unknown_id_is_a_recoverable_not_found() {
        let catalog = Catalog::new();
        let spawner = RecordingSpawner::new();

        let err = launch("gone", &catalog, &spawner).unwrap_err();
        assert!(matches!(err, LaunchError::EntryNotFound(id) if id == "gone"));
        assert!(spawner.launched.lock().unwrap().is_empty());
    }
}
