use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::{
    alias::apply_aliases,
    catalog::{Catalog, CatalogSnapshot},
    config::AppConfig,
    icons::IconCache,
    providers::{IconSource, PackageEnumerator, ShortcutResolver},
    scanner::{scan_directories, scan_packages},
};

/// Decide whether the startup rescan runs. A hydrated cache serves queries
/// as-is when it was built recently enough under the same search paths;
/// an interval of 0 means "always rescan".
pub fn startup_scan_needed(snapshot: Option<&CatalogSnapshot>, config: &AppConfig, now: u64) -> bool {
    let Some(snapshot) = snapshot else {
        debug!("no hydrated catalog, rescan needed");
        return true;
    };
    if snapshot.config_fingerprint != config.fingerprint() {
        info!("search path configuration changed, rescan needed");
        return true;
    }
    if config.refresh_interval_minutes == 0 {
        return true;
    }
    let elapsed = now.saturating_sub(snapshot.built_at);
    elapsed >= config.refresh_interval_minutes.saturating_mul(60)
}

/// Source collaborators a rescan talks to.
pub struct ScanProviders {
    pub shortcuts: Arc<dyn ShortcutResolver>,
    pub packages: Arc<dyn PackageEnumerator>,
    pub icons: Arc<dyn IconSource>,
}

/// Runs full rescans on a background worker and publishes each result to
/// the catalog in a single swap. Rescans are serialized; requests arriving
/// while one is in flight coalesce into at most one follow-up run.
pub struct Refresher {
    catalog: Arc<Catalog>,
    config: Arc<Mutex<AppConfig>>,
    providers: ScanProviders,
    icon_cache: Mutex<IconCache>,
    cache_path: Option<PathBuf>,
}

/// Handle for requesting rescans from the interactive side.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Request a full rescan. If one is already queued behind an in-flight
    /// rebuild the request coalesces into it.
    pub fn request(&self) {
        if self.tx.try_send(()).is_err() {
            debug!("rescan already pending, coalescing request");
        }
    }
}

impl Refresher {
    pub fn new(
        catalog: Arc<Catalog>,
        config: Arc<Mutex<AppConfig>>,
        providers: ScanProviders,
    ) -> Self {
        Self {
            catalog,
            config,
            providers,
            icon_cache: Mutex::new(IconCache::new()),
            cache_path: None,
        }
    }

    #[cfg(test)]
    pub fn with_cache_path(mut self, path: PathBuf) -> Self {
        self.cache_path = Some(path);
        self
    }

    /// Spawn the background worker and return the request handle.
    ///
    /// The capacity-1 channel is the coalescing gate: one message can wait
    /// behind the rebuild the worker is executing, and further requests are
    /// dropped into that pending slot.
    pub fn spawn(self: Arc<Self>) -> RefreshHandle {
        let (tx, mut rx) = mpsc::channel(1);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                let refresher = Arc::clone(&self);
                let result = tokio::task::spawn_blocking(move || refresher.rebuild()).await;
                if let Err(err) = result {
                    warn!("rescan task failed: {err}");
                }
            }
        });
        RefreshHandle { tx }
    }

    /// One full rescan: scanners, alias overlay, icon resolution, then a
    /// single snapshot swap followed by cache persistence. Runs on the
    /// blocking pool; queries keep reading the prior snapshot throughout.
    fn rebuild(&self) {
        let config = self
            .config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        info!("rescan started");
        let dirs: Vec<&str> = config.directory_paths().collect();
        let mut entries = scan_directories(&dirs, config.scan_depth, self.providers.shortcuts.as_ref());
        if config.includes_packaged_apps() {
            entries.extend(scan_packages(self.providers.packages.as_ref()));
        }

        apply_aliases(&mut entries, &config.aliases);
        self.icon_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .resolve(&mut entries, self.providers.icons.as_ref());

        let count = entries.len();
        self.catalog
            .swap(CatalogSnapshot::build(entries, config.fingerprint()));
        info!("rescan complete, catalog now holds {count} entries");

        let persisted = match &self.cache_path {
            Some(path) => self.catalog.persist_to(path),
            None => self.catalog.persist(),
        };
        if let Err(err) = persisted {
            warn!("failed to persist catalog cache: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::unix_now,
        config::PACKAGED_APPS_SENTINEL,
        models::ApplicationEntry,
        models::SourceKind,
        providers::{NoIcons, PackagedApp, UnresolvedShortcuts},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc as std_mpsc,
    };
    use std::time::Duration;

    fn config_with(paths: Vec<String>, interval: u64) -> AppConfig {
        AppConfig {
            search_paths: paths,
            refresh_interval_minutes: interval,
            ..AppConfig::default()
        }
    }

    fn snapshot_with(fingerprint: String, built_at: u64) -> CatalogSnapshot {
        let mut snapshot = CatalogSnapshot::build(Vec::new(), fingerprint);
        snapshot.built_at = built_at;
        snapshot
    }

    #[test]
    fn startup_scan_runs_without_hydrated_cache() {
        let config = config_with(vec!["C:\\Apps".into()], 60);
        assert!(startup_scan_needed(None, &config, 1_000));
    }

    #[test]
    fn fresh_cache_skips_startup_scan() {
        let config = config_with(vec!["C:\\Apps".into()], 60);
        let snapshot = snapshot_with(config.fingerprint(), 10_000);
        assert!(!startup_scan_needed(Some(&snapshot), &config, 10_000 + 59 * 60));
    }

    #[test]
    fn elapsed_interval_forces_startup_scan() {
        let config = config_with(vec!["C:\\Apps".into()], 60);
        let snapshot = snapshot_with(config.fingerprint(), 10_000);
        assert!(startup_scan_needed(Some(&snapshot), &config, 10_000 + 61 * 60));
    }

    #[test]
    fn zero_interval_always_rescans() {
        let config = config_with(vec!["C:\\Apps".into()], 0);
        let snapshot = snapshot_with(config.fingerprint(), unix_now());
        assert!(startup_scan_needed(Some(&snapshot), &config, unix_now()));
    }

    #[test]
    fn huge_configured_interval_does_not_overflow() {
        let config = config_with(vec!["C:\\Apps".into()], u64::MAX);
        let snapshot = snapshot_with(config.fingerprint(), 0);
        assert!(!startup_scan_needed(Some(&snapshot), &config, unix_now()));
    }

    #[test]
    fn changed_search_paths_invalidate_interval_check() {
        let config = config_with(vec!["C:\\Apps".into()], 60);
        let snapshot = snapshot_with("stale-fingerprint".into(), unix_now());
        assert!(startup_scan_needed(Some(&snapshot), &config, unix_now()));
    }

    /// Package enumerator that blocks until the test releases it, so the
    /// test can hold a rebuild in flight deterministically.
    struct GatedPackages {
        calls: AtomicUsize,
        gate: Mutex<std_mpsc::Receiver<()>>,
    }

    impl PackageEnumerator for GatedPackages {
        fn enumerate(&self) -> Result<Vec<PackagedApp>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.lock().unwrap().recv();
            Ok(vec![PackagedApp {
                display_name: "Weather".into(),
                composite_app_id: "Vendor.Weather!App".into(),
                package_id: "Vendor.Weather".into(),
            }])
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rescans_are_serialized_and_coalesced() {
        let dir = tempfile::tempdir().unwrap();
        let (release, gate) = std_mpsc::channel();
        let packages = Arc::new(GatedPackages {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(gate),
        });

        let catalog = Arc::new(Catalog::new());
        let pre_rescan = ApplicationEntry::new(
            "Old".into(),
            "C:\\old.exe".into(),
            "C:\\old.exe".into(),
            SourceKind::Executable,
        );
        catalog.swap(CatalogSnapshot::build(vec![pre_rescan], "old".into()));

        let config = Arc::new(Mutex::new(config_with(
            vec![PACKAGED_APPS_SENTINEL.into()],
            60,
        )));
        let refresher = Arc::new(
            Refresher::new(
                Arc::clone(&catalog),
                config,
                ScanProviders {
                    shortcuts: Arc::new(UnresolvedShortcuts),
                    packages: Arc::clone(&packages) as Arc<dyn PackageEnumerator>,
                    icons: Arc::new(NoIcons),
                },
            )
            .with_cache_path(dir.path().join("catalog.json")),
        );
        let handle = refresher.spawn();

        handle.request();
        let packages_ref = Arc::clone(&packages);
        wait_for(move || packages_ref.calls.load(Ordering::SeqCst) == 1).await;

        // The rebuild is in flight; queries still see only the old snapshot.
        let mid_rescan = catalog.current();
        assert!(mid_rescan.get("C:\\old.exe").is_some());
        assert!(mid_rescan.get("Vendor.Weather!App").is_none());

        // Several requests during the in-flight rebuild coalesce into one.
        handle.request();
        handle.request();
        handle.request();

        release.send(()).unwrap();
        let packages_ref = Arc::clone(&packages);
        wait_for(move || packages_ref.calls.load(Ordering::SeqCst) == 2).await;
        release.send(()).unwrap();

        let catalog_ref = Arc::clone(&catalog);
        wait_for(move || catalog_ref.current().get("Vendor.Weather!App").is_some()).await;

        // No third rebuild follows the coalesced one.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(packages.calls.load(Ordering::SeqCst), 2);
    }
}
