use std::collections::HashSet;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    error::ScanError,
    models::{ApplicationEntry, SourceKind},
    providers::{PackageEnumerator, ShortcutResolver},
};

/// Scan the configured directories for executables and shortcuts.
///
/// Unreadable directories or entries are skipped and logged, never fatal.
/// The same `origin_path` reached through two configured directories yields
/// exactly one entry (first discovery wins).
pub fn scan_directories(
    paths: &[&str],
    depth: usize,
    resolver: &dyn ShortcutResolver,
) -> Vec<ApplicationEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();

    for root in paths {
        info!("scanning directory: {root}");
        let before = entries.len();
        for item in WalkDir::new(root).max_depth(depth.max(1)) {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    let scan_err = ScanError::PathUnreadable {
                        path: err
                            .path()
                            .map(|p| p.to_string_lossy().to_string())
                            .unwrap_or_else(|| root.to_string()),
                        source: err.into(),
                    };
                    warn!("{scan_err}");
                    continue;
                }
            };
            if !item.file_type().is_file() {
                continue;
            }
            let Some(entry) = entry_from_file(item.path(), resolver) else {
                continue;
            };
            if seen.insert(entry.origin_path.clone()) {
                entries.push(entry);
            }
        }
        debug!("found {} applications under {root}", entries.len() - before);
    }

    entries
}

fn entry_from_file(path: &std::path::Path, resolver: &dyn ShortcutResolver) -> Option<ApplicationEntry> {
    let ext = path.extension()?.to_ascii_lowercase();
    let kind = if ext == "exe" {
        SourceKind::Executable
    } else if ext == "lnk" {
        SourceKind::Shortcut
    } else {
        return None;
    };

    let name = path.file_stem()?.to_string_lossy().to_string();
    let origin_path = path.to_string_lossy().to_string();

    let launch_target = match kind {
        SourceKind::Shortcut => match resolver.resolve(&origin_path) {
            Ok(target) => target,
            Err(reason) => {
                // Keep the shortcut itself launchable through the shell.
                debug!(
                    "{}",
                    ScanError::ShortcutResolutionFailed {
                        path: origin_path.clone(),
                        reason,
                    }
                );
                origin_path.clone()
            }
        },
        _ => origin_path.clone(),
    };

    Some(ApplicationEntry::new(name, origin_path, launch_target, kind))
}

/// Enumerate installed packaged applications through the platform binding.
///
/// A failed enumeration contributes nothing; per-app failures are already
/// filtered out by the enumerator contract.
pub fn scan_packages(enumerator: &dyn PackageEnumerator) -> Vec<ApplicationEntry> {
    info!("enumerating packaged applications");
    let apps = match enumerator.enumerate() {
        Ok(apps) => apps,
        Err(reason) => {
            warn!("{}", ScanError::PackagedAppLookupFailed { reason });
            return Vec::new();
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let entries: Vec<ApplicationEntry> = apps
        .into_iter()
        .filter(|app| {
            if app.display_name.is_empty() || app.composite_app_id.is_empty() {
                warn!(
                    "{}",
                    ScanError::PackagedAppLookupFailed {
                        reason: format!("incomplete manifest for package '{}'", app.package_id),
                    }
                );
                return false;
            }
            seen.insert(app.composite_app_id.clone())
        })
        .map(|app| {
            ApplicationEntry::new(
                app.display_name,
                app.composite_app_id.clone(),
                app.composite_app_id,
                SourceKind::PackagedApp,
            )
        })
        .collect();

    info!("found {} packaged applications", entries.len());
    entries
}
