//! Narrow contracts for the OS collaborators the core depends on.
//!
//! The catalog never calls into platform shell APIs directly; it talks to
//! these traits. The default implementations below are deliberately thin:
//! real shortcut resolution, package enumeration and icon extraction live
//! in platform bindings outside the core.

use std::ffi::OsStr;

use crate::models::SourceKind;

/// Resolves a shortcut file to its true target path.
pub trait ShortcutResolver: Send + Sync {
    fn resolve(&self, shortcut_path: &str) -> Result<String, String>;
}

/// One installed packaged application, already normalized by the
/// enumerator: manifest fields that are sometimes scalar and sometimes a
/// list never cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedApp {
    pub display_name: String,
    pub composite_app_id: String,
    pub package_id: String,
}

/// Enumerates installed package-manager applications.
pub trait PackageEnumerator: Send + Sync {
    fn enumerate(&self) -> Result<Vec<PackagedApp>, String>;
}

/// Produces an icon reference (path or opaque cache key) for a launch target.
pub trait IconSource: Send + Sync {
    fn icon(&self, target: &str) -> Result<String, String>;
}

/// Executes the actual OS launch for a resolved target.
pub trait LaunchSpawner: Send + Sync {
    fn spawn(&self, target: &str, kind: SourceKind) -> Result<(), String>;
}

/// Fallback resolver for platforms without a shortcut binding; the scanner
/// keeps the shortcut's own path as the launch target.
pub struct UnresolvedShortcuts;

impl ShortcutResolver for UnresolvedShortcuts {
    fn resolve(&self, _shortcut_path: &str) -> Result<String, String> {
        Err("no shortcut resolution backend".into())
    }
}

/// Package enumerator for platforms without a package-manager binding.
pub struct NoPackages;

impl PackageEnumerator for NoPackages {
    fn enumerate(&self) -> Result<Vec<PackagedApp>, String> {
        Ok(Vec::new())
    }
}

/// Icon source that never produces an icon; entries keep `icon_ref = None`
/// and the UI layer renders its fallback glyph.
pub struct NoIcons;

impl IconSource for NoIcons {
    fn icon(&self, _target: &str) -> Result<String, String> {
        Err("no icon extraction backend".into())
    }
}

/// Launches targets through the system opener in a detached process.
pub struct SystemOpener;

impl LaunchSpawner for SystemOpener {
    fn spawn(&self, target: &str, kind: SourceKind) -> Result<(), String> {
        log::debug!("spawning {target} ({kind:?})");
        open::that_detached(OsStr::new(target)).map_err(|err| err.to_string())
    }
}
