use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Executable,
    Shortcut,
    PackagedApp,
}

/// One launchable application known to the catalog.
///
/// `origin_path` is the dedup and alias key: the discovered filesystem path
/// for executables and shortcuts, or the composite app id for packaged apps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationEntry {
    pub app_id: String,
    pub name: String,
    pub source_kind: SourceKind,
    pub launch_target: String,
    #[serde(default)]
    pub icon_ref: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    pub origin_path: String,
}

impl ApplicationEntry {
    pub fn new(name: String, origin_path: String, launch_target: String, kind: SourceKind) -> Self {
        Self {
            app_id: origin_path.clone(),
            name,
            source_kind: kind,
            launch_target,
            icon_ref: None,
            alias: None,
            origin_path,
        }
    }
}

/// Ranked search surface type handed to the UI layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchHit {
    pub app_id: String,
    pub name: String,
    pub icon_ref: Option<String>,
    pub score: i64,
}
