use thiserror::Error;

/// Recoverable conditions raised while scanning sources. None of these abort
/// a rescan; callers log and continue with whatever was gathered.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not readable: {path}: {source}")]
    PathUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("shortcut resolution failed for {path}: {reason}")]
    ShortcutResolutionFailed { path: String, reason: String },
    #[error("packaged app lookup failed: {reason}")]
    PackagedAppLookupFailed { reason: String },
    #[error("icon extraction failed for {target}: {reason}")]
    IconExtractionFailed { target: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no catalog entry for app id '{0}'")]
    EntryNotFound(String),
    #[error("launcher failed for '{target}': {reason}")]
    SpawnFailed { target: String, reason: String },
}
