use std::{fs, path::PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

const CONFIG_FILE: &str = "config.json";

/// Sentinel search path that enables the package-manager scanner.
pub const PACKAGED_APPS_SENTINEL: &str = "PackagedApps";

const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 60;
const DEFAULT_SCAN_DEPTH: usize = 4;

/// Binds an extra search string to the entry whose `origin_path` equals
/// `path` exactly. Rules that match nothing are inert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasRule {
    pub path: String,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Ordered directories to scan, and/or the packaged-apps sentinel.
    pub search_paths: Vec<String>,
    /// Minutes between startup rescans; 0 forces a rescan every start.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
    /// Maximum directory depth for the filesystem scanner.
    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,
    #[serde(default)]
    pub aliases: Vec<AliasRule>,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MINUTES
}

fn default_scan_depth() -> usize {
    DEFAULT_SCAN_DEPTH
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut search_paths = Vec::new();
        if let Some(data) = dirs::data_dir() {
            let start_menu = data
                .join("Microsoft")
                .join("Windows")
                .join("Start Menu")
                .join("Programs");
            search_paths.push(start_menu.to_string_lossy().to_string());
        }
        search_paths.push(PACKAGED_APPS_SENTINEL.to_string());
        Self {
            search_paths,
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
            scan_depth: DEFAULT_SCAN_DEPTH,
            aliases: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from the user config directory. A missing file
    /// is replaced with the built-in default (and written out); a corrupt
    /// file falls back to the default.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            warn!("could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!("loaded configuration from {path:?}");
                    config
                }
                Err(err) => {
                    warn!("config file {path:?} is corrupt, using defaults: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file at {path:?}, writing defaults");
                let config = Self::default();
                if let Err(err) = config.save_to(path) {
                    warn!("failed to write default config: {err}");
                }
                config
            }
        }
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(path) = config_path() else {
            return Err("could not determine config directory".into());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| err.to_string())?;
        }
        let payload = serde_json::to_string_pretty(self).map_err(|err| err.to_string())?;
        fs::write(path, payload).map_err(|err| err.to_string())?;
        debug!("wrote configuration to {path:?}");
        Ok(())
    }

    /// Fingerprint of the ordered search path list. A catalog built under a
    /// different fingerprint is stale regardless of its age.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        for path in &self.search_paths {
            hasher.update(path.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn includes_packaged_apps(&self) -> bool {
        self.search_paths
            .iter()
            .any(|path| path == PACKAGED_APPS_SENTINEL)
    }

    pub fn directory_paths(&self) -> impl Iterator<Item = &str> {
        self.search_paths
            .iter()
            .map(String::as_str)
            .filter(|path| *path != PACKAGED_APPS_SENTINEL)
    }
}

fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("kindling").join(CONFIG_FILE))
}
