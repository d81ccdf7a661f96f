use std::collections::HashMap;

use log::debug;

use crate::{error::ScanError, models::ApplicationEntry, providers::IconSource};

/// Caches icon lookups by launch target so rescans of unchanged entries do
/// not re-trigger extraction. Failures are cached too: a target that has no
/// icon today will not have one on the next rescan either, and the source
/// call is the expensive part.
pub struct IconCache {
    resolved: HashMap<String, Option<String>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self {
            resolved: HashMap::new(),
        }
    }

    /// Attach icon references to the given entries. Extraction failure is
    /// non-fatal; the entry keeps `icon_ref = None` and the UI layer renders
    /// its fallback.
    pub fn resolve(&mut self, entries: &mut [ApplicationEntry], source: &dyn IconSource) {
        for entry in entries {
            let icon = self
                .resolved
                .entry(entry.launch_target.clone())
                .or_insert_with(|| match source.icon(&entry.launch_target) {
                    Ok(icon_ref) => Some(icon_ref),
                    Err(reason) => {
                        debug!(
                            "{}",
                            ScanError::IconExtractionFailed {
                                target: entry.launch_target.clone(),
                                reason,
                            }
                        );
                        None
                    }
                });
            entry.icon_ref = icon.clone();
        }
    }

    #[cfg(test)]
    fn cached(&self, target: &str) -> Option<&Option<String>> {
        self.resolved.get(target)
    }
}
