use std::collections::HashMap;

use log::debug;

use crate::{config::AliasRule, models::ApplicationEntry};

/// Overlay configured aliases onto scanned entries.
///
/// Matching is exact string equality on `origin_path`. When several rules
/// target the same path the last one wins. Rules that match no entry are
/// inert; the target may simply not exist in this scan.
pub fn apply_aliases(entries: &mut [ApplicationEntry], rules: &[AliasRule]) {
    if rules.is_empty() {
        return;
    }

    let by_path: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.origin_path.clone(), index))
        .collect();

    for rule in rules {
        match by_path.get(rule.path.as_str()) {
            Some(index) => {
                debug!("alias '{}' bound to {}", rule.alias, rule.path);
                entries[*index].alias = Some(rule.alias.clone());
            }
            None => {
                debug!("alias rule for {} matched no entry", rule.path);
            }
        }
    }
}
