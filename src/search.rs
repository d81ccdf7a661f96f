use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::debug;

use crate::{
    catalog::CatalogSnapshot,
    models::{ApplicationEntry, SearchHit},
};

/// Maximum number of hits returned per query.
const RESULT_LIMIT: usize = 12;

/// A higher-quality match kind ranks above a lower-quality one regardless
/// of position; position only orders results within the same kind.
const PREFIX_BASE: i64 = 3_000_000;
const SUBSTRING_BASE: i64 = 2_000_000;
const SUBSEQUENCE_BASE: i64 = 1_000_000;
const POSITION_WEIGHT: i64 = 1_000;
const POSITION_CAP: usize = 999;

/// Rank catalog entries against a query.
///
/// Matching is case-insensitive and evaluated independently against an
/// entry's name and alias; the better of the two fields scores the entry.
/// An empty query returns no hits so the UI can hide its suggestion pane.
pub fn search(query: &str, snapshot: &CatalogSnapshot) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(&ApplicationEntry, i64)> = snapshot
        .entries
        .values()
        .filter_map(|entry| score_entry(&matcher, entry, query).map(|score| (entry, score)))
        .collect();

    scored.sort_by(|(a, score_a), (b, score_b)| {
        score_b
            .cmp(score_a)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.app_id.cmp(&b.app_id))
    });
    scored.truncate(RESULT_LIMIT);

    debug!("query '{query}' matched {} entries", scored.len());
    scored
        .into_iter()
        .map(|(entry, score)| SearchHit {
            app_id: entry.app_id.clone(),
            name: entry.name.clone(),
            icon_ref: entry.icon_ref.clone(),
            score,
        })
        .collect()
}

fn score_entry(matcher: &SkimMatcherV2, entry: &ApplicationEntry, query: &str) -> Option<i64> {
    let name_score = score_field(matcher, &entry.name, query);
    let alias_score = entry
        .alias
        .as_deref()
        .and_then(|alias| score_field(matcher, alias, query));
    match (name_score, alias_score) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn score_field(matcher: &SkimMatcherV2, field: &str, query: &str) -> Option<i64> {
    let field_lower = field.to_lowercase();
    let query_lower = query.to_lowercase();

    if field_lower.starts_with(&query_lower) {
        return Some(PREFIX_BASE + refine(matcher, &field_lower, &query_lower));
    }
    if let Some(position) = field_lower.find(&query_lower) {
        let chars_before = field_lower[..position].chars().count().min(POSITION_CAP);
        return Some(SUBSTRING_BASE - chars_before as i64 * POSITION_WEIGHT
            + refine(matcher, &field_lower, &query_lower));
    }
    let (score, indices) = matcher.fuzzy_indices(&field_lower, &query_lower)?;
    let first = indices.first().copied().unwrap_or(0).min(POSITION_CAP);
    Some(SUBSEQUENCE_BASE - first as i64 * POSITION_WEIGHT + score.clamp(0, POSITION_WEIGHT - 1))
}

/// Skim score as a sub-position tiebreaker inside a kind tier. Clamped so
/// it can never outrank a better match position.
fn refine(matcher: &SkimMatcherV2, field: &str, query: &str) -> i64 {
    matcher
        .fuzzy_match(field, query)
        .unwrap_or(0)
        .clamp(0, POSITION_WEIGHT - 1)
}
