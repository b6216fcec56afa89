//! Result filtering and fuzzy app-name matching.

use crate::types::{PathInfo, PathKind};

/// Options narrowing a discovery result set.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Fuzzy app-name pattern; tokens are matched independently
    pub app_name: Option<String>,
    /// Drop entries scoring below this
    pub min_score: Option<i32>,
    /// Keep exists-but-locked entries
    pub include_inaccessible: bool,
    /// Restrict to these categories
    pub kinds: Option<Vec<PathKind>>,
}

/// Weight for an exact case-insensitive app-name match.
const WEIGHT_NAME_EXACT: i32 = 100;
/// Weight for an app-name substring match.
const WEIGHT_NAME_SUBSTRING: i32 = 50;
/// Weight for a bundle-id substring match.
const WEIGHT_BUNDLE_SUBSTRING: i32 = 30;
/// Weight for an app-id substring match.
const WEIGHT_APP_ID_SUBSTRING: i32 = 20;

/// Apply accessibility, score, category, and app-name filtering.
///
/// When an app-name pattern is given the result is re-ranked by match
/// weight; that ordering replaces the score-based ordering entirely.
pub fn filter(paths: Vec<PathInfo>, options: &SearchOptions) -> Vec<PathInfo> {
    let mut kept: Vec<PathInfo> = paths
        .into_iter()
        .filter(|p| options.include_inaccessible || p.accessible)
        .filter(|p| options.min_score.is_none_or(|min| p.score >= min))
        .filter(|p| {
            options
                .kinds
                .as_ref()
                .is_none_or(|kinds| kinds.contains(&p.kind))
        })
        .collect();

    if let Some(pattern) = options.app_name.as_deref() {
        let mut weighted: Vec<(i32, PathInfo)> = kept
            .drain(..)
            .filter_map(|p| {
                let weight = match_weight(&p, pattern);
                (weight > 0).then_some((weight, p))
            })
            .collect();
        weighted.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)));
        return weighted.into_iter().map(|(_, p)| p).collect();
    }

    kept
}

/// Weighted fuzzy match of a whitespace-tokenized pattern against a path's
/// identity fields. Zero means no match.
fn match_weight(info: &PathInfo, pattern: &str) -> i32 {
    let identity = info.metadata.identity.as_ref();
    let mut weight = 0;

    for token in pattern.split_whitespace() {
        let token = token.to_lowercase();

        if let Some(id) = identity {
            let name = id.app_name.to_lowercase();
            if name == token {
                weight += WEIGHT_NAME_EXACT;
            } else if name.contains(&token) {
                weight += WEIGHT_NAME_SUBSTRING;
            }
            if id.bundle_id.to_lowercase().contains(&token) {
                weight += WEIGHT_BUNDLE_SUBSTRING;
            }
            if id.app_id.to_lowercase().contains(&token) {
                weight += WEIGHT_APP_ID_SUBSTRING;
            }
        }
    }

    weight
}
