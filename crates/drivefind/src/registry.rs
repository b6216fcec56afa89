//! Deduplicating path registry.
//!
//! Every probe funnels its candidates through here. The registry evaluates
//! each path once per addition and merges repeated discoveries: the best
//! score wins, provenance accumulates, and there is never more than one
//! entry per canonical path string.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use crate::identity;
use crate::score::{Evaluator, ScoreConfig};
use crate::types::{PathInfo, PathKind, PathSource};

/// A map from canonical path string to the best-known [`PathInfo`].
#[derive(Debug, Default)]
pub struct PathRegistry {
    evaluator: Evaluator,
    entries: BTreeMap<String, PathInfo>,
}

impl PathRegistry {
    /// Create a registry with default scoring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a custom scoring config.
    pub fn with_config(config: ScoreConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            entries: BTreeMap::new(),
        }
    }

    /// Evaluate a path and merge it into the registry.
    pub fn add(&mut self, path: &str, kind: PathKind, source: PathSource) {
        let key = canonical(path);
        let evaluation = self.evaluator.evaluate(&key);

        let mut metadata = evaluation.metadata;
        if let Some(basename) = Path::new(&key).file_name().map(|n| n.to_string_lossy()) {
            if identity::is_app_storage_name(&basename) {
                metadata.identity = identity::parse(&basename);
            }
        }

        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                let mut info = PathInfo::new(slot.key().clone(), kind);
                info.score = evaluation.score;
                info.exists = evaluation.exists;
                info.accessible = evaluation.accessible;
                info.metadata = metadata;
                info.record_source(source);
                slot.insert(info);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if evaluation.score > existing.score {
                    log::debug!(
                        "rescoring {} ({} -> {})",
                        existing.path,
                        existing.score,
                        evaluation.score
                    );
                    existing.score = evaluation.score;
                    existing.exists = evaluation.exists;
                    existing.accessible = evaluation.accessible;
                    existing.kind = kind;
                    existing.metadata.absorb(metadata);
                }
                // Provenance accumulates either way.
                existing.record_source(source);
            }
        }
    }

    /// Entry for a specific canonical path, if present.
    pub fn get(&self, path: &str) -> Option<&PathInfo> {
        self.entries.get(&canonical(path))
    }

    /// All current entries, in path order.
    pub fn values(&self) -> impl Iterator<Item = &PathInfo> {
        self.entries.values()
    }

    /// Number of distinct paths seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry of the given kind cleared the score floor.
    pub fn has_confident(&self, kind: PathKind, floor: i32) -> bool {
        self.entries
            .values()
            .any(|p| p.kind == kind && p.score >= floor)
    }

    /// Consume the registry, returning entries sorted by descending score
    /// with non-positive scores dropped.
    pub fn into_ranked(self) -> Vec<PathInfo> {
        let mut ranked: Vec<PathInfo> = self
            .entries
            .into_values()
            .filter(|p| p.score > 0)
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
        ranked
    }
}

/// Canonical form of a path string: native separators as given, no trailing
/// separator (except a bare root).
fn canonical(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_string()
    } else {
        trimmed.to_string()
    }
}
