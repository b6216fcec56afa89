//! Path evaluation and scoring.
//!
//! The evaluator inspects a single filesystem path and turns what it finds
//! into a confidence score. It is total: any input string produces a result,
//! and every filesystem failure degrades the score instead of propagating.

use std::fs;
use std::io::ErrorKind;

use crate::types::{PathMetadata, PathStats};

/// Additive scoring constants.
///
/// Callers that want a different policy (e.g. penalizing app-storage paths
/// under an unreadable root) construct their own config instead of relying
/// on the defaults.
#[derive(Debug, Clone, Copy)]
pub struct ScoreConfig {
    /// Credit for a path that exists and can be statted
    pub base: i32,
    /// Additional credit when the path is a directory
    pub dir_bonus: i32,
    /// Additional credit when the listing contains iCloud marker entries
    pub marker_bonus: i32,
    /// Score for a path that exists but cannot be read (permission denied)
    pub locked_credit: i32,
    /// Score for input that is not a path under any OS convention
    pub non_path_penalty: i32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            base: 8,
            dir_bonus: 5,
            marker_bonus: 15,
            locked_credit: 5,
            non_path_penalty: -100,
        }
    }
}

/// Outcome of evaluating one path.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Whether the path exists
    pub exists: bool,
    /// Whether the path could be statted and, for directories, listed
    pub accessible: bool,
    /// Confidence score under the evaluator's [`ScoreConfig`]
    pub score: i32,
    /// Stats and listing snapshot captured along the way
    pub metadata: PathMetadata,
}

/// Inspects filesystem paths and produces existence/accessibility facts plus
/// a base score.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: ScoreConfig,
}

impl Evaluator {
    /// Create an evaluator with a custom scoring config.
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    /// Evaluate a single path. Never panics and never returns an error;
    /// anything that goes wrong shows up as a lower score.
    pub fn evaluate(&self, path: &str) -> Evaluation {
        let cfg = &self.config;

        // A string without a separator for either OS convention is not a
        // path at all.
        if !path.contains('/') && !path.contains('\\') {
            return Evaluation {
                exists: false,
                accessible: false,
                score: cfg.non_path_penalty,
                metadata: PathMetadata::default(),
            };
        }

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                // Exists but locked: partial credit.
                return Evaluation {
                    exists: true,
                    accessible: false,
                    score: cfg.locked_credit,
                    metadata: PathMetadata::default(),
                };
            }
            Err(e) => {
                log::debug!("stat failed for {path}: {e}");
                return Evaluation {
                    exists: false,
                    accessible: false,
                    score: 0,
                    metadata: PathMetadata::default(),
                };
            }
        };

        let mut metadata = PathMetadata {
            stats: Some(stats_of(&meta)),
            ..Default::default()
        };
        let mut score = cfg.base;

        if meta.is_dir() {
            score += cfg.dir_bonus;

            match fs::read_dir(path) {
                Ok(entries) => {
                    let names: Vec<String> = entries
                        .filter_map(|e| e.ok())
                        .map(|e| e.file_name().to_string_lossy().into_owned())
                        .collect();

                    if names.iter().any(|n| is_icloud_marker(n)) {
                        metadata.has_icloud_markers = true;
                        score += cfg.marker_bonus;
                    }
                    metadata.contents = Some(names);
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    // Statted fine but the listing is off limits.
                    return Evaluation {
                        exists: true,
                        accessible: false,
                        score: cfg.locked_credit,
                        metadata,
                    };
                }
                Err(e) => {
                    log::debug!("listing failed for {path}: {e}");
                }
            }
        }

        Evaluation {
            exists: true,
            accessible: true,
            score,
            metadata,
        }
    }
}

/// Recognize directory entries whose presence signals sync-client management.
pub fn is_icloud_marker(name: &str) -> bool {
    name.contains("~com~")
        || name.contains(".icloud")
        || name.eq_ignore_ascii_case("desktop.ini")
        || name.starts_with("iCloud~")
}

fn stats_of(meta: &fs::Metadata) -> PathStats {
    PathStats {
        size: meta.len(),
        modified: meta.modified().ok(),
        mode: unix_mode(meta),
        is_dir: meta.is_dir(),
    }
}

#[cfg(unix)]
fn unix_mode(meta: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_meta: &fs::Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_path_input_scores_negative() {
        let evaluator = Evaluator::default();
        let result = evaluator.evaluate("not a path at all");
        assert!(!result.exists);
        assert!(result.score < 0);
    }

    #[test]
    fn test_missing_path_scores_zero() {
        let evaluator = Evaluator::default();
        let result = evaluator.evaluate("/definitely/not/here/cirrus-test");
        assert!(!result.exists);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_evaluate_never_panics_on_odd_input() {
        let evaluator = Evaluator::default();
        for input in ["", "~", "\\\\?\\weird", "/\0embedded", "a/b\u{1F300}c"] {
            let _ = evaluator.evaluate(input);
        }
    }

    #[test]
    fn test_accessible_directory_gets_base_plus_dir() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = Evaluator::default();
        let cfg = ScoreConfig::default();

        let result = evaluator.evaluate(&dir.path().to_string_lossy());
        assert!(result.exists);
        assert!(result.accessible);
        assert_eq!(result.score, cfg.base + cfg.dir_bonus);
        assert!(!result.metadata.has_icloud_markers);
    }

    #[test]
    fn test_marker_entry_adds_bonus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf.icloud"), b"").unwrap();

        let evaluator = Evaluator::default();
        let cfg = ScoreConfig::default();
        let result = evaluator.evaluate(&dir.path().to_string_lossy());

        assert!(result.metadata.has_icloud_markers);
        assert_eq!(result.score, cfg.base + cfg.dir_bonus + cfg.marker_bonus);
    }

    #[test]
    fn test_plain_file_gets_base_only() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"data").unwrap();

        let result = Evaluator::default().evaluate(&file.to_string_lossy());
        assert_eq!(result.score, ScoreConfig::default().base);
        assert!(result.metadata.contents.is_none());
    }

    #[test]
    fn test_custom_config_changes_scale() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = Evaluator::new(ScoreConfig {
            base: 50,
            dir_bonus: 0,
            marker_bonus: 25,
            locked_credit: 1,
            non_path_penalty: -1,
        });

        let result = evaluator.evaluate(&dir.path().to_string_lossy());
        assert_eq!(result.score, 50);
        assert_eq!(evaluator.evaluate("no-separator").score, -1);
    }

    #[test]
    fn test_marker_recognition() {
        assert!(is_icloud_marker("4R6749AYRE~com~pixelmatorteam~pixelmator"));
        assert!(is_icloud_marker("notes.icloud"));
        assert!(is_icloud_marker("Desktop.ini"));
        assert!(is_icloud_marker("iCloud~md~obsidian"));
        assert!(!is_icloud_marker("Documents"));
        assert!(!is_icloud_marker("holiday.jpg"));
    }
}
