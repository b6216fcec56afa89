//! Transfer planning and execution.
//!
//! `analyze` is strict: any problem with the source, the targets, or the
//! pattern aborts with an error before anything is touched. `copy` is
//! partial-failure: once the plan is good, every file is attempted and
//! failures are collected per file instead of aborting the rest.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use walkdir::WalkDir;

use crate::Finder;
use crate::error::{Error, Result};
use crate::filter::SearchOptions;
use crate::types::PathInfo;

/// Reliability floor for copy destinations. Discovery candidates below this
/// score are never used as targets.
pub const TARGET_SCORE_FLOOR: i32 = 10;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// One canonical request shape for both `analyze` and `copy`. Convenience
/// call forms belong in the calling layer, not here.
#[derive(Debug, Clone, Default)]
pub struct CopyRequest {
    /// File or directory to copy from
    pub source: PathBuf,
    /// Fuzzy app-name pattern selecting the destination
    pub app: Option<String>,
    /// Glob matched against file basenames (directories always recursed)
    pub pattern: Option<String>,
    /// Walk directories; required when the source is one
    pub recursive: bool,
    /// Replace files that already exist at the destination
    pub overwrite: bool,
    /// Plan and report without touching the filesystem
    pub dry_run: bool,
}

impl CopyRequest {
    /// Request to copy `source` into the best discovered location.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Everything `analyze` learned: resolved targets, the file list, and
/// aggregate totals.
#[derive(Debug, Clone, Serialize)]
pub struct TransferPlan {
    /// The source as given
    pub source: PathBuf,
    /// Candidate destinations, best first
    pub targets: Vec<PathInfo>,
    /// Files that would be copied
    pub files: Vec<PathBuf>,
    /// Number of files in the plan
    pub total_files: usize,
    /// Sum of file sizes; unreadable files contribute zero
    pub total_size: u64,
}

/// Result of executing a copy plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyOutcome {
    /// True iff every file copied cleanly
    pub success: bool,
    /// The best-scoring destination root
    pub target_path: Option<String>,
    /// Source-relative paths that were copied (or would be, on dry run)
    pub copied_files: Vec<String>,
    /// Source-relative paths that failed
    pub failed_files: Vec<String>,
    /// One message per failure
    pub errors: Vec<String>,
}

impl CopyOutcome {
    fn add_copy(&mut self, rel: &Path) {
        self.copied_files.push(rel.display().to_string());
    }

    fn add_failure(&mut self, rel: &Path, error: String) {
        self.failed_files.push(rel.display().to_string());
        self.errors.push(error);
    }
}

/// The copy pipeline: resolves destinations through a [`Finder`] and copies
/// source files into them.
pub struct Transfer {
    finder: Finder,
}

impl Transfer {
    /// Build a pipeline over an explicitly constructed finder.
    pub fn new(finder: Finder) -> Self {
        Self { finder }
    }

    /// Resolve targets and enumerate source files without copying anything.
    ///
    /// # Errors
    ///
    /// `SourceNotFound`, `NoValidTargetPath`, `RecursionRequired`,
    /// `NoFilesToCopy`, and `InvalidPattern` are all plan-time failures; the
    /// filesystem is untouched when any of them is returned.
    pub fn analyze(&self, request: &CopyRequest) -> Result<TransferPlan> {
        let source = &request.source;
        if !source.exists() {
            return Err(Error::SourceNotFound(source.clone()));
        }

        let targets = self.finder.search(&SearchOptions {
            app_name: request.app.clone(),
            min_score: Some(TARGET_SCORE_FLOOR),
            ..Default::default()
        });
        if targets.is_empty() {
            return Err(Error::NoValidTargetPath);
        }

        let files = if source.is_dir() {
            if !request.recursive {
                return Err(Error::RecursionRequired(source.clone()));
            }
            collect_files(source, request.pattern.as_deref())?
        } else {
            // A single file is copied as-is; pattern and recursion are moot.
            vec![source.clone()]
        };
        if files.is_empty() {
            return Err(Error::NoFilesToCopy);
        }

        let total_size = files
            .iter()
            .map(|f| fs::metadata(f).map(|m| m.len()).unwrap_or(0))
            .sum();

        Ok(TransferPlan {
            source: source.clone(),
            targets,
            total_files: files.len(),
            total_size,
            files,
        })
    }

    /// Execute the plan for `request`.
    ///
    /// Plan-time failures propagate unchanged from [`analyze`](Self::analyze).
    /// Per-file failures never abort the remaining files; they are collected
    /// in the outcome and reflected in `success`.
    pub fn copy(&self, request: &CopyRequest) -> Result<CopyOutcome> {
        let plan = self.analyze(request)?;

        let source_root = if plan.source.is_dir() {
            plan.source.clone()
        } else {
            plan.source
                .parent()
                .map_or_else(|| PathBuf::from(""), Path::to_path_buf)
        };

        let mut outcome = CopyOutcome {
            target_path: plan.targets.first().map(|t| t.path.clone()),
            ..Default::default()
        };

        for target in &plan.targets {
            let target_root = Path::new(&target.path);
            for file in &plan.files {
                let rel = file.strip_prefix(&source_root).unwrap_or(file);
                let dest = target_root.join(rel);

                if request.dry_run {
                    outcome.add_copy(rel);
                    continue;
                }

                if let Some(parent) = dest.parent() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        outcome.add_failure(
                            rel,
                            format!("Failed to write to {}: {e}", dest.display()),
                        );
                        continue;
                    }
                }

                if !request.overwrite && dest.exists() {
                    outcome.add_failure(
                        rel,
                        format!("Target file already exists: {}", dest.display()),
                    );
                    continue;
                }

                match stream_copy(file, &dest) {
                    Ok(bytes) => {
                        log::debug!("copied {} ({bytes} bytes)", rel.display());
                        outcome.add_copy(rel);
                    }
                    Err(message) => outcome.add_failure(rel, message),
                }
            }
        }

        outcome.success = outcome.failed_files.is_empty();
        Ok(outcome)
    }
}

/// Depth-first enumeration of files under `root`. The glob applies to file
/// basenames only; directories are always recursed.
fn collect_files(root: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let matcher = pattern
        .map(|p| {
            Glob::new(p)
                .map(|g| g.compile_matcher())
                .map_err(|e| Error::InvalidPattern {
                    pattern: p.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if basename_matches(&matcher, entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn basename_matches(matcher: &Option<GlobMatcher>, path: &Path) -> bool {
    match matcher {
        None => true,
        Some(m) => path.file_name().is_some_and(|name| m.is_match(name)),
    }
}

/// Copy source bytes to dest, distinguishing read failures from write
/// failures in the reported message.
fn stream_copy(source: &Path, dest: &Path) -> std::result::Result<u64, String> {
    let mut reader = File::open(source)
        .map_err(|e| format!("Failed to read {}: {e}", source.display()))?;
    let mut writer = File::create(dest)
        .map_err(|e| format!("Failed to write to {}: {e}", dest.display()))?;

    let mut buf = [0u8; COPY_BUF_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| format!("Failed to read {}: {e}", source.display()))?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .map_err(|e| format!("Failed to write to {}: {e}", dest.display()))?;
        written += n as u64;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DiscoveryAdapter;
    use crate::registry::PathRegistry;
    use crate::types::{PathKind, PathSource};

    /// Test adapter that proposes a fixed directory as the Drive root.
    struct FixedAdapter {
        root: PathBuf,
    }

    impl DiscoveryAdapter for FixedAdapter {
        fn discover(&self, registry: &mut PathRegistry) {
            registry.add(
                &self.root.to_string_lossy(),
                PathKind::Root,
                PathSource::Common,
            );
        }
    }

    fn transfer_to(target: &Path) -> Transfer {
        Transfer::new(Finder::with_adapter(Box::new(FixedAdapter {
            root: target.to_path_buf(),
        })))
    }

    fn fixture_source() -> tempfile::TempDir {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("file1.txt"), b"abcd1234").unwrap();
        fs::create_dir(source.path().join("dir1")).unwrap();
        fs::write(source.path().join("dir1").join("file2.txt"), b"abcd5678").unwrap();
        source
    }

    #[test]
    fn test_analyze_totals() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let plan = transfer
            .analyze(&CopyRequest {
                source: source.path().to_path_buf(),
                pattern: Some("*.txt".to_string()),
                recursive: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(plan.total_files, 2);
        assert_eq!(plan.total_size, 16);
    }

    #[test]
    fn test_analyze_missing_source() {
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let err = transfer
            .analyze(&CopyRequest::new("/no/such/source"))
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn test_analyze_requires_recursive_for_directories() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let err = transfer
            .analyze(&CopyRequest::new(source.path()))
            .unwrap_err();
        assert!(matches!(err, Error::RecursionRequired(_)));
    }

    #[test]
    fn test_analyze_no_target_when_root_missing() {
        let source = fixture_source();
        let transfer = transfer_to(Path::new("/no/such/target"));

        let err = transfer
            .analyze(&CopyRequest {
                source: source.path().to_path_buf(),
                recursive: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::NoValidTargetPath));
    }

    #[test]
    fn test_analyze_no_files_matching_pattern() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let err = transfer
            .analyze(&CopyRequest {
                source: source.path().to_path_buf(),
                pattern: Some("*.pdf".to_string()),
                recursive: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::NoFilesToCopy));
    }

    #[test]
    fn test_copy_end_to_end() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let outcome = transfer
            .copy(&CopyRequest {
                source: source.path().to_path_buf(),
                pattern: Some("*.txt".to_string()),
                recursive: true,
                ..Default::default()
            })
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.failed_files.is_empty());
        assert_eq!(outcome.copied_files.len(), 2);
        assert_eq!(
            fs::read(target.path().join("file1.txt")).unwrap(),
            b"abcd1234"
        );
        assert_eq!(
            fs::read(target.path().join("dir1").join("file2.txt")).unwrap(),
            b"abcd5678"
        );
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let request = CopyRequest {
            source: source.path().to_path_buf(),
            recursive: true,
            ..Default::default()
        };

        let dry = transfer
            .copy(&CopyRequest {
                dry_run: true,
                ..request.clone()
            })
            .unwrap();
        assert!(dry.success);
        assert!(!target.path().join("file1.txt").exists());
        assert!(fs::read_dir(target.path()).unwrap().next().is_none());

        // Same copied list as the real run on identical inputs.
        let real = transfer.copy(&request).unwrap();
        let mut dry_files = dry.copied_files.clone();
        let mut real_files = real.copied_files.clone();
        dry_files.sort();
        real_files.sort();
        assert_eq!(dry_files, real_files);
    }

    #[test]
    fn test_overwrite_guard_is_per_file() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        // One destination file already exists.
        fs::write(target.path().join("file1.txt"), b"old").unwrap();

        let transfer = transfer_to(target.path());
        let outcome = transfer
            .copy(&CopyRequest {
                source: source.path().to_path_buf(),
                recursive: true,
                ..Default::default()
            })
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.failed_files, vec!["file1.txt".to_string()]);
        assert!(outcome.errors[0].contains("already exists"));
        // The pre-existing file is untouched.
        assert_eq!(fs::read(target.path().join("file1.txt")).unwrap(), b"old");
        // The other file still copied.
        assert_eq!(outcome.copied_files.len(), 1);
        assert!(target.path().join("dir1").join("file2.txt").exists());
    }

    #[test]
    fn test_overwrite_replaces_existing() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        fs::write(target.path().join("file1.txt"), b"old").unwrap();

        let transfer = transfer_to(target.path());
        let outcome = transfer
            .copy(&CopyRequest {
                source: source.path().to_path_buf(),
                recursive: true,
                overwrite: true,
                ..Default::default()
            })
            .unwrap();

        assert!(outcome.success);
        assert_eq!(
            fs::read(target.path().join("file1.txt")).unwrap(),
            b"abcd1234"
        );
    }

    #[test]
    fn test_single_file_source_ignores_pattern() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let outcome = transfer
            .copy(&CopyRequest {
                source: source.path().join("file1.txt"),
                pattern: Some("*.pdf".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.copied_files, vec!["file1.txt".to_string()]);
        assert!(target.path().join("file1.txt").exists());
    }

    #[test]
    fn test_invalid_pattern_is_a_plan_error() {
        let source = fixture_source();
        let target = tempfile::tempdir().unwrap();
        let transfer = transfer_to(target.path());

        let err = transfer
            .analyze(&CopyRequest {
                source: source.path().to_path_buf(),
                pattern: Some("[".to_string()),
                recursive: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert!(err.is_plan_error());
    }
}
