//! Windows discovery strategy.
//!
//! Two probe families: well-known `iCloudDrive` folders (user profile and
//! every mounted drive letter), and the registry, queried by shelling out to
//! `reg query` the way the sync client registers its roots. Registry
//! fallback keys are only consulted when the common locations came up empty.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::identity;
use crate::registry::PathRegistry;
use crate::score::is_icloud_marker;
use crate::types::{PathKind, PathSource};

use super::DiscoveryAdapter;

/// Registry keys that may carry the Drive root, most reliable first. The
/// sync-root-manager key is written by the current client; the Apple keys
/// (including the 32-bit mirror) cover older installs.
const REGISTRY_KEYS: &[&str] = &[
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer\SyncRootManager",
    r"HKCU\Software\Apple Inc.\iCloud",
    r"HKLM\SOFTWARE\Apple Inc.\iCloud",
    r"HKLM\SOFTWARE\WOW6432Node\Apple Inc.\iCloud",
];

/// Folder names the sync client uses for the Drive root.
const ROOT_NAMES: &[&str] = &["iCloudDrive", "iCloud Drive"];

/// A root must clear this score before its children are swept.
const SWEEP_FLOOR: i32 = 10;

/// `<value name>    REG_<type>    <data>` lines in `reg query` output.
static REG_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?)\s+(REG_[A-Z_]+)\s+(.+)$").unwrap()
});

/// Discovery strategy for Windows.
pub struct WindowsAdapter {
    user_profile: Option<PathBuf>,
}

impl WindowsAdapter {
    /// Create an adapter probing the current user's profile directory.
    pub fn new() -> Self {
        Self {
            user_profile: std::env::var_os("USERPROFILE")
                .map(PathBuf::from)
                .or_else(dirs::home_dir),
        }
    }

    /// Create an adapter rooted at an explicit profile directory.
    pub fn with_profile(profile: PathBuf) -> Self {
        Self {
            user_profile: Some(profile),
        }
    }

    /// Candidate Drive-root locations: both folder names under the user
    /// profile and at the root of every mounted drive letter.
    fn common_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(profile) = &self.user_profile {
            for name in ROOT_NAMES {
                candidates.push(profile.join(name));
            }
        }
        for letter in b'A'..=b'Z' {
            let drive = format!("{}:\\", letter as char);
            if !Path::new(&drive).exists() {
                continue;
            }
            for name in ROOT_NAMES {
                candidates.push(PathBuf::from(format!("{drive}{name}")));
            }
        }
        candidates
    }

    /// A candidate counts as a Drive root only when its listing shows signs
    /// of sync management: a marker entry, a conventional `Documents` or
    /// `Photos` child, or an app-storage-named child.
    fn accept_root(path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        let Ok(entries) = fs::read_dir(path) else {
            return false;
        };
        entries.filter_map(|e| e.ok()).any(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            is_icloud_marker(&name)
                || name == "Documents"
                || name == "Photos"
                || identity::is_app_storage_name(&name)
        })
    }

    /// Query one registry key, returning `(value name, data)` pairs.
    fn query_registry(key: &str) -> Vec<(String, String)> {
        let output = match Command::new("reg").args(["query", key]).output() {
            Ok(output) => output,
            Err(e) => {
                log::debug!("reg query unavailable: {e}");
                return Vec::new();
            }
        };
        if !output.status.success() {
            log::debug!("reg query {key} exited with {}", output.status);
            return Vec::new();
        }
        parse_reg_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Sweep each confident root's top level for app-storage directories and
    /// the conventional `Documents`/`Photos` folders.
    fn sweep_roots(registry: &mut PathRegistry) {
        let roots: Vec<String> = registry
            .values()
            .filter(|p| p.kind == PathKind::Root && p.accessible && p.score >= SWEEP_FLOOR)
            .map(|p| p.path.clone())
            .collect();

        for root in roots {
            let entries = match fs::read_dir(&root) {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("cannot list {root}: {e}");
                    continue;
                }
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = entry.path();
                if identity::is_app_storage_name(&name) {
                    registry.add(
                        &path.to_string_lossy(),
                        PathKind::AppStorage,
                        PathSource::AppStorage {
                            parent: root.clone(),
                        },
                    );
                } else if name == "Documents" || name == "Photos" {
                    let kind = if name == "Photos" {
                        PathKind::Photos
                    } else {
                        PathKind::Documents
                    };
                    registry.add(&path.to_string_lossy(), kind, PathSource::CommonPath);
                }
            }
        }
    }
}

impl Default for WindowsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryAdapter for WindowsAdapter {
    fn discover(&self, registry: &mut PathRegistry) {
        for candidate in self.common_candidates() {
            if Self::accept_root(&candidate) {
                registry.add(
                    &candidate.to_string_lossy(),
                    PathKind::Root,
                    PathSource::Common,
                );
            }
        }

        for (index, key) in REGISTRY_KEYS.iter().enumerate() {
            // Fallback keys are only worth the subprocess when something
            // else already produced a confident root.
            if index > 0 && registry.has_confident(PathKind::Root, SWEEP_FLOOR) {
                break;
            }
            for (value_name, value) in Self::query_registry(key) {
                if !looks_like_drive_path(&value) {
                    continue;
                }
                registry.add(
                    &value,
                    PathKind::Root,
                    PathSource::Registry {
                        key: (*key).to_string(),
                        value_name,
                    },
                );
            }
        }

        Self::sweep_roots(registry);
    }
}

/// Parse `reg query` text output into `(value name, data)` pairs.
///
/// The output is blocks of `HKEY_...` header lines followed by indented
/// `<name> REG_<type> <data>` value lines, blocks separated by blank lines.
pub fn parse_reg_output(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("HKEY_"))
        .filter_map(|line| {
            let caps = REG_VALUE_LINE.captures(line)?;
            let name = caps.get(1)?.as_str().trim().to_string();
            let value = caps.get(3)?.as_str().trim().to_string();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value))
        })
        .collect()
}

/// Registry data is accepted only when it looks like an absolute Windows
/// path that mentions iCloud.
fn looks_like_drive_path(value: &str) -> bool {
    value.contains(":\\") && value.to_lowercase().contains("icloud")
}
