//! macOS discovery strategy.
//!
//! Probes, in order: the current user's `Mobile Documents` tree, every other
//! local account's tree (accounts come from a `dscl` query with a `/Users`
//! readdir fallback), the shared `/Users/Shared/CloudDocs` folder, and
//! sandboxed container mirrors under `~/Library/Containers`. Any probe that
//! hits a permission wall is skipped; the rest keep going.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::identity;
use crate::registry::PathRegistry;
use crate::types::{PathKind, PathSource};

use super::DiscoveryAdapter;

/// Name of the general-purpose Drive root under `Mobile Documents`.
const CLOUD_DOCS: &str = "com~apple~CloudDocs";

/// Shared multi-user location.
const SHARED_CLOUD_DOCS: &str = "/Users/Shared/CloudDocs";

/// Discovery strategy for macOS.
pub struct MacosAdapter {
    home: Option<PathBuf>,
}

impl MacosAdapter {
    /// Create an adapter probing the current user's home directory.
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Create an adapter rooted at an explicit home directory.
    pub fn with_home(home: PathBuf) -> Self {
        Self { home: Some(home) }
    }

    /// Probe one `Mobile Documents` directory: the CloudDocs root plus every
    /// app-storage sibling.
    fn probe_mobile_documents(
        registry: &mut PathRegistry,
        mobile: &Path,
        root_source: PathSource,
    ) {
        let root = mobile.join(CLOUD_DOCS);
        registry.add(&root.to_string_lossy(), PathKind::Root, root_source);

        let entries = match fs::read_dir(mobile) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("cannot list {}: {e}", mobile.display());
                return;
            }
        };

        let parent = mobile.to_string_lossy().into_owned();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == CLOUD_DOCS || !identity::is_app_storage_name(&name) {
                continue;
            }
            registry.add(
                &entry.path().to_string_lossy(),
                PathKind::AppStorage,
                PathSource::AppStorage {
                    parent: parent.clone(),
                },
            );
        }
    }

    /// All local user account names, via directory services when available.
    fn user_accounts() -> Vec<String> {
        if let Some(accounts) = Self::dscl_accounts() {
            return accounts;
        }

        // No dscl (or it failed): fall back to listing /Users.
        fs::read_dir("/Users")
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|name| !is_system_account(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn dscl_accounts() -> Option<Vec<String>> {
        let output = Command::new("dscl")
            .args([".", "-list", "/Users"])
            .output()
            .ok()?;
        if !output.status.success() {
            log::debug!("dscl -list /Users exited with {}", output.status);
            return None;
        }
        let accounts: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !is_system_account(name))
            .map(ToString::to_string)
            .collect();
        Some(accounts)
    }

    /// Probe `~/Library/Containers/*/Data/Library/Mobile Documents` for
    /// app-sandboxed mirrors.
    fn probe_containers(registry: &mut PathRegistry, home: &Path) {
        let containers = home.join("Library").join("Containers");
        let entries = match fs::read_dir(&containers) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("cannot list {}: {e}", containers.display());
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let container = entry.file_name().to_string_lossy().into_owned();
            let mirror = entry
                .path()
                .join("Data")
                .join("Library")
                .join("Mobile Documents");
            if !mirror.is_dir() {
                continue;
            }
            registry.add(
                &mirror.to_string_lossy(),
                PathKind::Other,
                PathSource::Container { container },
            );
        }
    }
}

impl Default for MacosAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryAdapter for MacosAdapter {
    fn discover(&self, registry: &mut PathRegistry) {
        if let Some(home) = &self.home {
            let mobile = home.join("Library").join("Mobile Documents");
            Self::probe_mobile_documents(registry, &mobile, PathSource::Common);
        } else {
            log::debug!("no home directory, skipping primary Mobile Documents probe");
        }

        for account in Self::user_accounts() {
            let mobile = PathBuf::from("/Users")
                .join(&account)
                .join("Library")
                .join("Mobile Documents");
            if !mobile.exists() {
                continue;
            }
            Self::probe_mobile_documents(
                registry,
                &mobile,
                PathSource::UserDirectory { account },
            );
        }

        registry.add(SHARED_CLOUD_DOCS, PathKind::Root, PathSource::Common);

        if let Some(home) = &self.home {
            Self::probe_containers(registry, home);
        }
    }
}

fn is_system_account(name: &str) -> bool {
    name.starts_with('_')
        || name.starts_with('.')
        || matches!(name, "Shared" | "Guest" | "root" | "daemon" | "nobody")
}
