use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Category of a discovered location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathKind {
    /// A general-purpose iCloud Drive root folder
    Root,
    /// A per-application storage directory (name encodes the bundle id)
    AppStorage,
    /// A `Documents` folder inside a Drive root
    Documents,
    /// A `Photos` folder inside a Drive root
    Photos,
    /// Anything else worth reporting (e.g. sandboxed container mirrors)
    Other,
}

impl PathKind {
    /// Returns true for per-application storage directories
    pub fn is_app_storage(self) -> bool {
        matches!(self, Self::AppStorage)
    }
}

/// Provenance of a discovered path: which probe strategy produced it and
/// with what parameters. A path rediscovered by several probes accumulates
/// one entry per distinct source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PathSource {
    /// A well-known fixed location for the platform
    Common,
    /// A conventional child of a Drive root (`Documents`, `Photos`)
    CommonPath,
    /// Extracted from a Windows registry value
    Registry {
        /// Registry key that was queried
        key: String,
        /// Value name the path came from
        value_name: String,
    },
    /// An app-storage directory found while listing a parent
    AppStorage {
        /// Directory whose listing produced this entry
        parent: String,
    },
    /// Found by probing another user account's home tree
    UserDirectory {
        /// Account name the probe ran against
        account: String,
    },
    /// A sandboxed container mirror under `~/Library/Containers`
    Container {
        /// Container bundle directory name
        container: String,
    },
}

/// Filesystem facts captured when a path was last evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathStats {
    /// Size in bytes as reported by the filesystem
    pub size: u64,
    /// Last modification time, when available
    pub modified: Option<SystemTime>,
    /// Unix permission bits, when available
    pub mode: Option<u32>,
    /// Whether the path is a directory
    pub is_dir: bool,
}

/// Application identity decoded from an app-storage directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// The directory basename, verbatim, for traceability
    pub app_id: String,
    /// Human-formatted application name (e.g. `Pixelmator`)
    pub app_name: String,
    /// Dot-joined reverse-domain bundle identifier
    pub bundle_id: String,
    /// Publisher prefix of the bundle id (e.g. `com.apple`)
    pub vendor: String,
}

/// Open metadata attached to a discovered path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathMetadata {
    /// Stat snapshot from the most recent evaluation
    pub stats: Option<PathStats>,
    /// Directory listing snapshot, when the path was listable
    pub contents: Option<Vec<String>>,
    /// Whether the listing contained iCloud marker entries
    pub has_icloud_markers: bool,
    /// Parsed application identity for app-storage directories
    pub identity: Option<AppIdentity>,
}

impl PathMetadata {
    /// Fold another evaluation's metadata into this one, keeping fields the
    /// newer evaluation did not produce.
    pub(crate) fn absorb(&mut self, newer: PathMetadata) {
        if newer.stats.is_some() {
            self.stats = newer.stats;
        }
        if newer.contents.is_some() {
            self.contents = newer.contents;
        }
        self.has_icloud_markers |= newer.has_icloud_markers;
        if newer.identity.is_some() {
            self.identity = newer.identity;
        }
    }
}

/// A discovered candidate location with its confidence score.
///
/// Within one discovery run there is at most one `PathInfo` per canonical
/// path string; rediscoveries merge into the existing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathInfo {
    /// Canonical path string, platform-native separators
    pub path: String,
    /// Confidence score, higher is more certain; no fixed range
    pub score: i32,
    /// Whether the path existed at evaluation time
    pub exists: bool,
    /// Whether the path could be statted and listed
    pub accessible: bool,
    /// Category of the location
    pub kind: PathKind,
    /// Open metadata from evaluation and identity parsing
    pub metadata: PathMetadata,
    /// Every probe that produced or reconfirmed this entry
    pub sources: Vec<PathSource>,
}

impl PathInfo {
    /// Create a new entry for a path that has not been evaluated yet.
    pub fn new(path: impl Into<String>, kind: PathKind) -> Self {
        Self {
            path: path.into(),
            score: 0,
            exists: false,
            accessible: false,
            kind,
            metadata: PathMetadata::default(),
            sources: Vec::new(),
        }
    }

    /// Parsed application name, if this is a recognized app-storage path
    pub fn app_name(&self) -> Option<&str> {
        self.metadata.identity.as_ref().map(|i| i.app_name.as_str())
    }

    /// Parsed bundle identifier, if any
    pub fn bundle_id(&self) -> Option<&str> {
        self.metadata.identity.as_ref().map(|i| i.bundle_id.as_str())
    }

    /// Record a probe as provenance, skipping exact duplicates.
    pub(crate) fn record_source(&mut self, source: PathSource) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_source_deduplicates() {
        let mut info = PathInfo::new("/tmp/x", PathKind::Root);
        info.record_source(PathSource::Common);
        info.record_source(PathSource::Common);
        assert_eq!(info.sources.len(), 1);

        info.record_source(PathSource::UserDirectory {
            account: "alice".to_string(),
        });
        assert_eq!(info.sources.len(), 2);
    }

    #[test]
    fn test_metadata_absorb_keeps_old_fields() {
        let mut old = PathMetadata {
            identity: Some(AppIdentity {
                app_id: "com~apple~notes".to_string(),
                app_name: "Notes".to_string(),
                bundle_id: "com.apple.notes".to_string(),
                vendor: "com.apple".to_string(),
            }),
            has_icloud_markers: true,
            ..Default::default()
        };

        old.absorb(PathMetadata {
            contents: Some(vec!["a.txt".to_string()]),
            ..Default::default()
        });

        assert!(old.identity.is_some());
        assert!(old.has_icloud_markers);
        assert_eq!(old.contents.as_deref(), Some(&["a.txt".to_string()][..]));
    }
}
