//! # drivefind
//!
//! Locates iCloud Drive storage locations and per-application sync folders
//! on a host machine, scores and deduplicates the candidates, and copies
//! files into the best-scoring one.
//!
//! ## How discovery works
//!
//! A platform-specific [`DiscoveryAdapter`](adapter::DiscoveryAdapter)
//! probes well-known locations (and, on Windows, the registry), feeding
//! every candidate into a [`PathRegistry`](registry::PathRegistry) that
//! merges repeated discoveries: one entry per canonical path, best score
//! wins, provenance accumulates. Discovery is best-effort and total —
//! probe failures lower scores, they never abort the run.
//!
//! ## Error policy
//!
//! Three tiers, and callers depend on which tier an error came from:
//! - discovery never fails; degraded hosts just produce fewer results
//! - transfer planning ([`Transfer::analyze`](transfer::Transfer::analyze))
//!   is strict and returns [`Error`] before touching anything
//! - transfer execution collects per-file failures into the outcome and
//!   keeps going
//!
//! ## Example
//!
//! ```no_run
//! use drivefind::{Finder, SearchOptions};
//!
//! let finder = Finder::new().expect("no discovery strategy for this OS");
//! for path in finder.search(&SearchOptions::default()) {
//!     println!("{:>4}  {}", path.score, path.path);
//! }
//! ```
//!
//! ## Platform support
//!
//! macOS and Windows. Construction fails with
//! [`Error::UnsupportedPlatform`] elsewhere, though tests (and unusual
//! callers) can inject their own adapter via [`Finder::with_adapter`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Platform discovery strategies and their factory.
pub mod adapter;
/// Error types for discovery and transfer operations.
pub mod error;
/// Result filtering and fuzzy app-name matching.
pub mod filter;
/// App-storage directory name parsing.
pub mod identity;
/// The deduplicating path registry.
pub mod registry;
/// Path evaluation and scoring.
pub mod score;
/// Transfer planning and execution.
pub mod transfer;
/// Core data model.
pub mod types;

pub use adapter::{DiscoveryAdapter, Platform};
pub use error::{Error, Result};
pub use filter::SearchOptions;
pub use score::ScoreConfig;
pub use transfer::{CopyOutcome, CopyRequest, Transfer, TransferPlan};
pub use types::{AppIdentity, PathInfo, PathKind, PathSource};

/// High-level entry point for discovery.
///
/// A finder owns one adapter and runs it against a fresh registry on every
/// [`find`](Self::find) call; nothing persists between calls. Construct one
/// explicitly and pass it where needed — there is no process-wide instance.
pub struct Finder {
    adapter: Box<dyn DiscoveryAdapter>,
    config: ScoreConfig,
}

impl Finder {
    /// Create a finder for the running platform.
    ///
    /// Returns [`Error::UnsupportedPlatform`] when the host OS has no
    /// discovery strategy.
    pub fn new() -> Result<Self> {
        Ok(Self {
            adapter: adapter::detect()?,
            config: ScoreConfig::default(),
        })
    }

    /// Create a finder for an explicitly chosen platform.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            adapter: adapter::for_platform(platform),
            config: ScoreConfig::default(),
        }
    }

    /// Create a finder with a custom adapter (useful for testing).
    pub fn with_adapter(adapter: Box<dyn DiscoveryAdapter>) -> Self {
        Self {
            adapter,
            config: ScoreConfig::default(),
        }
    }

    /// Replace the scoring configuration.
    pub fn with_score_config(mut self, config: ScoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Run discovery from scratch and return candidates ranked by
    /// descending score, non-positive scores dropped.
    pub fn find(&self) -> Vec<PathInfo> {
        let mut registry = registry::PathRegistry::with_config(self.config);
        self.adapter.discover(&mut registry);
        let ranked = registry.into_ranked();
        log::debug!("discovery produced {} candidate(s)", ranked.len());
        ranked
    }

    /// Run discovery and apply search filtering in one step.
    pub fn search(&self, options: &SearchOptions) -> Vec<PathInfo> {
        filter::filter(self.find(), options)
    }
}
