use crate::error::{Error, Result};
use crate::registry::PathRegistry;

pub mod macos;
pub mod windows;

/// Discovery strategy for one platform.
///
/// Implementations probe well-known locations and feed every candidate into
/// the registry. Discovery is best-effort by contract: probe failures are
/// logged and skipped, never surfaced to the caller.
pub trait DiscoveryAdapter: Send + Sync {
    /// Probe the host and merge candidates into the registry.
    fn discover(&self, registry: &mut PathRegistry);
}

/// Platforms with a discovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS: `Mobile Documents` trees and sandbox containers
    MacOs,
    /// Windows: `iCloudDrive` folders and the registry
    Windows,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn detect() -> Option<Self> {
        match std::env::consts::OS {
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// Build the adapter for an explicitly chosen platform.
pub fn for_platform(platform: Platform) -> Box<dyn DiscoveryAdapter> {
    match platform {
        Platform::MacOs => Box::new(macos::MacosAdapter::new()),
        Platform::Windows => Box::new(windows::WindowsAdapter::new()),
    }
}

/// Build the adapter for the running platform.
///
/// Returns [`Error::UnsupportedPlatform`] when there is no strategy for the
/// host OS.
pub fn detect() -> Result<Box<dyn DiscoveryAdapter>> {
    Platform::detect()
        .map(for_platform)
        .ok_or_else(|| Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
}
