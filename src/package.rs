//! Per-package sync configuration
//!
//! Each managed package is described by a plain [`PackageConfig`] record: which
//! repository to watch, where its manifest lives, which artifacts it ships and
//! how their checksums are acquired.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder replaced by the versioned label when resolving a filename
pub const VERSION_PLACEHOLDER: &str = "VERSION";

/// Default label prefix substituted in front of the bare version
pub const DEFAULT_VERSION_LABEL_PREFIX: &str = "v";

/// Target system an artifact is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "x86_64-linux")]
    X86_64Linux,
    #[serde(rename = "aarch64-linux")]
    Aarch64Linux,
    #[serde(rename = "x86_64-darwin")]
    X86_64Darwin,
    #[serde(rename = "aarch64-darwin")]
    Aarch64Darwin,
}

impl Platform {
    /// Returns the Nix system string for this platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X86_64Linux => "x86_64-linux",
            Platform::Aarch64Linux => "aarch64-linux",
            Platform::X86_64Darwin => "x86_64-darwin",
            Platform::Aarch64Darwin => "aarch64-darwin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release asset filename pattern containing a `VERSION` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitutes `VERSION` with a version label
    ///
    /// Examples:
    /// - "kanata-linux-binaries-VERSION-x64.zip" + "v1.9.0"
    ///   -> "kanata-linux-binaries-v1.9.0-x64.zip"
    pub fn resolve(&self, label: &str) -> String {
        self.0.replace(VERSION_PLACEHOLDER, label)
    }
}

/// How per-artifact checksums are obtained for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum Acquisition {
    /// One checksum listing asset per release, looked up by filename
    #[serde(rename_all = "camelCase")]
    BulkListing { listing: String },
    /// Each artifact URL is fetched and hashed by the prefetch utility
    #[serde(rename_all = "camelCase")]
    PerArtifactPrefetch {
        #[serde(default)]
        unpack: bool,
    },
}

/// Artifacts a package publishes per release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Artifacts {
    Platforms {
        platforms: IndexMap<Platform, FilenameTemplate>,
    },
    Single {
        file: FilenameTemplate,
    },
}

/// Immutable description of one managed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    pub name: String,
    /// Upstream repository as `owner/name`
    pub repo: String,
    /// Manifest path relative to the overlay root
    pub manifest: PathBuf,
    pub acquisition: Acquisition,
    pub artifacts: Artifacts,
    #[serde(default = "default_version_label_prefix")]
    pub version_label_prefix: String,
}

fn default_version_label_prefix() -> String {
    DEFAULT_VERSION_LABEL_PREFIX.to_string()
}

impl PackageConfig {
    /// `<prefix><version>`, the label used in filenames and download paths
    pub fn version_label(&self, version: &str) -> String {
        format!("{}{}", self.version_label_prefix, version)
    }

    /// Resolves the release asset filename for a template at `version`
    pub fn filename(&self, template: &FilenameTemplate, version: &str) -> String {
        template.resolve(&self.version_label(version))
    }
}
