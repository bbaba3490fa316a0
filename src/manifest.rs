//! Manifest (sources.json) loading and writing
//!
//! A manifest records the last-synced upstream version of a package together
//! with the download URL and SRI hash of every artifact. It is only ever
//! rewritten in full: the new content goes to a sibling temporary file which is
//! then renamed over the original.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ManifestError;
use crate::package::Platform;

/// Download location and content hash of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub hash: String,
}

/// Artifact sources of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sources {
    Platforms {
        platforms: IndexMap<Platform, Source>,
    },
    Single(Source),
}

/// Full manifest content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(flatten)]
    pub sources: Sources,
}

/// Only the part of a manifest needed to decide whether to sync
#[derive(Debug, Deserialize)]
struct RecordedVersion {
    #[serde(default)]
    version: Option<String>,
}

/// A manifest file on disk
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_to_string(&self) -> Result<String, ManifestError> {
        std::fs::read_to_string(&self.path).map_err(|source| ManifestError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn parse_error(&self, source: serde_json::Error) -> ManifestError {
        ManifestError::Parse {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads the recorded version; `None` when the manifest has none yet
    pub fn read_version(&self) -> Result<Option<String>, ManifestError> {
        let content = self.read_to_string()?;
        let recorded: RecordedVersion =
            serde_json::from_str(&content).map_err(|e| self.parse_error(e))?;
        Ok(recorded.version)
    }

    pub fn read(&self) -> Result<Manifest, ManifestError> {
        let content = self.read_to_string()?;
        serde_json::from_str(&content).map_err(|e| self.parse_error(e))
    }

    /// Overwrites the manifest with pretty-printed JSON and a trailing newline
    pub fn write(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let mut content = serde_json::to_string_pretty(manifest)?;
        content.push('\n');

        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        let io_err = |path: &Path, source: std::io::Error| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&tmp, content).map_err(|e| io_err(tmp.as_path(), e))?;

        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(self.path.as_path(), e));
        }

        debug!("Wrote manifest {:?}", self.path);
        Ok(())
    }
}
