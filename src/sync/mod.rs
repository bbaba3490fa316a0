//! Version-sync orchestration
//!
//! For every package the [`Syncer`] compares the version recorded in the
//! manifest with the latest upstream release. When they differ it resolves a
//! URL and SRI hash for every artifact and rewrites the manifest in one go.
//! Any failure before the write leaves the manifest untouched.
//!
//! - [`package`]: single-package flow
//! - [`all`]: sequential multi-package flow with the final formatting pass
//! - [`acquire`]: per-strategy artifact resolution

mod acquire;
pub mod all;
pub mod package;

pub use all::PackageReport;

use std::path::PathBuf;
use std::sync::Arc;

use crate::manifest::Manifest;
use crate::release::ReleaseSource;
use crate::tools::{Formatter, HashConverter, NoopFormatter, Prefetcher};

/// Result of syncing one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Recorded version equals the latest upstream version; nothing written
    UpToDate { version: String },
    /// A new manifest was assembled (and written unless running dry)
    Updated {
        previous: Option<String>,
        manifest: Manifest,
        /// False when only the version moved and every URL and hash matches
        sources_changed: bool,
        written: bool,
    },
}

/// Runs the sync protocol with injected release source and tools
pub struct Syncer {
    releases: Arc<dyn ReleaseSource>,
    converter: Arc<dyn HashConverter>,
    prefetcher: Arc<dyn Prefetcher>,
    formatter: Arc<dyn Formatter>,
    root: PathBuf,
    dry_run: bool,
}

impl Syncer {
    /// Creates a syncer whose manifest paths are resolved against `root`
    pub fn new(
        releases: Arc<dyn ReleaseSource>,
        converter: Arc<dyn HashConverter>,
        prefetcher: Arc<dyn Prefetcher>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            releases,
            converter,
            prefetcher,
            formatter: Arc::new(NoopFormatter),
            root: root.into(),
            dry_run: false,
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Resolve everything but skip manifest writes and formatting
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
