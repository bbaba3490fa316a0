//! Multi-package sync flow

use tracing::info;

use crate::error::SyncError;
use crate::package::PackageConfig;
use crate::sync::{SyncOutcome, Syncer};

/// Outcome of one package in a multi-package run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub name: String,
    pub outcome: SyncOutcome,
}

impl Syncer {
    /// Syncs packages one after another, then runs the formatter once.
    ///
    /// The first failing package aborts the run; packages after it are not
    /// attempted and the formatter does not run.
    pub async fn sync_all(
        &self,
        packages: &[PackageConfig],
    ) -> Result<Vec<PackageReport>, SyncError> {
        let mut reports = Vec::with_capacity(packages.len());

        for package in packages {
            info!("Checking {} ({})", package.name, package.repo);
            let outcome = self.sync_package(package).await?;
            reports.push(PackageReport {
                name: package.name.clone(),
                outcome,
            });
        }

        if self.dry_run {
            info!("Dry run: skipping formatter");
        } else {
            info!("Formatting {}", self.root.display());
            self.formatter.format(&self.root).await?;
        }

        Ok(reports)
    }
}
