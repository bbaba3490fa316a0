//! Single-package sync flow

use tracing::{info, warn};

use crate::error::SyncError;
use crate::manifest::{Manifest, ManifestFile};
use crate::package::PackageConfig;
use crate::semver::{CompareResult, compare_versions};
use crate::sync::{SyncOutcome, Syncer, acquire};

impl Syncer {
    /// Brings one package's manifest up to the latest upstream release.
    ///
    /// The manifest is written only after every artifact resolved; on any
    /// error it is left byte-for-byte unchanged.
    pub async fn sync_package(&self, package: &PackageConfig) -> Result<SyncOutcome, SyncError> {
        let manifest_file = ManifestFile::new(self.root.join(&package.manifest));
        let current = manifest_file.read_version()?;
        let release = self.releases.latest_release(&package.repo).await?;

        info!(
            "{}: current version: {}",
            package.name,
            current.as_deref().unwrap_or("none")
        );
        info!("{}: latest version: {}", package.name, release.version);

        if current.as_deref() == Some(release.version.as_str()) {
            info!("{}: already up to date", package.name);
            return Ok(SyncOutcome::UpToDate {
                version: release.version,
            });
        }

        if let Some(current) = &current
            && compare_versions(current, &release.version) == CompareResult::Downgrade
        {
            warn!(
                "{}: upstream {} is older than recorded {}",
                package.name, release.version, current
            );
        }

        info!(
            "Updating {} from {} to {}",
            package.name,
            current.as_deref().unwrap_or("none"),
            release.version
        );

        let sources = acquire::resolve_sources(self, package, &release).await?;
        let manifest = Manifest {
            version: release.version.clone(),
            sources,
        };

        // A manifest without typed sources (e.g. first run) counts as changed
        let sources_changed = manifest_file
            .read()
            .map(|existing| existing.sources != manifest.sources)
            .unwrap_or(true);

        if self.dry_run {
            info!(
                "Dry run: not writing {} (sources {})",
                manifest_file.path().display(),
                if sources_changed { "changed" } else { "unchanged" }
            );
        } else {
            manifest_file.write(&manifest)?;
            info!("Updated {} to version {}", package.name, release.version);
        }

        Ok(SyncOutcome::Updated {
            previous: current,
            manifest,
            sources_changed,
            written: !self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use mockall::predicate::{always, eq};
    use tempfile::TempDir;

    use crate::config::kanata_package;
    use crate::manifest::{Source, Sources};
    use crate::package::{Acquisition, Artifacts, FilenameTemplate, Platform};
    use crate::release::{Asset, Release};
    use crate::sync::testing::FakeReleases;
    use crate::tools::{MockHashConverter, MockPrefetcher};

    const KANATA_LISTING: &str = "\
aaa111 kanata-linux-binaries-v1.9.0-x64.zip
bbb222 kanata-macos-binaries-x64-v1.9.0.zip
ccc333 kanata-macos-binaries-arm64-v1.9.0.zip
";

    fn write_manifest(root: &Path, relative: &str, content: &str) -> std::path::PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn echo_converter() -> MockHashConverter {
        let mut converter = MockHashConverter::new();
        converter
            .expect_to_sri()
            .returning(|digest| Ok(format!("sha256-{}", digest)));
        converter
    }

    fn unused_prefetcher() -> MockPrefetcher {
        let mut prefetcher = MockPrefetcher::new();
        prefetcher.expect_prefetch().never();
        prefetcher
    }

    fn two_platform_package() -> crate::package::PackageConfig {
        let mut package = kanata_package();
        package.artifacts = Artifacts::Platforms {
            platforms: indexmap::IndexMap::from([
                (
                    Platform::X86_64Linux,
                    FilenameTemplate::new("kanata-linux-binaries-VERSION-x64.zip"),
                ),
                (
                    Platform::Aarch64Darwin,
                    FilenameTemplate::new("kanata-macos-binaries-arm64-VERSION.zip"),
                ),
            ]),
        };
        package
    }

    #[tokio::test]
    async fn sync_package_is_noop_when_versions_match() {
        let temp_dir = TempDir::new().unwrap();
        let original = r#"{"version":"1.9.0","platforms":{}}"#;
        let path = write_manifest(temp_dir.path(), "kanata/sources.json", original);

        let mut converter = MockHashConverter::new();
        converter.expect_to_sri().never();
        let releases = FakeReleases::new().with_release("jtroo/kanata", Release::new("v1.9.0", vec![]));
        let syncer = Syncer::new(
            Arc::new(releases),
            Arc::new(converter),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let outcome = syncer.sync_package(&kanata_package()).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::UpToDate {
                version: "1.9.0".to_string()
            }
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), original);
    }

    #[tokio::test]
    async fn sync_package_writes_manifest_from_bulk_listing() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(
            temp_dir.path(),
            "kanata/sources.json",
            r#"{"version":"1.8.0","platforms":{}}"#,
        );

        let releases = FakeReleases::new()
            .with_release("jtroo/kanata", Release::new("v1.9.0", vec![]))
            .with_text(
                "https://github.com/jtroo/kanata/releases/download/v1.9.0/sha256sums",
                KANATA_LISTING,
            );
        let syncer = Syncer::new(
            Arc::new(releases),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let outcome = syncer.sync_package(&two_platform_package()).await.unwrap();

        let SyncOutcome::Updated {
            previous,
            manifest,
            sources_changed,
            written,
        } = outcome
        else {
            panic!("expected update");
        };
        assert_eq!(previous.as_deref(), Some("1.8.0"));
        assert!(written);
        assert!(sources_changed);
        assert_eq!(manifest.version, "1.9.0");
        assert_eq!(
            manifest.sources,
            Sources::Platforms {
                platforms: indexmap::IndexMap::from([
                    (
                        Platform::X86_64Linux,
                        Source {
                            url: "https://github.com/jtroo/kanata/releases/download/v1.9.0/kanata-linux-binaries-v1.9.0-x64.zip".to_string(),
                            hash: "sha256-aaa111".to_string(),
                        },
                    ),
                    (
                        Platform::Aarch64Darwin,
                        Source {
                            url: "https://github.com/jtroo/kanata/releases/download/v1.9.0/kanata-macos-binaries-arm64-v1.9.0.zip".to_string(),
                            hash: "sha256-ccc333".to_string(),
                        },
                    ),
                ]),
            }
        );
        assert_eq!(ManifestFile::new(path).read().unwrap(), manifest);
    }

    #[tokio::test]
    async fn sync_package_uses_version_label_for_untagged_release() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(
            temp_dir.path(),
            "kanata/sources.json",
            r#"{"version":"1.8.0","platforms":{}}"#,
        );

        // Upstream published "1.9.0" with no leading v
        let releases = FakeReleases::new()
            .with_release("jtroo/kanata", Release::new("1.9.0", vec![]))
            .with_text(
                "https://github.com/jtroo/kanata/releases/download/v1.9.0/sha256sums",
                KANATA_LISTING,
            );
        let syncer = Syncer::new(
            Arc::new(releases),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let outcome = syncer.sync_package(&two_platform_package()).await.unwrap();

        let SyncOutcome::Updated { manifest, .. } = outcome else {
            panic!("expected update");
        };
        assert_eq!(manifest.version, "1.9.0");
        let Sources::Platforms { platforms } = manifest.sources else {
            panic!("expected platform sources");
        };
        assert_eq!(
            platforms[&Platform::X86_64Linux].url,
            "https://github.com/jtroo/kanata/releases/download/v1.9.0/kanata-linux-binaries-v1.9.0-x64.zip"
        );
        assert_eq!(
            platforms[&Platform::Aarch64Darwin].url,
            "https://github.com/jtroo/kanata/releases/download/v1.9.0/kanata-macos-binaries-arm64-v1.9.0.zip"
        );
    }

    #[tokio::test]
    async fn sync_package_leaves_manifest_unchanged_when_checksum_missing() {
        let temp_dir = TempDir::new().unwrap();
        let original = r#"{"version":"1.8.0","platforms":{}}"#;
        let path = write_manifest(temp_dir.path(), "kanata/sources.json", original);

        let releases = FakeReleases::new()
            .with_release("jtroo/kanata", Release::new("v1.9.0", vec![]))
            .with_text(
                "https://github.com/jtroo/kanata/releases/download/v1.9.0/sha256sums",
                "aaa111 kanata-linux-binaries-v1.9.0-x64.zip\n",
            );
        let syncer = Syncer::new(
            Arc::new(releases),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let result = syncer.sync_package(&two_platform_package()).await;

        assert!(matches!(
            result,
            Err(SyncError::ChecksumNotFound { ref filename })
                if filename == "kanata-macos-binaries-arm64-v1.9.0.zip"
        ));
        assert_eq!(std::fs::read_to_string(path).unwrap(), original);
    }

    #[tokio::test]
    async fn sync_package_prefetches_release_assets() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(
            temp_dir.path(),
            "kanata/sources.json",
            r#"{"version":null}"#,
        );

        let linux_url = "https://example.com/dl/kanata-linux-binaries-v1.9.0-x64.zip";
        let darwin_url = "https://example.com/dl/kanata-macos-binaries-arm64-v1.9.0.zip";
        let release = Release::new(
            "v1.9.0",
            vec![
                Asset {
                    name: "kanata-linux-binaries-v1.9.0-x64.zip".to_string(),
                    download_url: linux_url.to_string(),
                },
                Asset {
                    name: "kanata-macos-binaries-arm64-v1.9.0.zip".to_string(),
                    download_url: darwin_url.to_string(),
                },
            ],
        );

        let mut prefetcher = MockPrefetcher::new();
        prefetcher
            .expect_prefetch()
            .with(eq(linux_url), eq(true))
            .times(1)
            .returning(|_, _| Ok("linuxdigest".to_string()));
        prefetcher
            .expect_prefetch()
            .with(eq(darwin_url), always())
            .times(1)
            .returning(|_, _| Ok("darwindigest".to_string()));

        let mut package = two_platform_package();
        package.acquisition = Acquisition::PerArtifactPrefetch { unpack: true };

        let syncer = Syncer::new(
            Arc::new(FakeReleases::new().with_release("jtroo/kanata", release)),
            Arc::new(echo_converter()),
            Arc::new(prefetcher),
            temp_dir.path(),
        );

        let outcome = syncer.sync_package(&package).await.unwrap();

        let SyncOutcome::Updated {
            previous, manifest, ..
        } = outcome
        else {
            panic!("expected update");
        };
        assert_eq!(previous, None);
        let Sources::Platforms { platforms } = manifest.sources else {
            panic!("expected platform sources");
        };
        assert_eq!(platforms[&Platform::X86_64Linux].url, linux_url);
        assert_eq!(platforms[&Platform::X86_64Linux].hash, "sha256-linuxdigest");
        assert_eq!(platforms[&Platform::Aarch64Darwin].url, darwin_url);
        assert_eq!(
            platforms[&Platform::Aarch64Darwin].hash,
            "sha256-darwindigest"
        );
    }

    #[tokio::test]
    async fn sync_package_fails_when_asset_missing() {
        let temp_dir = TempDir::new().unwrap();
        let original = r#"{"version":"1.8.0"}"#;
        let path = write_manifest(temp_dir.path(), "kanata/sources.json", original);

        let mut package = two_platform_package();
        package.acquisition = Acquisition::PerArtifactPrefetch { unpack: false };

        let syncer = Syncer::new(
            Arc::new(
                FakeReleases::new().with_release("jtroo/kanata", Release::new("v1.9.0", vec![])),
            ),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let result = syncer.sync_package(&package).await;

        assert!(matches!(
            result,
            Err(SyncError::AssetNotFound { ref package, ref filename })
                if package == "kanata" && filename == "kanata-linux-binaries-v1.9.0-x64.zip"
        ));
        assert_eq!(std::fs::read_to_string(path).unwrap(), original);
    }

    #[tokio::test]
    async fn sync_package_writes_flat_manifest_for_single_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_manifest(
            temp_dir.path(),
            "driver/sources.json",
            r#"{"version":"6.1.0","url":"old","hash":"old"}"#,
        );

        let package = crate::package::PackageConfig {
            name: "driver".to_string(),
            repo: "example/driver".to_string(),
            manifest: "driver/sources.json".into(),
            acquisition: Acquisition::PerArtifactPrefetch { unpack: false },
            artifacts: Artifacts::Single {
                file: FilenameTemplate::new("driver-VERSION.pkg"),
            },
            version_label_prefix: String::new(),
        };
        let release = Release::new(
            "v6.2.0",
            vec![Asset {
                name: "driver-6.2.0.pkg".to_string(),
                download_url: "https://example.com/driver-6.2.0.pkg".to_string(),
            }],
        );
        let mut prefetcher = MockPrefetcher::new();
        prefetcher
            .expect_prefetch()
            .times(1)
            .returning(|_, _| Ok("pkgdigest".to_string()));

        let syncer = Syncer::new(
            Arc::new(FakeReleases::new().with_release("example/driver", release)),
            Arc::new(echo_converter()),
            Arc::new(prefetcher),
            temp_dir.path(),
        );

        syncer.sync_package(&package).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            r#"{
  "version": "6.2.0",
  "url": "https://example.com/driver-6.2.0.pkg",
  "hash": "sha256-pkgdigest"
}
"#
        );
    }

    #[tokio::test]
    async fn sync_package_dry_run_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let original = r#"{"version":"1.8.0","platforms":{}}"#;
        let path = write_manifest(temp_dir.path(), "kanata/sources.json", original);

        let releases = FakeReleases::new()
            .with_release("jtroo/kanata", Release::new("v1.9.0", vec![]))
            .with_text(
                "https://github.com/jtroo/kanata/releases/download/v1.9.0/sha256sums",
                KANATA_LISTING,
            );
        let syncer = Syncer::new(
            Arc::new(releases),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        )
        .with_dry_run(true);

        let outcome = syncer.sync_package(&kanata_package()).await.unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Updated {
                sources_changed: true,
                written: false,
                ..
            }
        ));
        assert_eq!(std::fs::read_to_string(path).unwrap(), original);
    }

    #[tokio::test]
    async fn sync_package_dry_run_reports_unchanged_sources() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kanata/sources.json");
        let releases = FakeReleases::new()
            .with_release("jtroo/kanata", Release::new("v1.9.0", vec![]))
            .with_text(
                "https://github.com/jtroo/kanata/releases/download/v1.9.0/sha256sums",
                KANATA_LISTING,
            );
        let releases = Arc::new(releases);

        // Seed with what a real sync would write, then pretend it was recorded as 1.8.0
        let seeded = Syncer::new(
            releases.clone(),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );
        write_manifest(temp_dir.path(), "kanata/sources.json", r#"{"version":null}"#);
        let SyncOutcome::Updated { mut manifest, .. } =
            seeded.sync_package(&two_platform_package()).await.unwrap()
        else {
            panic!("expected update");
        };
        manifest.version = "1.8.0".to_string();
        ManifestFile::new(&path).write(&manifest).unwrap();
        let original = std::fs::read_to_string(&path).unwrap();

        let syncer = Syncer::new(
            releases,
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        )
        .with_dry_run(true);

        let outcome = syncer.sync_package(&two_platform_package()).await.unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Updated {
                sources_changed: false,
                written: false,
                ..
            }
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn sync_package_fails_for_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let syncer = Syncer::new(
            Arc::new(FakeReleases::new()),
            Arc::new(echo_converter()),
            Arc::new(unused_prefetcher()),
            temp_dir.path(),
        );

        let result = syncer.sync_package(&kanata_package()).await;

        assert!(matches!(result, Err(SyncError::Manifest(_))));
    }
}
