//! Artifact resolution per acquisition strategy

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::checksum::ChecksumListing;
use crate::error::SyncError;
use crate::manifest::{Source, Sources};
use crate::package::{Acquisition, Artifacts, PackageConfig};
use crate::release::Release;
use crate::sync::Syncer;

/// Where digests come from, decided once per package
enum Digests {
    Listing(ChecksumListing),
    Prefetch { unpack: bool },
}

struct ArtifactResolver<'a> {
    syncer: &'a Syncer,
    package: &'a PackageConfig,
    release: &'a Release,
    /// Path segment of `releases/download/<tag>/`, always `<prefix><version>`
    tag: String,
    digests: Digests,
}

impl<'a> ArtifactResolver<'a> {
    async fn prepare(
        syncer: &'a Syncer,
        package: &'a PackageConfig,
        release: &'a Release,
    ) -> Result<Self, SyncError> {
        let tag = package.version_label(&release.version);
        let digests = match &package.acquisition {
            Acquisition::BulkListing { listing } => {
                let url = syncer.releases.download_url(&package.repo, &tag, listing);
                info!("Fetching {}...", listing);
                let text = syncer.releases.fetch_text(&url).await?;
                let checksums = ChecksumListing::parse(&text);
                debug!("{} lists {} checksums", listing, checksums.len());
                Digests::Listing(checksums)
            }
            Acquisition::PerArtifactPrefetch { unpack } => Digests::Prefetch { unpack: *unpack },
        };

        Ok(Self {
            syncer,
            package,
            release,
            tag,
            digests,
        })
    }

    async fn resolve(&self, filename: &str) -> Result<Source, SyncError> {
        let (url, digest) = match &self.digests {
            Digests::Listing(checksums) => {
                let digest =
                    checksums
                        .get(filename)
                        .ok_or_else(|| SyncError::ChecksumNotFound {
                            filename: filename.to_string(),
                        })?;
                let url =
                    self.syncer
                        .releases
                        .download_url(&self.package.repo, &self.tag, filename);
                (url, digest.to_string())
            }
            Digests::Prefetch { unpack } => {
                let asset =
                    self.release
                        .asset(filename)
                        .ok_or_else(|| SyncError::AssetNotFound {
                            package: self.package.name.clone(),
                            filename: filename.to_string(),
                        })?;
                debug!("Prefetching {}", asset.download_url);
                let digest = self
                    .syncer
                    .prefetcher
                    .prefetch(&asset.download_url, *unpack)
                    .await?;
                (asset.download_url.clone(), digest)
            }
        };

        let hash = self.syncer.converter.to_sri(&digest).await?;
        Ok(Source { url, hash })
    }
}

/// Resolves URL and SRI hash for every artifact of `package` at `release`.
///
/// Fails on the first artifact that cannot be resolved.
pub(crate) async fn resolve_sources(
    syncer: &Syncer,
    package: &PackageConfig,
    release: &Release,
) -> Result<Sources, SyncError> {
    let resolver = ArtifactResolver::prepare(syncer, package, release).await?;

    match &package.artifacts {
        Artifacts::Platforms { platforms } => {
            let mut resolved = IndexMap::with_capacity(platforms.len());
            for (platform, template) in platforms {
                let filename = package.filename(template, &release.version);
                let source = resolver.resolve(&filename).await?;
                info!("  {}: {}", platform, source.hash);
                resolved.insert(*platform, source);
            }
            Ok(Sources::Platforms {
                platforms: resolved,
            })
        }
        Artifacts::Single { file } => {
            let filename = package.filename(file, &release.version);
            let source = resolver.resolve(&filename).await?;
            info!("  {}: {}", filename, source.hash);
            Ok(Sources::Single(source))
        }
    }
}
