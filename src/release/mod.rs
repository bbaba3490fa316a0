//! Latest-release lookup for upstream repositories

pub mod github;

pub use github::GitHubReleases;

#[cfg(test)]
use mockall::automock;

use crate::error::ReleaseError;

/// A release asset attached to a published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub download_url: String,
}

/// The latest published release of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Tag exactly as published (e.g. "v1.9.0")
    pub tag: String,
    /// Tag with the leading `v` stripped (e.g. "1.9.0")
    pub version: String,
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn new(tag: impl Into<String>, assets: Vec<Asset>) -> Self {
        let tag = tag.into();
        Self {
            version: normalize_version(&tag).to_string(),
            tag,
            assets,
        }
    }

    /// Finds an asset by exact name
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Strips exactly one leading `v` from a tag
///
/// Examples:
/// - "v1.2.3" -> "1.2.3"
/// - "1.2.3" -> "1.2.3"
/// - "vv1.2.3" -> "v1.2.3"
pub fn normalize_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Source of upstream release information
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the latest published release
    ///
    /// # Arguments
    /// * `repo` - Repository as `owner/name` (e.g., "jtroo/kanata")
    async fn latest_release(&self, repo: &str) -> Result<Release, ReleaseError>;

    /// Downloads a text asset (e.g. a checksum listing)
    async fn fetch_text(&self, url: &str) -> Result<String, ReleaseError>;

    /// Builds the direct download URL for a release asset
    fn download_url(&self, repo: &str, tag: &str, filename: &str) -> String;
}
