//! External hashing and formatting utilities
//!
//! The sync logic never spawns processes directly; it talks to these traits so
//! tests can substitute fakes.

pub mod nix;
pub mod sri;

pub use nix::{CommandFormatter, NixHashConverter, NixPrefetcher};
pub use sri::SriHashConverter;

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::error::ToolError;

/// Converts a SHA-256 digest into the portable SRI representation
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait HashConverter: Send + Sync {
    /// Returns e.g. "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
    async fn to_sri(&self, digest: &str) -> Result<String, ToolError>;
}

/// Downloads a URL and returns its SHA-256 digest
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Prefetcher: Send + Sync {
    /// # Arguments
    /// * `url` - Artifact download URL
    /// * `unpack` - Hash the unpacked archive contents instead of the file
    async fn prefetch(&self, url: &str, unpack: bool) -> Result<String, ToolError>;
}

/// Formats the overlay after manifests have been rewritten
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Formatter: Send + Sync {
    async fn format(&self, root: &Path) -> Result<(), ToolError>;
}

/// Formatter that does nothing
pub struct NoopFormatter;

#[async_trait::async_trait]
impl Formatter for NoopFormatter {
    async fn format(&self, _root: &Path) -> Result<(), ToolError> {
        Ok(())
    }
}
