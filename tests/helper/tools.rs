//! In-memory stand-ins for the external Nix tools

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use kanata_sync::error::ToolError;
use kanata_sync::tools::{Formatter, Prefetcher};

/// Prefetcher answering from a fixed URL to digest table
#[derive(Default)]
pub struct FakePrefetcher {
    digests: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakePrefetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_digest(mut self, url: &str, digest: &str) -> Self {
        self.digests.insert(url.to_string(), digest.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prefetcher for FakePrefetcher {
    async fn prefetch(&self, url: &str, _unpack: bool) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.digests
            .get(url)
            .cloned()
            .ok_or_else(|| ToolError::EmptyOutput {
                program: format!("fake prefetch {}", url),
            })
    }
}

/// Formatter counting its invocations
#[derive(Default)]
pub struct CountingFormatter {
    pub runs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl Formatter for CountingFormatter {
    async fn format(&self, root: &Path) -> Result<(), ToolError> {
        self.runs.lock().unwrap().push(root.to_path_buf());
        Ok(())
    }
}
