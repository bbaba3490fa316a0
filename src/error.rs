use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to access manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} produced no output")]
    EmptyOutput { program: String },

    #[error("Invalid SHA-256 digest: {0}")]
    InvalidDigest(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Checksum not found for {filename}")]
    ChecksumNotFound { filename: String },

    #[error("Asset {filename} not found in latest {package} release")]
    AssetNotFound { package: String, filename: String },
}
