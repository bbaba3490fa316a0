use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::package::{Acquisition, Artifacts, FilenameTemplate, PackageConfig, Platform};

/// Default base URL for the GitHub REST API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default base URL for release asset downloads
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// User agent sent with every GitHub request
pub const USER_AGENT: &str = "kanata-overlay-update-script";

/// Environment variable consulted for a GitHub token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Checksum listing asset published with every kanata release
pub const KANATA_CHECKSUM_LISTING: &str = "sha256sums";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub github: GitHubConfig,
    pub tools: ToolsConfig,
    /// Package handled by the single-package flow
    pub single: PackageConfig,
    /// Packages handled, in order, by the multi-package flow
    pub packages: Vec<PackageConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            tools: ToolsConfig::default(),
            single: kanata_package(),
            packages: default_packages(),
        }
    }
}

/// GitHub endpoint configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub download_base_url: String,
    /// Falls back to `$GITHUB_TOKEN` when unset
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Returns the configured token, or the one from the environment
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(GITHUB_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }
}

/// Which implementation converts digests into SRI strings
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum HashConverterKind {
    /// `nix hash convert`
    #[default]
    Nix,
    /// In-process hex to base64 conversion
    Builtin,
}

/// External tool configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolsConfig {
    pub hash_converter: HashConverterKind,
    /// Command run once in the overlay root after the multi-package flow.
    /// Empty disables formatting.
    pub format_command: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            hash_converter: HashConverterKind::default(),
            format_command: vec!["nix".to_string(), "fmt".to_string()],
        }
    }
}

impl SyncConfig {
    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default config file is used
    /// when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!("No config file at {:?}, using defaults", path);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn kanata_platforms() -> IndexMap<Platform, FilenameTemplate> {
    IndexMap::from([
        (
            Platform::X86_64Linux,
            FilenameTemplate::new("kanata-linux-binaries-VERSION-x64.zip"),
        ),
        (
            Platform::X86_64Darwin,
            FilenameTemplate::new("kanata-macos-binaries-x64-VERSION.zip"),
        ),
        (
            Platform::Aarch64Darwin,
            FilenameTemplate::new("kanata-macos-binaries-arm64-VERSION.zip"),
        ),
    ])
}

/// The keyboard-remapping daemon, checked against its `sha256sums` listing
pub fn kanata_package() -> PackageConfig {
    PackageConfig {
        name: "kanata".to_string(),
        repo: "jtroo/kanata".to_string(),
        manifest: PathBuf::from("kanata/sources.json"),
        acquisition: Acquisition::BulkListing {
            listing: KANATA_CHECKSUM_LISTING.to_string(),
        },
        artifacts: Artifacts::Platforms {
            platforms: kanata_platforms(),
        },
        version_label_prefix: "v".to_string(),
    }
}

/// Packages synced by the multi-package flow, in run order
pub fn default_packages() -> Vec<PackageConfig> {
    vec![
        PackageConfig {
            acquisition: Acquisition::PerArtifactPrefetch { unpack: false },
            ..kanata_package()
        },
        PackageConfig {
            name: "kanata-tray".to_string(),
            repo: "rszyma/kanata-tray".to_string(),
            manifest: PathBuf::from("kanata-tray/sources.json"),
            acquisition: Acquisition::PerArtifactPrefetch { unpack: false },
            artifacts: Artifacts::Platforms {
                platforms: IndexMap::from([
                    (Platform::X86_64Linux, FilenameTemplate::new("kanata-tray")),
                    (
                        Platform::Aarch64Darwin,
                        FilenameTemplate::new("kanata-tray-macos"),
                    ),
                ]),
            },
            version_label_prefix: "v".to_string(),
        },
        PackageConfig {
            name: "karabiner-driverkit".to_string(),
            repo: "pqrs-org/Karabiner-DriverKit-VirtualHIDDevice".to_string(),
            manifest: PathBuf::from("karabiner-driverkit/sources.json"),
            acquisition: Acquisition::PerArtifactPrefetch { unpack: false },
            artifacts: Artifacts::Single {
                file: FilenameTemplate::new("Karabiner-DriverKit-VirtualHIDDevice-VERSION.pkg"),
            },
            version_label_prefix: String::new(),
        },
    ]
}

/// Returns the path to the default config file.
/// Uses $XDG_CONFIG_HOME/kanata-sync/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/kanata-sync/config.json,
/// or ./kanata-sync/config.json if neither is available.
pub fn config_path() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
        .join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("kanata-sync")
}
