//! Overlay and GitHub response fixtures

use std::path::{Path, PathBuf};

/// SHA-256 of the empty string
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
/// Same digest as printed by `nix-prefetch-url`
pub const EMPTY_NIX32: &str = "0mdqa9w1p6cmli6976v4wi0sw9r4p5prkj7lzfd1877wk11c9c73";
pub const EMPTY_SRI: &str = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=";

/// SHA-256 of "abc"
pub const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
pub const ABC_NIX32: &str = "1b8m03r63zqhnjf7l5wnldhh7c134ap5vpj0850ymkq1iyzicy5s";
pub const ABC_SRI: &str = "sha256-ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=";

/// Writes a manifest below `root` and returns its path
pub fn seed_manifest(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// Body of a releases/latest response
pub fn release_body(tag: &str, assets: &[(&str, String)]) -> String {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, url)| serde_json::json!({ "name": name, "browser_download_url": url }))
        .collect();
    serde_json::json!({ "tag_name": tag, "assets": assets }).to_string()
}

/// kanata's sha256sums for 1.9.0 with the given digests per platform
pub fn kanata_listing(linux: &str, macos_x64: &str, macos_arm64: &str) -> String {
    format!(
        "{linux}  kanata-linux-binaries-v1.9.0-x64.zip\n\
         {macos_x64}  kanata-macos-binaries-x64-v1.9.0.zip\n\
         {macos_arm64}  kanata-macos-binaries-arm64-v1.9.0.zip\n\
         {EMPTY_SHA256}  kanata-windows-binaries-x64-v1.9.0.zip\n"
    )
}
