//! Keeps package manifests in step with upstream GitHub releases
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Release   │────▶│   Syncer    │────▶│  Manifest   │
//! │  (GitHub)   │     │ (per pkg)   │     │ (JSON file) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │    Tools    │
//!                     │ (hash, nix) │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Runtime configuration and built-in package tables
//! - [`package`]: Per-package sync configuration (platforms, templates, strategy)
//! - [`release`]: Latest-release lookup against the GitHub API
//! - [`manifest`]: Manifest loading and atomic rewriting
//! - [`checksum`]: Parsing of `sha256sums`-style checksum listings
//! - [`tools`]: External hashing utilities behind injectable traits
//! - [`sync`]: The version-sync orchestrator
//! - [`semver`]: Version ordering helpers
//! - [`logging`]: Tracing subscriber setup
//! - [`error`]: Error types for every layer

pub mod checksum;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod package;
pub mod release;
pub mod semver;
pub mod sync;
pub mod tools;
