//! Nix command-line implementations of the tool traits

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::error::ToolError;
use crate::tools::{Formatter, HashConverter, Prefetcher};

/// Runs a command and returns its trimmed standard output
async fn run_capture(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String, ToolError> {
    debug!("Running {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn last_line(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// `nix hash convert --hash-algo sha256 <digest>`
pub struct NixHashConverter {
    program: String,
}

impl NixHashConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NixHashConverter {
    fn default() -> Self {
        Self::new("nix")
    }
}

#[async_trait::async_trait]
impl HashConverter for NixHashConverter {
    async fn to_sri(&self, digest: &str) -> Result<String, ToolError> {
        let stdout = run_capture(
            &self.program,
            &["hash", "convert", "--hash-algo", "sha256", digest],
            None,
        )
        .await?;

        last_line(&stdout)
            .map(str::to_string)
            .ok_or_else(|| ToolError::EmptyOutput {
                program: self.program.clone(),
            })
    }
}

/// `nix-prefetch-url --type sha256 [--unpack] <url>`
pub struct NixPrefetcher {
    program: String,
}

impl NixPrefetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NixPrefetcher {
    fn default() -> Self {
        Self::new("nix-prefetch-url")
    }
}

#[async_trait::async_trait]
impl Prefetcher for NixPrefetcher {
    async fn prefetch(&self, url: &str, unpack: bool) -> Result<String, ToolError> {
        let mut args = vec!["--type", "sha256"];
        if unpack {
            args.push("--unpack");
        }
        args.push(url);

        let stdout = run_capture(&self.program, &args, None).await?;

        // The digest is printed last; progress may precede it
        last_line(&stdout)
            .map(str::to_string)
            .ok_or_else(|| ToolError::EmptyOutput {
                program: self.program.clone(),
            })
    }
}

/// Runs a configured command (e.g. `nix fmt`) in the overlay root
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Returns `None` for an empty command line
    pub fn new(argv: Vec<String>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait::async_trait]
impl Formatter for CommandFormatter {
    async fn format(&self, root: &Path) -> Result<(), ToolError> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();

        run_capture(&self.program, &args, Some(root)).await?;
        Ok(())
    }
}
