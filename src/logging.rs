//! Tracing subscriber setup for the command-line tool

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Output format for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Builds the filter from `RUST_LOG`, defaulting to `info` (`debug` when verbose)
fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber writing to stderr
pub fn init(format: LogFormat, verbose: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.without_time().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
