use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use kanata_sync::config::{HashConverterKind, SyncConfig};
use kanata_sync::logging::{self, LogFormat};
use kanata_sync::release::GitHubReleases;
use kanata_sync::sync::{SyncOutcome, Syncer};
use kanata_sync::tools::{
    CommandFormatter, HashConverter, NixHashConverter, NixPrefetcher, SriHashConverter,
};

#[derive(Parser)]
#[command(name = "kanata-sync")]
#[command(version, about = "Sync overlay manifests with upstream GitHub releases")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Overlay root that manifest paths are relative to
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to $XDG_CONFIG_HOME/kanata-sync/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resolve everything but do not write manifests
    #[arg(long, global = true)]
    dry_run: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Update the kanata manifest from the release's sha256sums listing
    Sync,
    /// Update every configured package, then run the formatter
    SyncAll {
        /// Skip the final formatting pass
        #[arg(long)]
        no_format: bool,
    },
}

fn build_syncer(cli: &Cli, config: &SyncConfig, format: bool) -> anyhow::Result<Syncer> {
    let releases = GitHubReleases::from_config(&config.github)
        .context("Failed to create GitHub client")?;
    let converter: Arc<dyn HashConverter> = match config.tools.hash_converter {
        HashConverterKind::Nix => Arc::new(NixHashConverter::default()),
        HashConverterKind::Builtin => Arc::new(SriHashConverter),
    };

    let mut syncer = Syncer::new(
        Arc::new(releases),
        converter,
        Arc::new(NixPrefetcher::default()),
        &cli.root,
    )
    .with_dry_run(cli.dry_run);

    if format && let Some(formatter) = CommandFormatter::new(config.tools.format_command.clone()) {
        syncer = syncer.with_formatter(Arc::new(formatter));
    }

    Ok(syncer)
}

fn report(name: &str, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::UpToDate { version } => info!("{}: up to date at {}", name, version),
        SyncOutcome::Updated {
            previous,
            manifest,
            sources_changed,
            written,
        } => info!(
            "{}: {} -> {}{}{}",
            name,
            previous.as_deref().unwrap_or("none"),
            manifest.version,
            if *sources_changed { "" } else { ", artifacts unchanged" },
            if *written { "" } else { " (dry run)" }
        ),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SyncConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Sync => {
            let syncer = build_syncer(&cli, &config, false)?;
            let outcome = syncer.sync_package(&config.single).await?;
            report(&config.single.name, &outcome);
        }
        Command::SyncAll { no_format } => {
            let syncer = build_syncer(&cli, &config, !no_format)?;
            let reports = syncer.sync_all(&config.packages).await?;
            for entry in &reports {
                report(&entry.name, &entry.outcome);
            }
        }
    }

    info!("Done!");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
