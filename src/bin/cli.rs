//! Counselling crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use counsel_crawler::{
    error::{AppError, Result},
    models::Config,
    pipeline::{Pipeline, RunOptions, SourceReport, TimelineBuilder},
    services::adapter_for,
    storage::{LocalStorage, StateStore},
};

/// Counselling announcement tracker
#[derive(Parser, Debug)]
#[command(
    name = "counsel-crawler",
    version,
    about = "Tracks counselling announcements and downloads what changed"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a change-detection pass
    Run {
        /// Only run this source id
        #[arg(long)]
        source: Option<String>,

        /// Reconcile and report without downloading or updating the ledger
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how a title would be triaged and classified
    Classify {
        /// Announcement title
        title: String,
    },

    /// Validate the configuration and rule tables
    Validate,

    /// Show per-source state
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_report(report: &SourceReport) {
    log::info!(
        "{} ({}): {} scraped, {} relevant, {} new, {} recovered",
        report.source_name,
        report.source_id,
        report.scraped,
        report.relevant,
        report.counts.total_new,
        report.counts.recovered
    );
    log::info!(
        "  downloads: {} ok, {} skipped, {} failed",
        report.downloads.downloaded,
        report.downloads.skipped,
        report.downloads.failed
    );
    for failure in &report.write_failures {
        log::warn!("  write failed: {}", failure);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run { source, dry_run } => {
            config.validate()?;
            let config = Arc::new(config);
            let pipeline = Pipeline::new(Arc::clone(&config))?;
            let options = RunOptions { dry_run };

            let results = match source.as_deref() {
                Some(id) => {
                    let source = config
                        .source(id)
                        .ok_or_else(|| AppError::config(format!("Unknown source '{}'", id)))?;
                    let adapter = adapter_for(&source.adapter);
                    vec![(
                        source.id.clone(),
                        pipeline.run_source(source, adapter.as_ref(), options).await,
                    )]
                }
                None => pipeline.run_all(options).await,
            };

            let mut failed = 0;
            for (id, result) in &results {
                match result {
                    Ok(report) => print_report(report),
                    Err(e) => {
                        failed += 1;
                        log::error!("{}: {}", id, e);
                    }
                }
            }

            log::info!(
                "Pass complete: {} sources, {} failed{}",
                results.len(),
                failed,
                if dry_run { " (dry run)" } else { "" }
            );
        }

        Command::Classify { title } => {
            let builder = TimelineBuilder::from_config(&config)?;

            match builder.triage().matched_term(&title) {
                Some(term) => println!("discard (matched '{}')", term),
                None => {
                    let c = builder.classifier().classify(&title);
                    println!("round: {} ({})", c.round, c.round.label());
                    println!("type:  {}", c.doc_type);
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let builder = TimelineBuilder::from_config(&config)?;
            log::info!(
                "✓ Config OK ({} sources, {} enabled)",
                config.sources.len(),
                config.enabled_sources().count()
            );
            log::info!(
                "✓ Rules OK ({} round rules, {} type rules)",
                builder.classifier().round_rules().len(),
                builder.classifier().type_rules().len()
            );
        }

        Command::Info => {
            log::info!("Data directory: {}", config.paths.data_dir.display());
            log::info!("Downloads directory: {}", config.paths.downloads_dir.display());

            for source in &config.sources {
                let store = LocalStorage::new(config.paths.data_dir_for(&source.id));
                let ledger = store.load_ledger().await;
                let artifacts =
                    LocalStorage::count_files(&config.paths.downloads_dir_for(&source.id)).await;
                let updated = store
                    .load_metadata()
                    .await
                    .map(|m| m.last_updated.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());

                log::info!(
                    "{:<14} {:>5} fingerprints  {:>5} files  last run: {}{}",
                    source.id,
                    ledger.len(),
                    artifacts,
                    updated,
                    if source.enabled { "" } else { "  (disabled)" }
                );
            }
        }
    }

    Ok(())
}
