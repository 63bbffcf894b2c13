//! icowatch CLI
//!
//! Local execution entry point, intended to be invoked periodically by
//! cron or a systemd timer. At most one run should execute at a time;
//! overlap prevention is the scheduler's job.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use icowatch::{
    error::{AppError, Result},
    models::Config,
    notify::{HttpPublisher, Publisher, StdoutPublisher},
    pipeline,
    source::IcoSource,
    store::{LocalStore, MemoryStore, RecordStore},
};

/// icowatch - ICO Enforcement Action Watcher
#[derive(Parser, Debug)]
#[command(
    name = "icowatch",
    version,
    about = "Watches the ICO enforcement action list and announces new entries"
)]
struct Cli {
    /// Path to data directory containing config and store files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one fetch → diff → persist → notify pass
    Run {
        /// Use an in-memory store and print posts instead of publishing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show store contents summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the configured publisher. The access token can be supplied via
/// the ICOWATCH_ACCESS_TOKEN environment variable instead of the config
/// file.
fn build_publisher(config: &Config) -> Result<Box<dyn Publisher>> {
    match config.notify.publisher.as_str() {
        "stdout" => Ok(Box::new(StdoutPublisher)),
        "http" => {
            let token = std::env::var("ICOWATCH_ACCESS_TOKEN")
                .unwrap_or_else(|_| config.notify.access_token.clone());
            if token.trim().is_empty() {
                return Err(AppError::config(
                    "http publisher needs an access token (config or ICOWATCH_ACCESS_TOKEN)",
                ));
            }
            let publisher =
                HttpPublisher::new(&config.notify.endpoint, token, config.source.timeout_secs)?;
            Ok(Box::new(publisher))
        }
        other => Err(AppError::config(format!("Unknown publisher kind: {other}"))),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("icowatch starting...");

    let config_path = cli.data_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let store_path = cli.data_dir.join(&config.store.path);

    match cli.command {
        Command::Run { dry_run } => {
            config.validate()?;
            let source = IcoSource::new(config.source.clone())?;

            let summary = if dry_run {
                log::info!("Dry run: in-memory store, posts go to stdout");
                let store = MemoryStore::new();
                pipeline::run_once(&source, &store, &StdoutPublisher, &config).await?
            } else {
                let store = LocalStore::new(&store_path);
                let publisher = build_publisher(&config)?;
                pipeline::run_once(&source, &store, publisher.as_ref(), &config).await?
            };

            log::info!(
                "Run {} finished in state {} ({} new, {} announced)",
                summary.run_id,
                summary.state,
                summary.new_records,
                summary.sent_count()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (source, store, and notify sections)");
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());
            log::info!("Store file: {}", store_path.display());

            let store = LocalStore::new(&store_path);
            let mut records = store.load_all().await?;
            records.sort_by(|a, b| b.date.cmp(&a.date));

            log::info!("{} records known", records.len());
            for record in records.iter().take(10) {
                log::info!(
                    "  {} {} ({})",
                    record.date,
                    record.organisation,
                    record.kind.as_deref().unwrap_or("unknown kind")
                );
            }
            if records.len() > 10 {
                log::info!("  ... and {} more", records.len() - 10);
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
