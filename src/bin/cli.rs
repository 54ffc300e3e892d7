//! dealwatch CLI
//!
//! One invocation is one run: scrape the enabled sites, diff against the
//! persisted state, post alerts, persist. Meant to be driven by cron or a
//! systemd timer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dealwatch::{
    error::Result,
    models::Config,
    notifier::{DryRunNotifier, Notifier, XNotifier},
    pipeline,
    storage::StateStore,
    utils::http,
};

/// dealwatch - deals watcher with price-drop and back-in-stock alerts
#[derive(Parser, Debug)]
#[command(
    name = "dealwatch",
    version,
    about = "Watches e-commerce deals pages and tweets price-drop and back-in-stock alerts"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the persisted state file
    #[arg(short, long, default_value = "data/state.json")]
    state: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one watch pass: scrape, diff, alert, persist
    Run {
        /// Log alerts instead of posting them (no credentials required)
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show state file statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
///
/// Exits non-zero only on startup failures (unreadable or invalid
/// configuration, missing credentials); everything past startup is
/// contained by the run loop.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { dry_run } => {
            let config = Config::load(&cli.config)?;
            let client = http::create_async_client(&config.watcher)?;

            // Credential check happens before any scraping.
            let notifier: Box<dyn Notifier> = if dry_run {
                Box::new(DryRunNotifier)
            } else {
                Box::new(XNotifier::from_env(client.clone())?)
            };

            let mut store = StateStore::load(&cli.state).await;
            log::info!(
                "Loaded {} snapshots from {}",
                store.len(),
                cli.state.display()
            );

            pipeline::run_watch(&config, &mut store, notifier.as_ref(), &client).await;
        }

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
        }

        Command::Info => {
            let store = StateStore::load(&cli.state).await;
            log::info!("State file: {}", cli.state.display());
            log::info!("Tracked products: {}", store.len());
            if let Some((oldest, newest)) = store.last_seen_range() {
                log::info!("Oldest observation: {oldest}");
                log::info!("Newest observation: {newest}");
            }
        }
    }

    Ok(())
}
