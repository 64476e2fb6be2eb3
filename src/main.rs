// src/main.rs — kbdedup entry point

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use kbdedup::cli::{Cli, Commands};
use kbdedup::corpus::store_server::spawn_store_server;
use kbdedup::corpus::Corpus;
use kbdedup::dedup::CancelFlag;
use kbdedup::infra::config::Config;
use kbdedup::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(if cli.verbose { "info" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let db_path = cli
        .db
        .map(PathBuf::from)
        .unwrap_or_else(|| config.storage.database_path());
    let corpus = Corpus::open(&db_path)?;

    // Commands that work on the store directly
    match &cli.command {
        Commands::Import { file } => {
            return kbdedup::cli::import::run_import(&corpus.store, file);
        }
        Commands::Status => {
            return kbdedup::cli::status::show_status(&corpus.store, &db_path);
        }
        _ => {}
    }

    let (store, server) = spawn_store_server(corpus.store);

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current batch");
            on_signal.cancel();
        }
    });

    let result = match &cli.command {
        Commands::Scan { run } => {
            kbdedup::cli::dedup::run_dedup(&store, run, &config, true, true, &cancel).await
        }
        Commands::Resolve { run, yes, details } => {
            if !*yes {
                eprintln!("Dry run: pass --yes to delete the entries listed below.");
            }
            kbdedup::cli::dedup::run_dedup(&store, run, &config, !*yes, *details, &cancel).await
        }
        Commands::Sweep { run, thresholds } => {
            kbdedup::cli::sweep::run_sweep(&store, run, thresholds, &config, &cancel).await
        }
        Commands::Import { .. } | Commands::Status => Ok(()),
    };

    // Close the channel so the store task drains and exits.
    drop(store);
    server.await?;
    result
}
