// src/cli/mod.rs — CLI definition (clap derive)

pub mod dedup;
pub mod import;
pub mod output;
pub mod status;
pub mod sweep;

use clap::{Args, Parser, Subcommand};

use crate::dedup::DedupOptions;
use crate::infra::config::Config;

#[derive(Parser)]
#[command(
    name = "kbdedup",
    about = "Find and collapse near-duplicate knowledge-base entries",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database file (overrides [storage].database)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log progress at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report near-duplicate clusters without deleting anything
    Scan {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Delete every non-survivor (dry run unless --yes is given)
    Resolve {
        #[command(flatten)]
        run: RunArgs,
        /// Actually delete entries
        #[arg(long)]
        yes: bool,
        /// Include the per-cluster listing in text output
        #[arg(long)]
        details: bool,
    },
    /// Compare how many duplicates several thresholds would find
    Sweep {
        #[command(flatten)]
        run: RunArgs,
        /// Comma-separated thresholds (defaults to [sweep].thresholds)
        #[arg(long, value_delimiter = ',')]
        thresholds: Vec<f32>,
    },
    /// Load entries from a JSON Lines file
    Import {
        /// File with one entry object per line
        file: String,
    },
    /// Show database location and entry counts
    Status,
}

/// Run parameters shared by scan / resolve / sweep. Unset flags fall back to
/// the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Similarity threshold in (0, 1)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Candidates per similarity query
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Nearest neighbours considered per entry
    #[arg(short = 'k', long)]
    pub neighbors: Option<usize>,

    /// Scan at most this many entries (0 = all)
    #[arg(long)]
    pub max_scan: Option<usize>,

    /// Similarity queries in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format: text, json, yaml
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

impl RunArgs {
    /// Merge flags over config values.
    pub fn options(&self, config: &Config, dry_run: bool) -> DedupOptions {
        let mut opts = DedupOptions::from_config(&config.dedup, dry_run);
        if let Some(t) = self.threshold {
            opts.threshold = t;
        }
        if let Some(b) = self.batch_size {
            opts.batch_size = b;
        }
        if let Some(k) = self.neighbors {
            opts.neighbors = k;
        }
        if let Some(m) = self.max_scan {
            opts.max_scan = m;
        }
        if let Some(c) = self.concurrency {
            opts.concurrency = c;
        }
        opts
    }
}
