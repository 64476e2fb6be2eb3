// src/cli/sweep.rs — Threshold comparison command

use crate::cli::output::{emit, format_output};
use crate::cli::RunArgs;
use crate::dedup::{sweep, CancelFlag, EntryStore};
use crate::infra::config::Config;

pub async fn run_sweep<S: EntryStore + ?Sized>(
    store: &S,
    args: &RunArgs,
    thresholds: &[f32],
    config: &Config,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let opts = args.options(config, true);
    let thresholds = if thresholds.is_empty() {
        config.sweep.thresholds.as_slice()
    } else {
        thresholds
    };

    let rows = sweep::sweep(store, &opts, thresholds, cancel).await?;
    let rendered = format_output(&rows, &args.format, sweep::render_table(&rows))?;
    emit(args.output.as_deref(), &rendered)
}
