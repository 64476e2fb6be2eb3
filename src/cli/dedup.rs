// src/cli/dedup.rs — scan / resolve commands

use crate::cli::output::{emit, format_output};
use crate::cli::RunArgs;
use crate::dedup::{pipeline, CancelFlag, EntryStore};
use crate::infra::config::Config;

/// Run the pipeline and print the report.
pub async fn run_dedup<S: EntryStore + ?Sized>(
    store: &S,
    args: &RunArgs,
    config: &Config,
    dry_run: bool,
    details: bool,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let opts = args.options(config, dry_run);
    let report = pipeline::run(store, &opts, cancel).await?;

    let text = report.render_text(details);
    let rendered = format_output(&report, &args.format, text)?;
    emit(args.output.as_deref(), &rendered)?;

    if report.failed_batches > 0 {
        anyhow::bail!(
            "{} delete batch(es) failed; re-run to retry",
            report.failed_batches
        );
    }
    Ok(())
}
