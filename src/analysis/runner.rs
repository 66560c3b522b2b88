use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::data::loader::load_file;

use super::artifacts::{
    output_dir_for, remove_stale_plots, write_log, CORRELATION_FILE, MISSING_FILE, SUMMARY_FILE,
};
use super::plots::{generate_boxplots, generate_heatmap, generate_histograms};
use super::progress::{Monotonic, ProgressSink};
use super::report::ReportTable;
use super::stats::{generate_correlation_matrix, generate_missing_data_report, generate_summary};

// Checkpoints reported after each fixed stage.
const LOADED: u8 = 10;
const SUMMARY_DONE: u8 = 20;
const MISSING_DONE: u8 = 30;
const CORRELATION_DONE: u8 = 40;
const HEATMAP_DONE: u8 = 90;
const FINISHED: u8 = 100;

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Run the full analysis battery on `input` and return the output directory.
///
/// Stages run in a fixed order and each one reports a checkpoint to
/// `progress`. A failure aborts the run; artifacts written before it stay on
/// disk.
pub fn run_eda(input: &Path, progress: &mut dyn ProgressSink) -> Result<PathBuf> {
    let started = Instant::now();
    let mut progress = Monotonic::new(progress);

    let table = load_file(input)?;
    log::info!(
        "Loaded {} ({} rows, columns {:?})",
        input.display(),
        table.n_rows(),
        table.column_names()
    );

    let out_dir = output_dir_for(input);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    progress.report(LOADED);

    persist(&generate_summary(&table), &out_dir, SUMMARY_FILE)?;
    progress.report(SUMMARY_DONE);

    persist(&generate_missing_data_report(&table), &out_dir, MISSING_FILE)?;
    progress.report(MISSING_DONE);

    persist(&generate_correlation_matrix(&table), &out_dir, CORRELATION_FILE)?;
    progress.report(CORRELATION_DONE);

    let stale = remove_stale_plots(&out_dir)?;
    if stale > 0 {
        log::info!("Removed {stale} plot(s) left over from a previous run");
    }

    let histograms = generate_histograms(&table, &out_dir, &mut progress)?;
    log::info!("Wrote {} histogram(s)", histograms.len());
    let boxplots = generate_boxplots(&table, &out_dir, &mut progress)?;
    log::info!("Wrote {} boxplot(s)", boxplots.len());

    generate_heatmap(&table, &out_dir)?;
    progress.report(HEATMAP_DONE);

    write_log(&out_dir, input)?;
    progress.report(FINISHED);

    log::info!(
        "Analysis of {} finished in {:.2?}; results in {}",
        input.display(),
        started.elapsed(),
        out_dir.display()
    );
    Ok(out_dir)
}

fn persist(report: &ReportTable, out_dir: &Path, file_name: &str) -> Result<()> {
    let path = out_dir.join(file_name);
    report.write_csv(&path)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
