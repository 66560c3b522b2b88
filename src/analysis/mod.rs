/// Analysis layer: statistics, plots and the run orchestrator.
///
/// Architecture:
/// ```text
///   Table
///     │
///     ├──► stats    summary / missing counts / correlation → ReportTable → CSV
///     │
///     ├──► plots    histograms, boxplots, heatmap → PNG
///     │
///     ▼
///   runner        run_eda: fixed stage order, progress checkpoints, run log
/// ```

pub mod artifacts;
pub mod plots;
pub mod progress;
pub mod report;
pub mod runner;
pub mod stats;
