use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::analysis::runner::run_eda;

// ---------------------------------------------------------------------------
// Background analysis
// ---------------------------------------------------------------------------

/// Messages sent from the worker thread to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    Progress(u8),
    /// Output directory, or the rendered error chain.
    Finished(Result<PathBuf, String>),
}

/// A run in flight: the file being analysed and the event stream.
pub struct AnalysisHandle {
    pub input: PathBuf,
    pub events: Receiver<AnalysisEvent>,
}

/// Start `run_eda` on a worker thread.
///
/// `wake` is called after every event so the UI can schedule a repaint; it
/// runs on the worker thread.
pub fn spawn_analysis<W>(input: PathBuf, wake: W) -> std::io::Result<AnalysisHandle>
where
    W: Fn() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let path = input.clone();

    thread::Builder::new()
        .name("eda-worker".to_string())
        .spawn(move || {
            log::info!("Analysis of {} started", path.display());
            let mut report = |percent: u8| {
                // The receiver is gone only if the window closed; keep going.
                let _ = tx.send(AnalysisEvent::Progress(percent));
                wake();
            };
            let result = run_eda(&path, &mut report).map_err(|e| {
                log::error!("Analysis of {} failed: {e:#}", path.display());
                format!("{e:#}")
            });
            let _ = tx.send(AnalysisEvent::Finished(result));
            wake();
        })?;

    Ok(AnalysisHandle { input, events: rx })
}
