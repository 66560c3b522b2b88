use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;

use crate::worker::{AnalysisEvent, AnalysisHandle};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// How the last run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded(PathBuf),
    Failed(String),
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Progress bar value, 0–100.
    pub progress: u8,

    /// The analysis currently running, if any.
    pub running: Option<AnalysisHandle>,

    /// Status line shown under the progress bar.
    pub status_message: Option<String>,

    /// Result of the most recent finished run.
    pub last_outcome: Option<RunOutcome>,
}

impl AppState {
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Take ownership of a freshly spawned run.
    pub fn start(&mut self, handle: AnalysisHandle) {
        self.status_message = Some(format!("Analysing {}…", handle.input.display()));
        self.progress = 0;
        self.running = Some(handle);
    }

    /// Drain pending worker events. Returns the outcome once, when the run
    /// ends; the progress bar is reset to 0 at that point.
    pub fn poll(&mut self) -> Option<RunOutcome> {
        let (latest, finished) = {
            let handle = self.running.as_ref()?;
            let mut latest = None;
            let mut finished = None;
            loop {
                match handle.events.try_recv() {
                    Ok(AnalysisEvent::Progress(p)) => latest = Some(p),
                    Ok(AnalysisEvent::Finished(result)) => {
                        finished = Some(result);
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        finished = Some(Err("analysis worker stopped unexpectedly".to_string()));
                        break;
                    }
                }
            }
            (latest, finished)
        };

        if let Some(p) = latest {
            self.progress = p;
        }
        finished.map(|result| self.finish(result))
    }

    fn finish(&mut self, result: Result<PathBuf, String>) -> RunOutcome {
        self.running = None;
        self.progress = 0;
        let outcome = match result {
            Ok(dir) => {
                log::info!("Results saved in {}", dir.display());
                self.status_message = Some(format!("Results saved in {}", dir.display()));
                RunOutcome::Succeeded(dir)
            }
            Err(msg) => {
                self.status_message = Some(format!("Error: {msg}"));
                RunOutcome::Failed(msg)
            }
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn state_with_channel() -> (AppState, mpsc::Sender<AnalysisEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut state = AppState::default();
        state.start(AnalysisHandle {
            input: PathBuf::from("in.csv"),
            events: rx,
        });
        (state, tx)
    }

    #[test]
    fn idle_state_has_nothing_to_poll() {
        let mut state = AppState::default();
        assert!(!state.is_running());
        assert_eq!(state.poll(), None);
        assert_eq!(state.progress, 0);
    }

    #[test]
    fn progress_events_move_the_bar() {
        let (mut state, tx) = state_with_channel();
        tx.send(AnalysisEvent::Progress(10)).unwrap();
        tx.send(AnalysisEvent::Progress(40)).unwrap();

        assert_eq!(state.poll(), None);
        assert_eq!(state.progress, 40);
        assert!(state.is_running());
    }

    #[test]
    fn success_resets_progress_and_reports_directory() {
        let (mut state, tx) = state_with_channel();
        let dir = PathBuf::from("Data_Analysis_Results");
        tx.send(AnalysisEvent::Progress(100)).unwrap();
        tx.send(AnalysisEvent::Finished(Ok(dir.clone()))).unwrap();

        assert_eq!(state.poll(), Some(RunOutcome::Succeeded(dir.clone())));
        assert_eq!(state.progress, 0);
        assert!(!state.is_running());
        assert_eq!(state.last_outcome, Some(RunOutcome::Succeeded(dir)));
        // The outcome is delivered only once.
        assert_eq!(state.poll(), None);
    }

    #[test]
    fn failure_is_surfaced_as_text() {
        let (mut state, tx) = state_with_channel();
        tx.send(AnalysisEvent::Progress(20)).unwrap();
        tx.send(AnalysisEvent::Finished(Err("bad file".into()))).unwrap();

        assert_eq!(state.poll(), Some(RunOutcome::Failed("bad file".into())));
        assert_eq!(state.progress, 0);
        assert_eq!(state.status_message.as_deref(), Some("Error: bad file"));
    }

    #[test]
    fn vanished_worker_counts_as_failure() {
        let (mut state, tx) = state_with_channel();
        drop(tx);

        assert!(matches!(state.poll(), Some(RunOutcome::Failed(_))));
        assert!(!state.is_running());
    }
}
