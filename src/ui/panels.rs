use eframe::egui::{self, Color32, RichText, Ui};
use rfd::{MessageButtons, MessageDialog, MessageLevel};

use crate::analysis::artifacts::BANNER;
use crate::state::{AppState, RunOutcome};
use crate::worker::spawn_analysis;

pub const SELECT_BUTTON_TEXT: &str = "Select Excel or CSV File for Data Analysis";

// ---------------------------------------------------------------------------
// Main panel
// ---------------------------------------------------------------------------

/// Banner, file button, progress bar and status line, stacked and centred.
pub fn main_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(16.0);
        ui.label(RichText::new(BANNER).strong().size(16.0));
        ui.add_space(20.0);

        let button = egui::Button::new(SELECT_BUTTON_TEXT);
        if ui.add_enabled(!state.is_running(), button).clicked() {
            open_file_dialog(ui.ctx(), state);
        }
        ui.add_space(16.0);

        ui.add(
            egui::ProgressBar::new(f32::from(state.progress) / 100.0)
                .desired_width(300.0)
                .show_percentage(),
        );

        if let Some(msg) = &state.status_message {
            ui.add_space(8.0);
            let text = RichText::new(msg).small();
            let text = match state.last_outcome {
                Some(RunOutcome::Failed(_)) if !state.is_running() => text.color(Color32::RED),
                _ => text,
            };
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Select data file")
        .add_filter("Excel and CSV files", &["xlsx", "xls", "csv"])
        .pick_file();

    let Some(path) = file else {
        log::debug!("File selection cancelled");
        return;
    };

    let repaint = ctx.clone();
    match spawn_analysis(path, move || repaint.request_repaint()) {
        Ok(handle) => state.start(handle),
        Err(e) => {
            log::error!("Failed to start analysis worker: {e}");
            let msg = format!("could not start analysis: {e}");
            state.status_message = Some(format!("Error: {msg}"));
            notify(&RunOutcome::Failed(msg));
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Title and body of the dialog shown when a run ends.
pub fn outcome_message(outcome: &RunOutcome) -> (&'static str, String) {
    match outcome {
        RunOutcome::Succeeded(dir) => (
            "Success",
            format!("Data Analysis completed.\nResults saved in:\n{}", dir.display()),
        ),
        RunOutcome::Failed(msg) => ("Error", format!("An error occurred:\n{msg}")),
    }
}

/// Blocking modal dialog reporting how a run ended.
pub fn notify(outcome: &RunOutcome) {
    let level = match outcome {
        RunOutcome::Succeeded(_) => MessageLevel::Info,
        RunOutcome::Failed(_) => MessageLevel::Error,
    };
    let (title, body) = outcome_message(outcome);
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(body)
        .set_buttons(MessageButtons::Ok)
        .show();
}
