use std::time::Duration;

use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct EdaApp {
    pub state: AppState,
}

impl eframe::App for EdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Worker events ----
        if let Some(outcome) = self.state.poll() {
            panels::notify(&outcome);
        }

        // ---- Central panel: banner, button, progress ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::main_panel(ui, &mut self.state);
        });

        // The worker wakes us on every event; this only catches a worker
        // that died without sending one.
        if self.state.is_running() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
