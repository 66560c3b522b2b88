mod analysis;
mod app;
mod color;
mod data;
mod state;
mod ui;
mod worker;

use analysis::artifacts::BANNER;
use app::EdaApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(BANNER)
            .with_inner_size([420.0, 250.0])
            .with_min_inner_size([380.0, 220.0]),
        ..Default::default()
    };

    eframe::run_native(
        BANNER,
        options,
        Box::new(|_cc| Ok(Box::new(EdaApp::default()))),
    )
}
