//! PollScope - Survey Response Explorer
//!
//! Loads a questionnaire CSV, filters rows by answer values and charts the
//! filtered subset.

mod charts;
mod data;
mod gui;
mod stats;

use eframe::egui;
use gui::SurveyApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("PollScope"),
        ..Default::default()
    };

    eframe::run_native(
        "PollScope",
        options,
        Box::new(|cc| Ok(Box::new(SurveyApp::new(cc)))),
    )
}
