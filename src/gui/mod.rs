//! GUI module - User interface components

mod app;
mod dashboard;
mod filter_panel;

pub use app::SurveyApp;
pub use dashboard::Dashboard;
pub use filter_panel::{FilterPanel, FilterPanelAction};
