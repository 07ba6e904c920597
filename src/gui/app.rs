//! PollScope Main Application
//! Main window wiring the filter panel to the dashboard, with background
//! threads for dataset loading and aggregate recomputation.

use crate::data::{export, DataSource, FilterSet, SurveyLoader, SurveySchema};
use crate::gui::{Dashboard, FilterPanel, FilterPanelAction};
use crate::stats::SurveyAggregates;
use egui::SidePanel;
use polars::prelude::*;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{info, warn};

/// Optional questionnaire override next to the executable.
const SCHEMA_FILE: &str = "pollscope.schema.json";

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { df: DataFrame, source: DataSource },
    Error(String),
}

/// Aggregation result from background thread
enum AggResult {
    Complete {
        filtered: DataFrame,
        aggregates: SurveyAggregates,
        preview_headers: Vec<String>,
        preview_rows: Vec<Vec<String>>,
    },
    Error(String),
}

/// Main application window.
pub struct SurveyApp {
    schema: SurveySchema,
    loader: SurveyLoader,
    filter_panel: FilterPanel,
    dashboard: Dashboard,

    /// Filtered frame backing the current dashboard, kept for export.
    filtered: Option<DataFrame>,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async aggregation
    agg_rx: Option<Receiver<AggResult>>,
    is_aggregating: bool,
    /// Filters changed while an aggregation was running.
    refresh_queued: bool,
}

impl SurveyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_schema(Self::load_schema())
    }

    fn with_schema(schema: SurveySchema) -> Self {
        let filter_panel = FilterPanel::new(&schema.source_url);

        Self {
            schema,
            loader: SurveyLoader::new(),
            filter_panel,
            dashboard: Dashboard::new(),
            filtered: None,
            load_rx: None,
            is_loading: false,
            agg_rx: None,
            is_aggregating: false,
            refresh_queued: false,
        }
    }

    /// Use the questionnaire file next to the executable when present,
    /// otherwise the built-in one.
    fn load_schema() -> SurveySchema {
        let path = Path::new(SCHEMA_FILE);
        if !path.exists() {
            return SurveySchema::default();
        }
        match SurveySchema::from_json_file(path) {
            Ok(schema) => {
                info!(questions = schema.questions.len(), "loaded schema override");
                schema
            }
            Err(e) => {
                warn!("ignoring {SCHEMA_FILE}: {e}");
                SurveySchema::default()
            }
        }
    }

    /// Kick off a dataset load in a background thread.
    fn start_load(&mut self, source: DataSource) {
        if self.is_loading {
            return;
        }

        self.dashboard.clear();
        self.filtered = None;
        // Discard any in-flight aggregation; its results describe the
        // dataset being replaced.
        self.agg_rx = None;
        self.is_aggregating = false;
        self.refresh_queued = false;
        self.filter_panel.export_enabled = false;
        self.filter_panel
            .set_progress(5.0, &format!("Loading {}...", source.display_name()));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let schema = self.schema.clone();
        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading dataset...".to_string()));

            let result = match &source {
                DataSource::File(path) => {
                    SurveyLoader::read_path(&path.to_string_lossy(), &schema)
                }
                DataSource::Url(url) => SurveyLoader::read_url(url, &schema),
            };

            match result {
                Ok(df) => {
                    let _ = tx.send(LoadResult::Complete { df, source });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.filter_panel.set_progress(20.0, &status);
                    }
                    LoadResult::Complete { df, source } => {
                        let rows = df.height();
                        self.loader.set_dataframe(df);
                        self.filter_panel.update_options(&self.schema, &self.loader);
                        self.filter_panel.set_progress(
                            50.0,
                            &format!("Loaded {rows} responses from {}", source.display_name()),
                        );
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.start_aggregation();
                    }
                    LoadResult::Error(error) => {
                        self.filter_panel
                            .set_progress(0.0, &format!("Error: {error}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Recompute the filtered frame and its aggregates in the background.
    fn start_aggregation(&mut self) {
        if self.is_aggregating {
            self.refresh_queued = true;
            return;
        }

        let Some(df) = self.loader.dataframe().cloned() else {
            self.filter_panel.set_progress(0.0, "No data loaded");
            return;
        };

        let (tx, rx) = channel();
        self.agg_rx = Some(rx);
        self.is_aggregating = true;
        self.filter_panel.set_progress(70.0, "Aggregating...");

        let schema = self.schema.clone();
        let filters = self.filter_panel.filters.clone();
        thread::spawn(move || {
            Self::run_aggregation(tx, df, schema, filters);
        });
    }

    /// Run aggregation (called from background thread)
    fn run_aggregation(
        tx: Sender<AggResult>,
        df: DataFrame,
        schema: SurveySchema,
        filters: FilterSet,
    ) {
        let filtered = match filters.apply(&df) {
            Ok(filtered) => filtered,
            Err(e) => {
                let _ = tx.send(AggResult::Error(e.to_string()));
                return;
            }
        };

        let aggregates = SurveyAggregates::compute(&filtered, &schema);
        let (preview_headers, preview_rows) = Self::build_preview(&filtered, &schema);

        let _ = tx.send(AggResult::Complete {
            filtered,
            aggregates,
            preview_headers,
            preview_rows,
        });
    }

    /// First rows of the filtered frame as display strings, schema columns
    /// only and in questionnaire order.
    fn build_preview(df: &DataFrame, schema: &SurveySchema) -> (Vec<String>, Vec<Vec<String>>) {
        const MAX_ROWS: usize = 50;

        let headers: Vec<String> = schema
            .questions
            .iter()
            .map(|question| question.label.clone())
            .collect();

        let columns: Vec<Option<&Column>> = schema
            .questions
            .iter()
            .map(|question| df.column(&question.column).ok())
            .collect();

        let rows = (0..df.height().min(MAX_ROWS))
            .map(|row| {
                columns
                    .iter()
                    .map(|col| {
                        col.and_then(|col| col.get(row).ok())
                            .filter(|val| !val.is_null())
                            .map(|val| val.to_string().trim_matches('"').trim().to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        (headers, rows)
    }

    /// Check for aggregation results
    fn check_aggregation_results(&mut self) {
        let rx = self.agg_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    AggResult::Complete {
                        filtered,
                        aggregates,
                        preview_headers,
                        preview_rows,
                    } => {
                        let rows = aggregates.summary.total_rows;
                        let total = self.loader.row_count();
                        self.filtered = Some(filtered);
                        self.dashboard
                            .set_results(aggregates, preview_headers, preview_rows);
                        self.filter_panel.export_enabled = rows > 0;
                        self.filter_panel
                            .set_progress(100.0, &format!("Complete! {rows}/{total} responses"));
                        self.is_aggregating = false;
                        should_keep_receiver = false;
                    }
                    AggResult::Error(error) => {
                        self.filter_panel
                            .set_progress(0.0, &format!("Error: {error}"));
                        self.is_aggregating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.agg_rx = Some(rx);
            }
        }

        // Filters changed mid-flight; run once more with the latest set.
        if !self.is_aggregating && self.refresh_queued {
            self.refresh_queued = false;
            self.start_aggregation();
        }
    }

    /// Handle local file selection via the file dialog.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(DataSource::File(path));
        }
    }

    /// Export the filtered rows to a CSV chosen by the user.
    fn handle_export_csv(&mut self) {
        let Some(df) = self.filtered.clone() else {
            self.filter_panel.set_progress(0.0, "Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("filtered_responses.csv")
            .save_file()
        else {
            return; // User cancelled
        };

        match export::write_csv(&df, &path) {
            Ok(()) => {
                self.filter_panel.set_progress(
                    100.0,
                    &format!("Exported {} rows to {}", df.height(), path.display()),
                );
            }
            Err(e) => {
                self.filter_panel.set_progress(0.0, &format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for SurveyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_aggregation_results();

        // Request repaint while loading or aggregating
        if self.is_loading || self.is_aggregating {
            ctx.request_repaint();
        }

        // Left panel - filters
        SidePanel::left("filter_panel")
            .min_width(300.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                let action = self.filter_panel.show(ui);

                match action {
                    FilterPanelAction::FetchUrl => {
                        let url = self.filter_panel.source_url.trim().to_string();
                        if url.is_empty() {
                            self.filter_panel.set_progress(0.0, "Error: empty URL");
                        } else {
                            self.start_load(DataSource::Url(url));
                        }
                    }
                    FilterPanelAction::BrowseCsv => self.handle_browse_csv(),
                    FilterPanelAction::FiltersChanged => self.start_aggregation(),
                    FilterPanelAction::ClearFilters => {
                        self.filter_panel.filters.clear();
                        self.start_aggregation();
                    }
                    FilterPanelAction::ExportCsv => self.handle_export_csv(),
                    FilterPanelAction::None => {}
                }
            });

        // Central panel - dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard.show(ui, &self.schema);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_load_discards_in_flight_aggregation() {
        let mut app = SurveyApp::with_schema(SurveySchema::default());

        // An aggregation of the previous dataset has already completed but
        // has not been polled yet.
        let (tx, rx) = channel();
        tx.send(AggResult::Complete {
            filtered: DataFrame::empty(),
            aggregates: SurveyAggregates::default(),
            preview_headers: Vec::new(),
            preview_rows: Vec::new(),
        })
        .unwrap();
        app.agg_rx = Some(rx);
        app.is_aggregating = true;
        app.refresh_queued = true;

        app.start_load(DataSource::File("/nonexistent/survey.csv".into()));

        assert!(app.agg_rx.is_none());
        assert!(!app.is_aggregating);
        assert!(!app.refresh_queued);

        // The stale result must not reach the dashboard or enable export.
        app.check_aggregation_results();
        assert!(app.dashboard.aggregates.is_none());
        assert!(!app.filter_panel.export_enabled);
    }
}
