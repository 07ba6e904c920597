//! Filter Panel Widget
//! Left side panel: dataset source controls, one multi-select per question,
//! export button and progress reporting.

use crate::data::{FilterSet, SurveyLoader, SurveySchema};
use egui::{Color32, RichText, ScrollArea};

/// Filter choices for one question, derived from the full dataset.
#[derive(Debug, Clone)]
pub struct QuestionOptions {
    pub key: String,
    pub column: String,
    pub label: String,
    pub values: Vec<String>,
}

/// Left side panel with source selection, filters and export.
pub struct FilterPanel {
    pub source_url: String,
    pub filters: FilterSet,
    pub options: Vec<QuestionOptions>,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl FilterPanel {
    pub fn new(default_url: &str) -> Self {
        Self {
            source_url: default_url.to_string(),
            filters: FilterSet::new(),
            options: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Rebuild the option lists after a dataset load. Clears any active
    /// filters, since the old selections may not exist in the new data.
    pub fn update_options(&mut self, schema: &SurveySchema, loader: &SurveyLoader) {
        self.filters.clear();
        self.options = schema
            .questions
            .iter()
            .map(|question| QuestionOptions {
                key: question.key.clone(),
                column: question.column.clone(),
                label: question.label.clone(),
                values: loader.unique_values(&question.column),
            })
            .collect();
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> FilterPanelAction {
        let mut action = FilterPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 PollScope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Survey Response Explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new("Dataset URL").size(11.0).color(Color32::GRAY));
                ui.text_edit_singleline(&mut self.source_url);
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    if ui.button("⬇ Fetch").clicked() {
                        action = FilterPanelAction::FetchUrl;
                    }
                    if ui.button("📂 Browse").clicked() {
                        action = FilterPanelAction::BrowseCsv;
                    }
                });
            });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filters Section =====
        ui.horizontal(|ui| {
            ui.label(RichText::new("🔎 Filters").size(14.0).strong());
            let active = self.filters.active_count();
            if active > 0 {
                ui.label(
                    RichText::new(format!("{active} active"))
                        .size(11.0)
                        .color(Color32::from_rgb(243, 156, 18)),
                );
                if ui.small_button("Clear all").clicked() {
                    action = FilterPanelAction::ClearFilters;
                }
            }
        });
        ui.add_space(5.0);

        if self.options.is_empty() {
            ui.label(
                RichText::new("Load a dataset to enable filters")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        ScrollArea::vertical()
            .id_salt("filter_list")
            .max_height((ui.available_height() - 170.0).max(120.0))
            .show(ui, |ui| {
                for option in &self.options {
                    let selected = self.filters.selected(&option.column).len();
                    let title = if selected > 0 {
                        format!("{} ({})", option.label, selected)
                    } else {
                        option.label.clone()
                    };

                    egui::CollapsingHeader::new(RichText::new(title).size(12.0))
                        .id_salt(&option.key)
                        .show(ui, |ui| {
                            if option.values.is_empty() {
                                ui.label(
                                    RichText::new("No answers").size(11.0).color(Color32::GRAY),
                                );
                            }
                            for value in &option.values {
                                let mut checked = self.filters.is_selected(&option.column, value);
                                if ui
                                    .checkbox(&mut checked, RichText::new(value).size(11.0))
                                    .changed()
                                {
                                    self.filters.toggle(&option.column, value);
                                    action = FilterPanelAction::FiltersChanged;
                                }
                            }
                        });
                }
            });

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export filtered CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(button).clicked() {
                    action = FilterPanelAction::ExportCsv;
                }
            });
        });

        ui.add_space(8.0);

        // ===== Progress Section =====
        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );
        ui.add_space(3.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") || self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by the filter panel
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPanelAction {
    None,
    FetchUrl,
    BrowseCsv,
    FiltersChanged,
    ClearFilters,
    ExportCsv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn two_question_schema() -> SurveySchema {
        let full = SurveySchema::default();
        SurveySchema {
            source_url: full.source_url.clone(),
            questions: full
                .questions
                .iter()
                .filter(|q| q.key == "age" || q.key == "shift")
                .cloned()
                .collect(),
        }
    }

    #[test]
    fn reload_clears_filters_and_rebuilds_options() {
        let schema = two_question_schema();
        let age_col = schema.question("age").unwrap().column.clone();
        let shift_col = schema.question("shift").unwrap().column.clone();

        let mut panel = FilterPanel::new(&schema.source_url);
        panel.filters.toggle(&age_col, "18-24");
        panel.filters.toggle(&shift_col, "Noturno");
        assert_eq!(panel.filters.active_count(), 2);

        let mut loader = SurveyLoader::new();
        loader.set_dataframe(
            DataFrame::new(vec![
                Column::new(age_col.clone().into(), vec!["25-30", "18-24", "25-30"]),
                Column::new(shift_col.into(), vec!["Diurno", "Diurno", "Noturno"]),
            ])
            .unwrap(),
        );

        panel.update_options(&schema, &loader);

        assert!(panel.filters.is_empty());
        assert_eq!(panel.options.len(), 2);
        let age_options = panel.options.iter().find(|o| o.key == "age").unwrap();
        assert_eq!(
            age_options.values,
            vec!["18-24".to_string(), "25-30".to_string()]
        );
    }
}
