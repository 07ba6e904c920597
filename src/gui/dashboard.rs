//! Dashboard Widget
//! Central panel: KPI strip, tabbed chart pages over the filtered subset,
//! and a preview of the filtered rows.

use crate::charts::ChartPlotter;
use crate::data::{ChartKind, SurveySchema};
use crate::stats::{CrossTab, SurveyAggregates};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 12.0;
const PREVIEW_ROWS: usize = 50;

/// Dashboard pages, mirroring the questionnaire sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Profile,
    University,
    PresentedProgram,
    SoftwareEngineering,
    OtherPrograms,
    CrosstabsData,
}

impl DashboardTab {
    const ALL: [DashboardTab; 6] = [
        DashboardTab::Profile,
        DashboardTab::University,
        DashboardTab::PresentedProgram,
        DashboardTab::SoftwareEngineering,
        DashboardTab::OtherPrograms,
        DashboardTab::CrosstabsData,
    ];

    fn title(&self) -> &'static str {
        match self {
            DashboardTab::Profile => "Profile",
            DashboardTab::University => "University & Degree",
            DashboardTab::PresentedProgram => "Presented Program",
            DashboardTab::SoftwareEngineering => "Software Engineering",
            DashboardTab::OtherPrograms => "Other Programs",
            DashboardTab::CrosstabsData => "Crosstabs & Data",
        }
    }

    /// Question keys charted on this tab, in order.
    fn question_keys(&self) -> &'static [&'static str] {
        match self {
            DashboardTab::Profile => &[
                "age",
                "residence",
                "city",
                "education",
                "degree_level",
                "work_area",
            ],
            DashboardTab::University => &[
                "first_time",
                "current_program",
                "start_horizon",
                "stem_interest",
                "main_difficulty",
            ],
            DashboardTab::PresentedProgram => &[
                "program_interest",
                "interest_level",
                "shift",
                "choice_factors",
                "work_study",
            ],
            DashboardTab::SoftwareEngineering => &["software_eng_interest"],
            DashboardTab::OtherPrograms => &[
                "other_programs",
                "offered_programs",
                "not_offered_programs",
                "knows_someone",
                "source",
            ],
            DashboardTab::CrosstabsData => &[],
        }
    }
}

/// Central scrollable dashboard over the current aggregates.
pub struct Dashboard {
    pub aggregates: Option<SurveyAggregates>,
    pub preview_headers: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
    selected_tab: DashboardTab,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            aggregates: None,
            preview_headers: Vec::new(),
            preview_rows: Vec::new(),
            selected_tab: DashboardTab::Profile,
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.aggregates = None;
        self.preview_headers.clear();
        self.preview_rows.clear();
    }

    /// Install freshly computed aggregates and the filtered-rows preview.
    pub fn set_results(
        &mut self,
        aggregates: SurveyAggregates,
        preview_headers: Vec<String>,
        preview_rows: Vec<Vec<String>>,
    ) {
        self.aggregates = Some(aggregates);
        self.preview_headers = preview_headers;
        self.preview_rows = preview_rows;
    }

    /// Draw the dashboard
    pub fn show(&mut self, ui: &mut egui::Ui, schema: &SurveySchema) {
        let Some(aggregates) = self.aggregates.clone() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data loaded").size(20.0).color(Color32::GRAY));
            });
            return;
        };

        Self::draw_kpi_strip(ui, &aggregates);
        ui.add_space(8.0);
        ui.separator();

        // Tab bar
        ui.horizontal(|ui| {
            for tab in DashboardTab::ALL {
                ui.selectable_value(&mut self.selected_tab, tab, tab.title());
            }
        });
        ui.separator();

        if aggregates.summary.total_rows == 0 {
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("⚠ No rows match the selected filters")
                        .size(16.0)
                        .color(Color32::from_rgb(243, 156, 18)),
                );
            });
            return;
        }

        let tab = self.selected_tab;
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for key in tab.question_keys() {
                    Self::draw_question_card(ui, schema, &aggregates, key);
                    ui.add_space(CARD_SPACING);
                }

                match tab {
                    DashboardTab::SoftwareEngineering => {
                        Self::draw_crosstab_card(
                            ui,
                            "Age × Software Engineering interest",
                            &aggregates.age_by_software_interest,
                        );
                    }
                    DashboardTab::CrosstabsData => {
                        Self::draw_crosstab_card(
                            ui,
                            "Age × Presented-program interest",
                            &aggregates.age_by_program_interest,
                        );
                        ui.add_space(CARD_SPACING);
                        self.draw_preview_table(ui);
                    }
                    _ => {}
                }
            });
    }

    /// Headline metrics over the filtered subset.
    fn draw_kpi_strip(ui: &mut egui::Ui, aggregates: &SurveyAggregates) {
        let summary = &aggregates.summary;

        let metric = |ui: &mut egui::Ui, label: &str, value: String| {
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(16.0).strong());
                    });
                });
        };

        ui.add_space(6.0);
        ui.columns(4, |cols| {
            metric(&mut cols[0], "Total responses", summary.total_rows.to_string());
            metric(
                &mut cols[1],
                "Predominant age",
                summary
                    .predominant_age
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            );
            metric(
                &mut cols[2],
                "Predominant education",
                summary
                    .predominant_education
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            );
            metric(
                &mut cols[3],
                "Predominant interest",
                summary
                    .top_interest
                    .as_ref()
                    .map(|(label, percent)| format!("{label} ({percent:.1}%)"))
                    .unwrap_or_else(|| "N/A".to_string()),
            );
        });
    }

    /// One chart card: question label as title, bar or pie per the schema.
    fn draw_question_card(
        ui: &mut egui::Ui,
        schema: &SurveySchema,
        aggregates: &SurveyAggregates,
        key: &str,
    ) {
        let Some(question) = schema.question(key) else {
            return;
        };
        let counts = aggregates.counts_for(key);

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&question.label).size(15.0).strong());
                ui.add_space(6.0);
                match question.chart {
                    ChartKind::Bar => ChartPlotter::draw_bar_chart(ui, key, counts),
                    ChartKind::Pie => ChartPlotter::draw_pie_chart(ui, counts),
                }
            });
    }

    fn draw_crosstab_card(ui: &mut egui::Ui, title: &str, tab: &CrossTab) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(15.0).strong());
                ui.add_space(6.0);
                ChartPlotter::draw_heatmap(ui, tab);
            });
    }

    /// First rows of the filtered frame as a striped grid.
    fn draw_preview_table(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Filtered rows").size(15.0).strong());
        ui.label(
            RichText::new(format!(
                "Showing up to {PREVIEW_ROWS} rows. Use the export button for the full set."
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
        ui.add_space(4.0);

        if self.preview_rows.is_empty() {
            ui.label(RichText::new("No rows").size(12.0).color(Color32::GRAY));
            return;
        }

        ScrollArea::horizontal()
            .id_salt("preview_table")
            .show(ui, |ui| {
                egui::Grid::new("filtered_preview")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for header in &self.preview_headers {
                            ui.label(
                                RichText::new(ChartPlotter::truncate_label(header, 24))
                                    .strong()
                                    .size(11.0),
                            );
                        }
                        ui.end_row();

                        for row in &self.preview_rows {
                            for cell in row {
                                ui.label(
                                    RichText::new(ChartPlotter::truncate_label(cell, 28))
                                        .size(11.0),
                                );
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
