//! Chart Plotter Module
//! Creates the dashboard visualizations: bar charts via egui_plot, pie
//! charts and crosstab heatmaps drawn directly with the painter.

use crate::stats::CrossTab;
use egui::{Align2, Color32, FontId, Pos2, RichText, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Plot};

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

/// Base color for heatmap cells at full intensity.
const HEAT_COLOR: Color32 = Color32::from_rgb(52, 152, 219);

const CHART_HEIGHT: f32 = 280.0;

/// Creates descriptive charts for value counts and crosstabs.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn slice_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Shorten a category label so axis ticks and legends stay readable.
    pub fn truncate_label(label: &str, max_chars: usize) -> String {
        if label.chars().count() <= max_chars {
            return label.to_string();
        }
        let short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", short.trim_end())
    }

    fn empty_notice(ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.label(RichText::new("No responses").size(13.0).color(Color32::GRAY));
        ui.add_space(10.0);
    }

    /// Draw a vertical bar chart of value counts.
    /// X-axis: categories by index, Y-axis: response count.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: &str, counts: &[(String, u32)]) {
        if counts.is_empty() {
            Self::empty_notice(ui);
            return;
        }

        let labels: Vec<String> = counts
            .iter()
            .map(|(label, _)| Self::truncate_label(label, 18))
            .collect();

        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, (label, count))| {
                Bar::new(i as f64, *count as f64)
                    .width(0.6)
                    .fill(Self::slice_color(i).gamma_multiply(0.85))
                    .name(label)
            })
            .collect();

        Plot::new(format!("bar_{id}"))
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Responses")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Draw a pie chart of value counts with a legend underneath.
    pub fn draw_pie_chart(ui: &mut egui::Ui, counts: &[(String, u32)]) {
        let total: u32 = counts.iter().map(|(_, count)| count).sum();
        if total == 0 {
            Self::empty_notice(ui);
            return;
        }

        let size = CHART_HEIGHT.min(ui.available_width());
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), egui::Sense::hover());
        let painter = ui.painter_at(rect);

        let center = rect.center();
        let radius = rect.width().min(rect.height()) / 2.0 - 8.0;

        let mut start_angle = -std::f32::consts::FRAC_PI_2;
        for (i, (_, count)) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let fraction = *count as f32 / total as f32;
            let sweep = fraction * std::f32::consts::TAU;

            // Fill the slice as a fan of thin triangles; a single polygon
            // would not tessellate once the sweep passes 180 degrees.
            let steps = ((sweep / 0.05).ceil() as usize).max(2);
            let arc_point = |angle: f32| {
                Pos2::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            };
            for step in 0..steps {
                let a0 = start_angle + sweep * step as f32 / steps as f32;
                let a1 = start_angle + sweep * (step + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![center, arc_point(a0), arc_point(a1)],
                    Self::slice_color(i),
                    Stroke::NONE,
                ));
            }
            painter.line_segment(
                [center, arc_point(start_angle)],
                Stroke::new(1.0, ui.visuals().window_fill()),
            );

            // Percent label at the slice midpoint; skip slivers.
            if fraction >= 0.04 {
                let mid = start_angle + sweep / 2.0;
                let label_pos = Pos2::new(
                    center.x + radius * 0.62 * mid.cos(),
                    center.y + radius * 0.62 * mid.sin(),
                );
                painter.text(
                    label_pos,
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", fraction * 100.0),
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }

            start_angle += sweep;
        }

        // Legend
        for (i, (label, count)) in counts.iter().enumerate() {
            ui.horizontal(|ui| {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, Self::slice_color(i));
                ui.label(
                    RichText::new(format!(
                        "{} ({})",
                        Self::truncate_label(label, 48),
                        count
                    ))
                    .size(12.0),
                );
            });
        }
    }

    /// Draw a crosstab heatmap: cell fill scaled by count, count text in
    /// each cell, labels along both axes.
    pub fn draw_heatmap(ui: &mut egui::Ui, tab: &CrossTab) {
        if tab.is_empty() {
            Self::empty_notice(ui);
            return;
        }

        let max = tab.max().max(1) as f32;
        let row_gutter = 140.0_f32;
        let col_header = 40.0_f32;
        let n_cols = tab.col_labels.len() as f32;
        let n_rows = tab.row_labels.len() as f32;

        let avail = ui.available_width();
        let cell_w = ((avail - row_gutter) / n_cols).clamp(36.0, 120.0);
        let cell_h = 28.0_f32;

        let total_size = Vec2::new(
            row_gutter + cell_w * n_cols,
            col_header + cell_h * n_rows,
        );
        let (rect, _) = ui.allocate_exact_size(total_size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();

        // Column labels
        for (c, label) in tab.col_labels.iter().enumerate() {
            let x = rect.left() + row_gutter + cell_w * (c as f32 + 0.5);
            painter.text(
                Pos2::new(x, rect.top() + col_header - 6.0),
                Align2::CENTER_BOTTOM,
                Self::truncate_label(label, 14),
                FontId::proportional(10.0),
                text_color,
            );
        }

        for (r, row_label) in tab.row_labels.iter().enumerate() {
            let y = rect.top() + col_header + cell_h * r as f32;

            painter.text(
                Pos2::new(rect.left() + row_gutter - 8.0, y + cell_h / 2.0),
                Align2::RIGHT_CENTER,
                Self::truncate_label(row_label, 22),
                FontId::proportional(10.0),
                text_color,
            );

            for (c, _) in tab.col_labels.iter().enumerate() {
                let count = tab.counts[r][c];
                let cell = egui::Rect::from_min_size(
                    Pos2::new(rect.left() + row_gutter + cell_w * c as f32, y),
                    Vec2::new(cell_w - 2.0, cell_h - 2.0),
                );

                let intensity = count as f32 / max;
                painter.rect_filled(
                    cell,
                    2.0,
                    HEAT_COLOR.gamma_multiply(0.15 + 0.85 * intensity),
                );
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    count.to_string(),
                    FontId::proportional(11.0),
                    if intensity > 0.55 {
                        Color32::WHITE
                    } else {
                        text_color
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_labels() {
        assert_eq!(ChartPlotter::truncate_label("Noturno", 18), "Noturno");
    }

    #[test]
    fn truncate_shortens_with_ellipsis() {
        let long = "Ciências Exatas e Sustentabilidade Tecnológica";
        let short = ChartPlotter::truncate_label(long, 18);
        assert!(short.ends_with('…'));
        assert!(short.chars().count() <= 18);
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(ChartPlotter::slice_color(0), ChartPlotter::slice_color(10));
    }
}
