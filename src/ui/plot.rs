use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridInput, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Polygon, Text,
};

use crate::color::{generate_palette, CoolWarm};
use crate::data::stats::CorrelationMatrix;
use crate::state::{CountSeries, FigureState, LineSeries};

/// Angular resolution of pie wedge outlines.
const ARC_STEP: f64 = TAU / 180.0;
const COLORBAR_STEPS: usize = 32;
const TITLE_HEIGHT: f32 = 24.0;

// ---------------------------------------------------------------------------
// 2×2 figure (central panel)
// ---------------------------------------------------------------------------

/// Render line, bar, pie and heatmap panels in a 2×2 grid.
pub fn figure(ui: &mut Ui, state: &FigureState) {
    let spacing = ui.spacing().item_spacing.y;
    let height = ((ui.available_height() - spacing) / 2.0 - TITLE_HEIGHT).max(120.0);

    ui.columns(2, |cols: &mut [Ui]| {
        titled(&mut cols[0], "Line Chart");
        match &state.line {
            Some(series) => line_panel(&mut cols[0], series, height),
            None => empty_panel(&mut cols[0], height, "no numeric line column"),
        }
        titled(&mut cols[0], "Pie Chart");
        match &state.pie {
            Some(series) => pie_panel(&mut cols[0], series, height),
            None => empty_panel(&mut cols[0], height, "no pie column"),
        }

        titled(&mut cols[1], "Bar Chart");
        match &state.bar {
            Some(series) => bar_panel(&mut cols[1], series, height),
            None => empty_panel(&mut cols[1], height, "no bar column"),
        }
        titled(&mut cols[1], "Correlation Heatmap");
        match &state.heatmap {
            Some(matrix) => heatmap_panel(&mut cols[1], matrix, height),
            None => empty_panel(&mut cols[1], height, "no numeric columns"),
        }
    });
}

fn titled(ui: &mut Ui, title: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(title).strong());
    });
}

fn empty_panel(ui: &mut Ui, height: f32, note: &str) {
    ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.weak(note);
        });
    });
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn line_panel(ui: &mut Ui, series: &LineSeries, height: f32) {
    let points: PlotPoints = series.points.iter().copied().collect();

    Plot::new("line_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("row")
        .y_axis_label(series.column.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name(&series.column)
                    .color(Color32::LIGHT_BLUE)
                    .width(1.0),
            );
        });
}

fn bar_panel(ui: &mut Ui, series: &CountSeries, height: f32) {
    let palette = generate_palette(series.counts.len());
    let bars: Vec<Bar> = series
        .counts
        .iter()
        .zip(palette)
        .enumerate()
        .map(|(i, ((label, n), color))| {
            Bar::new(i as f64, *n as f64)
                .name(label)
                .fill(color)
                .width(0.6)
        })
        .collect();

    let labels: Vec<String> = series.counts.iter().map(|(label, _)| label.clone()).collect();
    let n = labels.len();

    Plot::new("bar_chart")
        .height(height)
        .x_axis_label(series.column.as_str())
        .y_axis_label("count")
        .x_grid_spacer(index_marks(n, 0.0))
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn pie_panel(ui: &mut Ui, series: &CountSeries, height: f32) {
    let total = series.total();
    let palette = generate_palette(series.counts.len());

    Plot::new("pie_chart")
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            if total == 0 {
                return;
            }
            let mut start = 0.0;
            for ((label, n), color) in series.counts.iter().zip(palette) {
                let sweep = *n as f64 / total as f64 * TAU;
                for wedge in wedge_polygons(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(wedge))
                            .name(label)
                            .fill_color(color)
                            .stroke(Stroke::new(0.5, color)),
                    );
                }
                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                    label.as_str(),
                ));
                start += sweep;
            }
        });
}

fn heatmap_panel(ui: &mut Ui, matrix: &CorrelationMatrix, height: f32) {
    let n = matrix.size();
    let cmap = CoolWarm::default();
    let x_labels = matrix.names.clone();
    let y_labels: Vec<String> = matrix.names.iter().rev().cloned().collect();

    Plot::new("correlation_heatmap")
        .height(height)
        .data_aspect(1.0)
        .show_grid(false)
        .x_grid_spacer(index_marks(n, 0.5))
        .y_grid_spacer(index_marks(n, 0.5))
        .x_axis_formatter(move |mark, _range| category_label(&x_labels, mark.value - 0.5))
        .y_axis_formatter(move |mark, _range| category_label(&y_labels, mark.value - 0.5))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for row in 0..n {
                for col in 0..n {
                    let value = matrix.get(row, col);
                    let x = col as f64;
                    let y = (n - 1 - row) as f64;
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(rect(x, y, 1.0, 1.0)))
                            .fill_color(cmap.color_for(value))
                            .stroke(Stroke::NONE),
                    );
                    let label = if value.is_nan() {
                        "nan".to_string()
                    } else {
                        format!("{value:.2}")
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x + 0.5, y + 0.5), label).color(Color32::BLACK),
                    );
                }
            }

            // Colour bar to the right of the matrix.
            let bar_x = n as f64 + 0.3;
            let step = n as f64 / COLORBAR_STEPS as f64;
            for s in 0..COLORBAR_STEPS {
                let value = -1.0 + 2.0 * (s as f64 + 0.5) / COLORBAR_STEPS as f64;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(rect(bar_x, s as f64 * step, 0.3, step)))
                        .fill_color(cmap.color_for(value))
                        .stroke(Stroke::NONE),
                );
            }
            for (value, y) in [(-1.0, 0.0), (0.0, n as f64 / 2.0), (1.0, n as f64)] {
                plot_ui.text(Text::new(
                    PlotPoint::new(bar_x + 0.6, y),
                    format!("{value:.0}"),
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
}

/// Outline of a unit-circle wedge from `start` sweeping `sweep` radians,
/// split into convex pieces of at most a quarter turn.
fn wedge_polygons(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece = sweep / pieces as f64;
    (0..pieces)
        .map(|p| {
            let a0 = start + piece * p as f64;
            let segments = ((piece / ARC_STEP).ceil() as usize).max(1);
            let mut points = Vec::with_capacity(segments + 2);
            points.push([0.0, 0.0]);
            for s in 0..=segments {
                let a = a0 + piece * s as f64 / segments as f64;
                points.push([a.cos(), a.sin()]);
            }
            points
        })
        .collect()
}

/// One grid mark per category, centred at `i + offset`.
fn index_marks(count: usize, offset: f64) -> impl Fn(GridInput) -> Vec<GridMark> + 'static {
    move |_input| {
        (0..count)
            .map(|i| GridMark {
                value: i as f64 + offset,
                step_size: 1.0,
            })
            .collect()
    }
}

/// Label at an integral `position`, empty elsewhere.
fn category_label(labels: &[String], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
