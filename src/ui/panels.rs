use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{FigureState, MemorySummary};

// ---------------------------------------------------------------------------
// Left side panel – per-column memory table
// ---------------------------------------------------------------------------

/// Render the before/after memory table.
pub fn side_panel(ui: &mut Ui, state: &FigureState) {
    ui.heading("Memory");
    ui.separator();

    let Some(summary) = &state.memory else {
        ui.label("No memory report.");
        return;
    };

    memory_table(ui, summary);
}

fn memory_table(ui: &mut Ui, summary: &MemorySummary) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .columns(Column::auto(), 4)
        .header(20.0, |mut header| {
            for title in ["Column", "Before", "After", "MB before", "MB after"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (name, before) in &summary.initial.columns {
                let after = summary.optimized.get(name);
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(name.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(before.dtype.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        let dtype = after.map_or("-", |m| m.dtype.as_str());
                        let mut text = RichText::new(dtype);
                        if dtype != before.dtype {
                            text = text.color(Color32::LIGHT_GREEN);
                        }
                        ui.label(text);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.monospace(format!("{:.3}", before.memory_mb));
                    });
                    row.col(|ui: &mut Ui| {
                        let mb = after.map_or(f64::NAN, |m| m.memory_mb);
                        ui.monospace(format!("{mb:.3}"));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the summary bar above the figure.
pub fn top_bar(ui: &mut Ui, state: &FigureState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(format!("{} rows in subset", state.rows));

        if let Some(summary) = &state.memory {
            ui.separator();
            ui.label(format!(
                "memory {:.2} MB → {:.2} MB",
                summary.initial.total_mb, summary.optimized.total_mb
            ));
            if let Some(saved) = saving_percent(summary) {
                ui.label(RichText::new(format!("(-{saved:.1}%)")).color(Color32::LIGHT_GREEN));
            }
        }

        ui.separator();
        ui.label(format!("{} of 4 panels", state.panel_count()));
    });
}

/// Share of the initial footprint removed by optimization.
fn saving_percent(summary: &MemorySummary) -> Option<f64> {
    let initial = summary.initial.total_mb;
    (initial > 0.0).then(|| (1.0 - summary.optimized.total_mb / initial) * 100.0)
}
