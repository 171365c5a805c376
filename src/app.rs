use eframe::egui;

use crate::state::FigureState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyFrameApp {
    pub state: FigureState,
}

impl RustyFrameApp {
    pub fn new(state: FigureState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyFrameApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: summary bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: memory table ----
        if self.state.memory.is_some() {
            egui::SidePanel::left("memory_panel")
                .default_width(360.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &self.state);
                });
        }

        // ---- Central panel: 2×2 figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure(ui, &self.state);
        });
    }
}

/// Open the viewer window and block until it is closed.
pub fn run_viewer(state: FigureState) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Frame – Subset Plots",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyFrameApp::new(state)))),
    )
}
