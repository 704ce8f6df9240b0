use std::time::Duration;

use eframe::egui;

use crate::data::model::CustomerDataset;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, dataset: CustomerDataset) -> Self {
        // Charts use a white template.
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            state: AppState::new(dataset),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Animation clock ----
        let now = ctx.input(|i| i.time);
        let frame_count = self.state.charts.products.frames.len();
        self.state.playback.tick(now, frame_count);
        if self.state.playback.is_playing() {
            ctx.request_repaint_after(Duration::from_secs_f64(self.state.playback.remaining(now)));
        }

        // ---- Top panel: heading ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::chart_grid(ui, &mut self.state);
        });
    }
}
