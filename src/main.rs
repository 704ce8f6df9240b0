mod app;
mod chart;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::anyhow;
use app::DashboardApp;
use clap::Parser;
use eframe::egui;

/// Interactive customer experience dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Customer table to load (.csv, .json or .parquet).
    #[arg(
        short,
        long,
        env = "CX_DASHBOARD_DATA",
        default_value = "customer_experience_data.csv"
    )]
    data: PathBuf,

    /// Initial window width in points.
    #[arg(long, default_value_t = 1400.0)]
    width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 900.0)]
    height: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = match data::loader::load_file(&args.data) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load dataset: {e:#}");
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Customer Experience Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, dataset)))),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}
