/// Rendering: panels and chart grid in `panels`, egui_plot charts in
/// `plot`, painter-drawn donut and 3D scatter in `canvas`.
pub mod canvas;
pub mod panels;
pub mod plot;
