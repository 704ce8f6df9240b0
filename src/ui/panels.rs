use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Size, StripBuilder};

use crate::state::AppState;
use crate::ui::{canvas, plot};

const HEADING_COLOR: Color32 = Color32::from_rgb(0x4a, 0x14, 0x8c);
const SUBTITLE_COLOR: Color32 = Color32::from_rgb(0x00, 0x4d, 0x40);
const FILTER_HEADING_COLOR: Color32 = Color32::from_rgb(0xd3, 0x2f, 0x2f);

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the dashboard heading and the visible-customer counter.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(6.0);
        ui.label(
            RichText::new("Interactive Customer Experience Dashboard")
                .heading()
                .strong()
                .color(HEADING_COLOR),
        );
        ui.label(
            RichText::new(
                "Explore customer data to understand satisfaction, behavior, and retention. \
                 Use the filters below to customize your view.",
            )
            .color(SUBTITLE_COLOR),
        );
        ui.label(format!(
            "{} of {} customers",
            state.visible_count,
            state.dataset.len()
        ));
        ui.add_space(4.0);
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("Customize Your Data View")
                .heading()
                .color(FILTER_HEADING_COLOR),
        );
    });
    ui.separator();

    // ---- Age range ----
    ui.strong("Filter by Age Range:");
    let (lo, hi) = state.dataset.age_bounds;
    let mut min = state.filters.age_min;
    let mut max = state.filters.age_max;
    let min_changed = ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("from"))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("to"))
        .changed();
    if min_changed && min > max {
        max = min;
    }
    if max_changed && max < min {
        min = max;
    }
    if min_changed || max_changed {
        state.set_age_range(min, max);
    }
    ui.add_space(12.0);

    // ---- Locations ----
    let n_selected = state.filters.locations.len();
    let n_total = state.dataset.locations.len();
    ui.strong(format!("Filter by Customer Location:  ({n_selected}/{n_total})"));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_locations();
        }
        if ui.small_button("None").clicked() {
            state.select_no_locations();
        }
    });

    // Toggle after the loop; the loop borrows the location list.
    let mut toggled: Option<String> = None;
    ScrollArea::vertical()
        .max_height(240.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for loc in &state.dataset.locations {
                let mut checked = state.filters.locations.contains(loc);
                if ui.checkbox(&mut checked, loc.as_str()).changed() {
                    toggled = Some(loc.clone());
                }
            }
        });
    if let Some(loc) = toggled {
        state.toggle_location(&loc);
    }

    if n_selected == 0 {
        ui.label(RichText::new("Select one or more locations").weak());
    }

    ui.separator();
    if ui.button("Reset filters").clicked() {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Chart grid
// ---------------------------------------------------------------------------

/// Two rows of two chart cards.
pub fn chart_grid(ui: &mut Ui, state: &mut AppState) {
    StripBuilder::new(ui)
        .size(Size::relative(0.5))
        .size(Size::remainder())
        .vertical(|mut strip| {
            strip.strip(|builder| {
                builder.sizes(Size::remainder(), 2).horizontal(|mut strip| {
                    strip.cell(|ui| {
                        chart_card(ui, "Distribution of customer satisfaction scores.", |ui| {
                            canvas::pie_chart(ui, &state.charts.satisfaction);
                        });
                    });
                    strip.cell(|ui| {
                        chart_card(
                            ui,
                            "3D view: Age, Satisfaction, Site Time, and Retention.",
                            |ui| {
                                canvas::scatter_3d(
                                    ui,
                                    &state.charts.age_satisfaction,
                                    &mut state.camera,
                                );
                            },
                        );
                    });
                });
            });
            strip.strip(|builder| {
                builder.sizes(Size::remainder(), 2).horizontal(|mut strip| {
                    strip.cell(|ui| {
                        chart_card(ui, "Average scores by customer location.", |ui| {
                            plot::grouped_bar(ui, &state.charts.location);
                        });
                    });
                    strip.cell(|ui| {
                        chart_card(
                            ui,
                            "Product interaction animated by satisfaction score.",
                            |ui| {
                                plot::animated_scatter(
                                    ui,
                                    &state.charts.products,
                                    &mut state.playback,
                                );
                            },
                        );
                    });
                });
            });
        });
}

/// A framed card: the chart fills the space above a one-line caption.
fn chart_card(ui: &mut Ui, caption: &str, add_chart: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style())
        .fill(Color32::WHITE)
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            let caption_height = ui.text_style_height(&egui::TextStyle::Small) + 8.0;
            let chart_size = egui::vec2(
                ui.available_width(),
                (ui.available_height() - caption_height).max(80.0),
            );
            ui.allocate_ui(chart_size, |ui: &mut Ui| {
                ui.set_min_size(chart_size);
                add_chart(ui);
            });
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(caption).small());
            });
        });
}

/// Centred chart title.
pub fn chart_title(ui: &mut Ui, title: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(title);
    });
}

/// Placeholder for a chart with nothing to draw.
pub fn empty_chart(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new("No data for the current filters").weak());
    });
}
