use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, MarkerShape, Plot, Points};

use crate::chart::{AnimatedScatterChart, GroupedBarChart};
use crate::state::Playback;
use crate::ui::panels::{chart_title, empty_chart};

/// Share of a category slot taken by its group of bars.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Grouped bar chart
// ---------------------------------------------------------------------------

/// `x` offset of series `index` of `count` inside its category slot.
fn bar_offset(index: usize, count: usize) -> f64 {
    let width = GROUP_WIDTH / count as f64;
    -GROUP_WIDTH / 2.0 + width * (index as f64 + 0.5)
}

/// Category label for an axis mark, blank between categories.
fn category_label(categories: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

/// Render the location grouped bar chart.
pub fn grouped_bar(ui: &mut Ui, chart: &GroupedBarChart) {
    chart_title(ui, chart.title);
    if chart.is_empty() {
        empty_chart(ui);
        return;
    }

    let categories = chart.categories.clone();
    let count = chart.series.len();
    let width = GROUP_WIDTH / count as f64;

    Plot::new("location_performance")
        .legend(Legend::default())
        .x_axis_label(chart.x_title)
        .y_axis_label(chart.y_title)
        .x_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
        .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (si, series) in chart.series.iter().enumerate() {
                let offset = bar_offset(si, count);
                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .zip(&chart.categories)
                    .enumerate()
                    .map(|(ci, (value, location))| {
                        Bar::new(ci as f64 + offset, *value)
                            .width(width)
                            .name(format!("{location}: {value:.2}"))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(series.metric.label())
                        .color(series.color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Animated product scatter
// ---------------------------------------------------------------------------

/// Render the product scatter with its play / pause control and frame slider.
pub fn animated_scatter(ui: &mut Ui, chart: &AnimatedScatterChart, playback: &mut Playback) {
    chart_title(ui, chart.title);
    if chart.is_empty() {
        empty_chart(ui);
        return;
    }

    let last = chart.frames.len() - 1;
    let current = playback.frame().min(last);
    let frame = &chart.frames[current];

    ui.horizontal(|ui: &mut Ui| {
        let icon = if playback.is_playing() { "⏸" } else { "▶" };
        if ui.button(icon).clicked() {
            playback.toggle();
        }
        let mut index = current;
        let slider = egui::Slider::new(&mut index, 0..=last).show_value(false);
        if ui.add_enabled(last > 0, slider).changed() {
            playback.seek(index);
        }
        ui.label(format!("{} = {}", chart.frame_title, frame.label));
    });

    Plot::new("product_interaction")
        .legend(Legend::default())
        .x_axis_label(chart.x_title)
        .y_axis_label(chart.y_title)
        .include_x(chart.x_range[0])
        .include_x(chart.x_range[1])
        .include_y(chart.y_range[0])
        .include_y(chart.y_range[1])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for trace in &frame.traces {
                for point in &trace.points {
                    plot_ui.points(
                        Points::new(vec![[point.x, point.y]])
                            .name(&trace.name)
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(point.diameter / 2.0)
                            .color(trace.color.gamma_multiply(0.8)),
                    );
                }
            }
        });
}
