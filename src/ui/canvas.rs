use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui, pos2, vec2,
};

use crate::chart::{MarkerSymbol, PieChart, Scatter3dChart};
use crate::state::Camera;
use crate::ui::panels::{chart_title, empty_chart};

const GRID_COLOR: Color32 = Color32::from_gray(220);
const AXIS_TEXT: Color32 = Color32::from_gray(90);
const LEGEND_WIDTH: f32 = 110.0;

// ---------------------------------------------------------------------------
// Donut chart
// ---------------------------------------------------------------------------

/// Angle step used to approximate arcs.
const ARC_STEP: f32 = 0.05;

/// Draw the satisfaction donut with slice labels and a legend.
pub fn pie_chart(ui: &mut Ui, chart: &PieChart) {
    chart_title(ui, chart.title);
    if chart.is_empty() {
        empty_chart(ui);
        return;
    }

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);

    let pie_rect = Rect::from_min_max(rect.min, pos2(rect.max.x - LEGEND_WIDTH, rect.max.y));
    let center = pie_rect.center();
    let outer = 0.45 * pie_rect.width().min(pie_rect.height());
    let inner = outer * chart.hole;

    // Slices run clockwise from twelve o'clock.
    let mut start = -FRAC_PI_2;
    let mut spans = Vec::with_capacity(chart.slices.len());
    for slice in &chart.slices {
        let sweep = slice.fraction as f32 * TAU;
        annulus_sector(&painter, center, inner, outer, start, start + sweep, slice.color);
        spans.push((start, start + sweep));

        if slice.fraction > 0.04 {
            let mid = start + sweep / 2.0;
            let r = (inner + outer) / 2.0;
            painter.text(
                center + vec2(mid.cos(), mid.sin()) * r,
                Align2::CENTER_CENTER,
                format!("{}\n{:.1}%", slice.label, slice.fraction * 100.0),
                FontId::proportional(11.0),
                contrast_text(slice.color),
            );
        }
        start += sweep;
    }

    // Slice separators
    for (a, _) in &spans {
        let dir = vec2(a.cos(), a.sin());
        painter.line_segment(
            [center + dir * inner, center + dir * outer],
            Stroke::new(1.0, Color32::WHITE),
        );
    }

    legend(
        &painter,
        pos2(pie_rect.max.x + 8.0, rect.min.y + 8.0),
        chart.slices.iter().map(|s| (s.label.as_str(), s.color, MarkerSymbol::Square)),
    );

    if let Some(pos) = response.hover_pos() {
        let offset = pos - center;
        let dist = offset.length();
        if dist >= inner && dist <= outer {
            let angle = (offset.y.atan2(offset.x) + FRAC_PI_2).rem_euclid(TAU) - FRAC_PI_2;
            if let Some(i) = spans.iter().position(|(a, b)| angle >= *a && angle < *b) {
                let slice = &chart.slices[i];
                response.on_hover_text_at_pointer(format!(
                    "Satisfaction_Score={}\nvalue={}\n{:.1}%",
                    slice.label,
                    slice.value,
                    slice.fraction * 100.0
                ));
            }
        }
    }
}

/// Fill the ring sector between `a0` and `a1` with convex quads.
fn annulus_sector(
    painter: &Painter,
    center: Pos2,
    inner: f32,
    outer: f32,
    a0: f32,
    a1: f32,
    color: Color32,
) {
    let steps = ((a1 - a0) / ARC_STEP).ceil().max(1.0) as usize;
    let step = (a1 - a0) / steps as f32;
    for i in 0..steps {
        let s = a0 + step * i as f32;
        let e = s + step;
        let (ds, de) = (vec2(s.cos(), s.sin()), vec2(e.cos(), e.sin()));
        painter.add(Shape::convex_polygon(
            vec![center + ds * outer, center + de * outer, center + de * inner, center + ds * inner],
            color,
            Stroke::new(0.5, color),
        ));
    }
}

fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 150.0 {
        Color32::from_gray(30)
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// 3D scatter
// ---------------------------------------------------------------------------

/// Cube corners `(x, y, z)` in normalised space.
const CUBE_EDGES: [([f32; 3], [f32; 3]); 12] = [
    ([-1.0, -1.0, -1.0], [1.0, -1.0, -1.0]),
    ([-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]),
    ([-1.0, -1.0, 1.0], [1.0, -1.0, 1.0]),
    ([-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]),
    ([-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]),
    ([1.0, -1.0, -1.0], [1.0, 1.0, -1.0]),
    ([-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0]),
    ([1.0, -1.0, 1.0], [1.0, 1.0, 1.0]),
    ([-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0]),
    ([1.0, -1.0, -1.0], [1.0, -1.0, 1.0]),
    ([-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]),
    ([1.0, 1.0, -1.0], [1.0, 1.0, 1.0]),
];

/// Map `v` from `[min, max]` into `[-1, 1]`; a flat axis maps to 0.
fn normalise(v: f64, [min, max]: [f64; 2]) -> f32 {
    if (max - min).abs() < f64::EPSILON {
        0.0
    } else {
        (2.0 * (v - min) / (max - min) - 1.0) as f32
    }
}

/// Draw the 3D scatter; drag orbits the camera, double-click resets it.
pub fn scatter_3d(ui: &mut Ui, chart: &Scatter3dChart, camera: &mut Camera) {
    chart_title(ui, chart.title);
    let Some(bounds) = chart.bounds() else {
        empty_chart(ui);
        return;
    };

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    if response.dragged() {
        camera.orbit(response.drag_delta());
    }
    if response.double_clicked() {
        camera.reset();
    }

    let painter = ui.painter_at(rect);
    let plot_rect = Rect::from_min_max(rect.min, pos2(rect.max.x - LEGEND_WIDTH, rect.max.y));
    let center = plot_rect.center();
    let scale = 0.32 * plot_rect.width().min(plot_rect.height());
    let to_screen = |p: [f32; 3]| -> (Pos2, f32) {
        let ([x, y], depth) = camera.project(p);
        (center + vec2(x, -y) * scale, depth)
    };

    for (a, b) in CUBE_EDGES {
        painter.line_segment([to_screen(a).0, to_screen(b).0], Stroke::new(1.0, GRID_COLOR));
    }

    // Axis titles and extremes along the edges leaving the (-1, -1, -1) corner.
    for (axis, title) in chart.axis_titles.iter().enumerate() {
        let mut end = [-1.0_f32; 3];
        end[axis] = 1.0;
        let (start_pos, _) = to_screen([-1.0, -1.0, -1.0]);
        let (end_pos, _) = to_screen(end);
        let font = FontId::proportional(10.0);
        painter.text(
            end_pos + (end_pos - start_pos).normalized() * 14.0,
            Align2::CENTER_CENTER,
            title,
            font.clone(),
            AXIS_TEXT,
        );
        painter.text(
            end_pos,
            Align2::LEFT_TOP,
            format_tick(bounds[axis][1]),
            font.clone(),
            AXIS_TEXT,
        );
        if axis == 0 {
            painter.text(start_pos, Align2::RIGHT_TOP, format_tick(bounds[axis][0]), font, AXIS_TEXT);
        }
    }

    // Back-to-front so nearer markers overlap farther ones.
    let mut markers: Vec<(Pos2, f32, usize, [f64; 3])> = chart
        .traces
        .iter()
        .enumerate()
        .flat_map(|(ti, trace)| trace.points.iter().map(move |p| (ti, *p)))
        .map(|(ti, p)| {
            let n = [
                normalise(p[0], bounds[0]),
                normalise(p[1], bounds[1]),
                normalise(p[2], bounds[2]),
            ];
            let (pos, depth) = to_screen(n);
            (pos, depth, ti, p)
        })
        .collect();
    markers.sort_by(|a, b| a.1.total_cmp(&b.1));

    let style = chart.marker;
    let outline = Stroke::new(style.line_width, style.line_color);
    for (pos, _, ti, _) in &markers {
        let trace = &chart.traces[*ti];
        let fill = trace.color.gamma_multiply(style.opacity);
        draw_marker(&painter, *pos, style.size, trace.symbol, fill, outline);
    }

    legend(
        &painter,
        pos2(plot_rect.max.x + 8.0, rect.min.y + 8.0),
        chart.traces.iter().map(|t| (t.name.as_str(), t.color, t.symbol)),
    );

    if let Some(pointer) = response.hover_pos() {
        let hit = markers
            .iter()
            .rev()
            .find(|(pos, ..)| pos.distance(pointer) <= style.size.max(6.0));
        if let Some((_, _, ti, p)) = hit {
            let [x, y, z] = chart.axis_titles;
            response.on_hover_text_at_pointer(format!(
                "{}\n{x}={}\n{y}={}\n{z}={}",
                chart.traces[*ti].name,
                p[0],
                p[1],
                p[2]
            ));
        }
    }
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

fn draw_marker(
    painter: &Painter,
    pos: Pos2,
    diameter: f32,
    symbol: MarkerSymbol,
    fill: Color32,
    outline: Stroke,
) {
    let r = diameter / 2.0;
    match symbol {
        MarkerSymbol::Circle => {
            painter.circle(pos, r, fill, outline);
        }
        MarkerSymbol::Diamond => {
            painter.add(Shape::convex_polygon(
                vec![
                    pos + vec2(0.0, -r * 1.3),
                    pos + vec2(r * 1.3, 0.0),
                    pos + vec2(0.0, r * 1.3),
                    pos + vec2(-r * 1.3, 0.0),
                ],
                fill,
                outline,
            ));
        }
        MarkerSymbol::Square => {
            painter.add(Shape::convex_polygon(
                vec![
                    pos + vec2(-r, -r),
                    pos + vec2(r, -r),
                    pos + vec2(r, r),
                    pos + vec2(-r, r),
                ],
                fill,
                outline,
            ));
        }
        MarkerSymbol::Cross => {
            let stroke = Stroke::new(r * 0.8, fill);
            painter.line_segment([pos + vec2(-r, 0.0), pos + vec2(r, 0.0)], stroke);
            painter.line_segment([pos + vec2(0.0, -r), pos + vec2(0.0, r)], stroke);
        }
        MarkerSymbol::X => {
            let stroke = Stroke::new(r * 0.8, fill);
            painter.line_segment([pos + vec2(-r, -r), pos + vec2(r, r)], stroke);
            painter.line_segment([pos + vec2(-r, r), pos + vec2(r, -r)], stroke);
        }
    }
}

/// Vertical legend of `(label, colour, symbol)` entries starting at `top_left`.
fn legend<'a>(
    painter: &Painter,
    top_left: Pos2,
    entries: impl Iterator<Item = (&'a str, Color32, MarkerSymbol)>,
) {
    let row_height = 16.0;
    for (i, (label, color, symbol)) in entries.enumerate() {
        let y = top_left.y + i as f32 * row_height;
        draw_marker(painter, pos2(top_left.x + 5.0, y + 6.0), 9.0, symbol, color, Stroke::NONE);
        painter.text(
            pos2(top_left.x + 14.0, y),
            Align2::LEFT_TOP,
            label,
            FontId::proportional(11.0),
            Color32::from_gray(40),
        );
    }
}
