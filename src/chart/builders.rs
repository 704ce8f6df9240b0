use crate::color::{
    self, CategoryColors, DARK_SLATE_GREY, METRIC_COLORS, PLASMA_R, RETENTION_3D,
    RETENTION_PRODUCTS,
};
use crate::data::aggregate::{MetricRow, aggregate_by_location, melt};
use crate::data::model::{CustomerRecord, RetentionStatus, ScoreKey};

use super::{
    AnimatedScatterChart, AnimationFrame, BarSeries, DashboardCharts, GroupedBarChart,
    MarkerStyle, MarkerSymbol, PRODUCT_SIZE_MAX, PieChart, PieSlice, Scatter3dChart,
    ScatterTrace, SizedPoint, Trace3d,
};

/// Run the aggregation stage and all four builders over one subset.
pub fn build_dashboard(subset: &[&CustomerRecord]) -> DashboardCharts {
    let tidy = melt(&aggregate_by_location(subset));
    DashboardCharts {
        satisfaction: satisfaction_pie(subset),
        age_satisfaction: age_satisfaction_3d(subset),
        location: location_performance(&tidy),
        products: product_interaction(subset),
    }
}

/// Retention statuses in order of first appearance.
fn statuses_in_order(subset: &[&CustomerRecord]) -> Vec<RetentionStatus> {
    let mut seen = Vec::new();
    for rec in subset {
        if !seen.contains(&rec.retention_status) {
            seen.push(rec.retention_status);
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Satisfaction donut
// ---------------------------------------------------------------------------

/// One slice per distinct satisfaction score, sized by the summed score.
pub fn satisfaction_pie(subset: &[&CustomerRecord]) -> PieChart {
    // (score, summed value) in first-appearance order
    let mut groups: Vec<(ScoreKey, f64)> = Vec::new();
    for rec in subset {
        let key = ScoreKey(rec.satisfaction_score);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some(group) => group.1 += rec.satisfaction_score,
            None => groups.push((key, rec.satisfaction_score)),
        }
    }

    let mut colors = CategoryColors::sequence(&PLASMA_R);
    let mut slices: Vec<PieSlice> = groups
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(key, value)| {
            let label = key.to_string();
            PieSlice {
                color: colors.color_for(&label),
                label,
                value,
                fraction: 0.0,
            }
        })
        .collect();

    let total: f64 = slices.iter().map(|s| s.value).sum();
    for slice in &mut slices {
        slice.fraction = slice.value / total;
    }
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));

    PieChart {
        title: "Customer Satisfaction Snapshot",
        hole: 0.4,
        slices,
    }
}

// ---------------------------------------------------------------------------
// Age / satisfaction / time-on-site 3D scatter
// ---------------------------------------------------------------------------

pub fn age_satisfaction_3d(subset: &[&CustomerRecord]) -> Scatter3dChart {
    let mut colors = CategoryColors::discrete(&RETENTION_3D);
    let traces = statuses_in_order(subset)
        .into_iter()
        .enumerate()
        .map(|(i, status)| Trace3d {
            name: status.to_string(),
            color: colors.color_for(status.as_str()),
            symbol: MarkerSymbol::SEQUENCE[i % MarkerSymbol::SEQUENCE.len()],
            points: subset
                .iter()
                .filter(|r| r.retention_status == status)
                .map(|r| [r.age as f64, r.satisfaction_score, r.time_spent_on_site])
                .collect(),
        })
        .collect();

    Scatter3dChart {
        title: "3D Insight: Age, Satisfaction & Site Engagement",
        axis_titles: ["Age", "Satisfaction_Score", "Time_Spent_on_Site"],
        marker: MarkerStyle {
            size: 5.0,
            opacity: 0.8,
            line_width: 0.5,
            line_color: color::hex(DARK_SLATE_GREY),
        },
        traces,
    }
}

// ---------------------------------------------------------------------------
// Location grouped bar
// ---------------------------------------------------------------------------

/// Bars grouped by location, one series per metric, from the long form.
pub fn location_performance(rows: &[MetricRow]) -> GroupedBarChart {
    let mut categories: Vec<String> = Vec::new();
    let mut metrics = Vec::new();
    for row in rows {
        if !categories.contains(&row.location) {
            categories.push(row.location.clone());
        }
        if !metrics.contains(&row.metric) {
            metrics.push(row.metric);
        }
    }

    let mut colors = CategoryColors::sequence(&METRIC_COLORS);
    let series = metrics
        .into_iter()
        .map(|metric| BarSeries {
            metric,
            color: colors.color_for(metric.tag()),
            values: categories
                .iter()
                .map(|loc| {
                    rows.iter()
                        .find(|r| r.metric == metric && r.location == *loc)
                        .map_or(0.0, |r| r.value)
                })
                .collect(),
        })
        .collect();

    GroupedBarChart {
        title: "Location Performance: Satisfaction & Feedback",
        x_title: "Location",
        y_title: "Average_Score",
        categories,
        series,
    }
}

// ---------------------------------------------------------------------------
// Animated product scatter
// ---------------------------------------------------------------------------

/// Marker diameter proportional to the square root of `value / max`, so
/// marker area tracks the value.
pub fn marker_diameter(value: f64, max: f64) -> f32 {
    if max <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    PRODUCT_SIZE_MAX * (value / max).sqrt() as f32
}

/// `[min, max]` padded by 5%; a degenerate span widens to ±1.
fn padded_range(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return [0.0, 1.0];
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo - span * 0.05, hi + span * 0.05]
    }
}

pub fn product_interaction(subset: &[&CustomerRecord]) -> AnimatedScatterChart {
    let statuses = statuses_in_order(subset);
    let max_time = subset
        .iter()
        .map(|r| r.time_spent_on_site)
        .fold(0.0_f64, f64::max);

    // Frames in order of first appearance, like an unsorted group-by.
    let mut scores: Vec<ScoreKey> = Vec::new();
    for rec in subset {
        let key = ScoreKey(rec.satisfaction_score);
        if !scores.contains(&key) {
            scores.push(key);
        }
    }

    let mut colors = CategoryColors::discrete(&RETENTION_PRODUCTS);
    let status_colors: Vec<_> = statuses
        .iter()
        .map(|s| (*s, colors.color_for(s.as_str())))
        .collect();

    let frames = scores
        .into_iter()
        .map(|score| AnimationFrame {
            label: score.to_string(),
            traces: status_colors
                .iter()
                .map(|(status, color)| ScatterTrace {
                    name: status.to_string(),
                    color: *color,
                    points: subset
                        .iter()
                        .filter(|r| {
                            r.retention_status == *status
                                && ScoreKey(r.satisfaction_score) == score
                        })
                        .map(|r| SizedPoint {
                            x: r.products_purchased as f64,
                            y: r.products_viewed as f64,
                            diameter: marker_diameter(r.time_spent_on_site, max_time),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    AnimatedScatterChart {
        title: "Animated: Product Interaction Dynamics & Retention",
        x_title: "Products_Purchased",
        y_title: "Products_Viewed",
        frame_title: "Satisfaction_Score",
        x_range: padded_range(subset.iter().map(|r| r.products_purchased as f64)),
        y_range: padded_range(subset.iter().map(|r| r.products_viewed as f64)),
        frames,
    }
}
