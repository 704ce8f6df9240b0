/// Declarative chart descriptions for the four dashboard widgets.
///
/// The builders in [`builders`] turn a filtered subset into these values;
/// `ui` only draws them. Nothing here touches egui state.
pub mod builders;

use eframe::egui::Color32;

use crate::data::aggregate::Metric;

/// Largest marker diameter on the animated product scatter, in points.
pub const PRODUCT_SIZE_MAX: f32 = 20.0;

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the total, in `0..=1`.
    pub fraction: f64,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: &'static str,
    /// Inner radius as a fraction of the outer radius.
    pub hole: f32,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// 3D scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSymbol {
    Circle,
    Diamond,
    Square,
    Cross,
    X,
}

impl MarkerSymbol {
    /// Symbol sequence assigned to traces in order.
    pub const SEQUENCE: [MarkerSymbol; 5] = [
        MarkerSymbol::Circle,
        MarkerSymbol::Diamond,
        MarkerSymbol::Square,
        MarkerSymbol::Cross,
        MarkerSymbol::X,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Diameter in points.
    pub size: f32,
    pub opacity: f32,
    pub line_width: f32,
    pub line_color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace3d {
    pub name: String,
    pub color: Color32,
    pub symbol: MarkerSymbol,
    /// `[x, y, z]` in data units.
    pub points: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter3dChart {
    pub title: &'static str,
    pub axis_titles: [&'static str; 3],
    pub marker: MarkerStyle,
    pub traces: Vec<Trace3d>,
}

impl Scatter3dChart {
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.points.is_empty())
    }

    /// Per-axis `[min, max]` over every trace, or `None` without points.
    pub fn bounds(&self) -> Option<[[f64; 2]; 3]> {
        let mut bounds: Option<[[f64; 2]; 3]> = None;
        for p in self.traces.iter().flat_map(|t| &t.points) {
            let b = bounds.get_or_insert([[p[0], p[0]], [p[1], p[1]], [p[2], p[2]]]);
            for axis in 0..3 {
                b[axis][0] = b[axis][0].min(p[axis]);
                b[axis][1] = b[axis][1].max(p[axis]);
            }
        }
        bounds
    }
}

// ---------------------------------------------------------------------------
// Grouped bar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub metric: Metric,
    pub color: Color32,
    /// One value per category, aligned with [`GroupedBarChart::categories`].
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarChart {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

impl GroupedBarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Animated scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedPoint {
    pub x: f64,
    pub y: f64,
    /// Marker diameter in points.
    pub diameter: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterTrace {
    pub name: String,
    pub color: Color32,
    pub points: Vec<SizedPoint>,
}

/// All points sharing one satisfaction score.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    /// Satisfaction score shown by this frame.
    pub label: String,
    pub traces: Vec<ScatterTrace>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedScatterChart {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub frame_title: &'static str,
    /// Axis ranges shared by every frame.
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub frames: Vec<AnimationFrame>,
}

impl AnimatedScatterChart {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// ---------------------------------------------------------------------------
// The whole dashboard
// ---------------------------------------------------------------------------

/// The four charts recomputed together on every filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCharts {
    pub satisfaction: PieChart,
    pub age_satisfaction: Scatter3dChart,
    pub location: GroupedBarChart,
    pub products: AnimatedScatterChart,
}
