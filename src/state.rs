use eframe::egui::Vec2;

use crate::chart::DashboardCharts;
use crate::chart::builders::build_dashboard;
use crate::data::filter::FilterState;
use crate::data::model::CustomerDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Table loaded at startup. Read-only.
    pub dataset: CustomerDataset,

    /// Current age range and location selection.
    pub filters: FilterState,

    /// Number of customers passing the current filters.
    pub visible_count: usize,

    /// Charts for the current filters, rebuilt by [`AppState::refilter`].
    pub charts: DashboardCharts,

    /// Animated scatter player.
    pub playback: Playback,

    /// Orbit camera of the 3D scatter.
    pub camera: Camera,
}

impl AppState {
    /// Start with every customer visible.
    pub fn new(dataset: CustomerDataset) -> Self {
        let filters = FilterState::full(&dataset);
        let subset = filters.apply(&dataset);
        let visible_count = subset.len();
        let charts = build_dashboard(&subset);
        Self {
            dataset,
            filters,
            visible_count,
            charts,
            playback: Playback::default(),
            camera: Camera::default(),
        }
    }

    /// Recompute the subset and all four charts after a filter change.
    pub fn refilter(&mut self) {
        let subset = self.filters.apply(&self.dataset);
        self.visible_count = subset.len();
        self.charts = build_dashboard(&subset);
        self.playback.clamp(self.charts.products.frames.len());
        log::debug!(
            "ages {}-{}, {} locations: {} of {} customers",
            self.filters.age_min,
            self.filters.age_max,
            self.filters.locations.len(),
            self.visible_count,
            self.dataset.len()
        );
    }

    /// Set the age range, clamped to the observed bounds and kept ordered.
    pub fn set_age_range(&mut self, min: u32, max: u32) {
        let (lo, hi) = self.dataset.age_bounds;
        let min = min.clamp(lo, hi);
        let max = max.clamp(lo, hi);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if (min, max) == (self.filters.age_min, self.filters.age_max) {
            return;
        }
        self.filters.age_min = min;
        self.filters.age_max = max;
        self.refilter();
    }

    /// Toggle a single location in the selection.
    pub fn toggle_location(&mut self, location: &str) {
        if !self.filters.locations.remove(location) {
            self.filters.locations.insert(location.to_string());
        }
        self.refilter();
    }

    /// Select every location.
    pub fn select_all_locations(&mut self) {
        self.filters.locations = self.dataset.locations.iter().cloned().collect();
        self.refilter();
    }

    /// Deselect every location.
    pub fn select_no_locations(&mut self) {
        self.filters.locations.clear();
        self.refilter();
    }

    /// Back to the full age range and every location.
    pub fn reset_filters(&mut self) {
        self.filters = FilterState::full(&self.dataset);
        self.refilter();
    }
}

// ---------------------------------------------------------------------------
// Animation playback
// ---------------------------------------------------------------------------

/// Seconds each animation frame stays on screen.
pub const FRAME_DURATION: f64 = 0.5;

/// Frame cursor for the animated scatter. Loops while playing.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    frame: usize,
    playing: bool,
    last_advance: Option<f64>,
}

impl Playback {
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.last_advance = None;
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.last_advance = None;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `frame` and stop playing.
    pub fn seek(&mut self, frame: usize) {
        self.frame = frame;
        self.pause();
    }

    /// Keep the cursor inside `0..frame_count`.
    pub fn clamp(&mut self, frame_count: usize) {
        if self.frame >= frame_count {
            self.frame = frame_count.saturating_sub(1);
        }
    }

    /// Advance when a full frame duration has elapsed since the last step.
    /// Returns `true` if the frame changed.
    pub fn tick(&mut self, now: f64, frame_count: usize) -> bool {
        if !self.playing || frame_count == 0 {
            return false;
        }
        let last = *self.last_advance.get_or_insert(now);
        if now - last < FRAME_DURATION {
            return false;
        }
        self.frame = (self.frame + 1) % frame_count;
        self.last_advance = Some(now);
        true
    }

    /// Seconds until the next step is due.
    pub fn remaining(&self, now: f64) -> f64 {
        match self.last_advance {
            Some(last) => (FRAME_DURATION - (now - last)).max(0.0),
            None => FRAME_DURATION,
        }
    }
}

// ---------------------------------------------------------------------------
// 3D orbit camera
// ---------------------------------------------------------------------------

const PITCH_LIMIT: f32 = 89.0_f32 * std::f32::consts::PI / 180.0;
const DEFAULT_YAW: f32 = -0.75;
const DEFAULT_PITCH: f32 = 0.45;
/// Radians per dragged point.
const ORBIT_SPEED: f32 = 0.01;

/// Orthographic orbit camera around the unit cube, z axis up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
        }
    }
}

impl Camera {
    /// Rotate by a drag delta in screen points.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw += delta.x * ORBIT_SPEED;
        self.pitch = (self.pitch + delta.y * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Project a point of the normalised cube to `(screen [x, y], depth)`.
    ///
    /// Screen y points up; larger depth is nearer the viewer.
    pub fn project(&self, p: [f32; 3]) -> ([f32; 2], f32) {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let x = p[0] * cy - p[1] * sy;
        let y = p[0] * sy + p[1] * cy;
        let screen_y = p[2] * cp - y * sp;
        let depth = -(y * cp + p[2] * sp);
        ([x, screen_y], depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CustomerRecord;
    use crate::data::model::tests::record;

    fn dataset() -> CustomerDataset {
        CustomerDataset::from_records(vec![
            record(25, "NY", 4.0),
            record(40, "NY", 2.0),
            record(30, "LA", 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn starts_with_everything_visible() {
        let state = AppState::new(dataset());
        assert_eq!(state.visible_count, 3);
        assert_eq!(state.filters.age_min, 25);
        assert_eq!(state.filters.age_max, 40);
        assert_eq!(state.charts.location.categories, vec!["LA", "NY"]);
    }

    #[test]
    fn every_filter_change_rebuilds_all_charts() {
        let mut state = AppState::new(dataset());

        state.toggle_location("NY");
        assert_eq!(state.visible_count, 1);
        assert_eq!(state.charts.location.categories, vec!["LA"]);
        assert_eq!(state.charts.satisfaction.slices.len(), 1);
        assert_eq!(state.charts.products.frames.len(), 1);

        state.select_no_locations();
        assert_eq!(state.visible_count, 0);
        assert!(state.charts.location.is_empty());
        assert!(state.charts.age_satisfaction.is_empty());

        state.select_all_locations();
        assert_eq!(state.visible_count, 3);
    }

    #[test]
    fn age_range_is_clamped_and_ordered() {
        let mut state = AppState::new(dataset());

        state.set_age_range(35, 10);
        assert_eq!((state.filters.age_min, state.filters.age_max), (25, 35));
        assert_eq!(state.visible_count, 2);

        state.set_age_range(40, 40);
        assert_eq!(state.visible_count, 1);

        state.reset_filters();
        assert_eq!(state.filters, FilterState::full(&state.dataset));
        assert_eq!(state.visible_count, 3);
    }

    #[test]
    fn shrinking_frame_count_clamps_playback() {
        let mut state = AppState::new(dataset());
        assert_eq!(state.charts.products.frames.len(), 3);
        state.playback.seek(2);

        state.toggle_location("NY");
        assert_eq!(state.playback.frame(), 0);

        state.select_no_locations();
        assert_eq!(state.playback.frame(), 0);
    }

    #[test]
    fn source_table_is_never_mutated() {
        let original: Vec<CustomerRecord> = dataset().records;
        let mut state = AppState::new(dataset());
        state.set_age_range(30, 30);
        state.toggle_location("LA");
        assert_eq!(state.dataset.records, original);
    }

    #[test]
    fn playback_steps_once_per_frame_duration_and_loops() {
        let mut pb = Playback::default();
        assert!(!pb.tick(0.0, 3));

        pb.play();
        assert!(!pb.tick(10.0, 3));
        assert!(!pb.tick(10.2, 3));
        assert!(pb.tick(10.5, 3));
        assert_eq!(pb.frame(), 1);
        assert!(pb.tick(11.0, 3));
        assert!(pb.tick(11.5, 3));
        assert_eq!(pb.frame(), 0);
        assert!((pb.remaining(11.6) - 0.4).abs() < 1e-9);

        pb.toggle();
        assert!(!pb.is_playing());
        assert!(!pb.tick(20.0, 3));
    }

    #[test]
    fn playback_ignores_empty_animation() {
        let mut pb = Playback::default();
        pb.play();
        assert!(!pb.tick(1.0, 0));
        pb.clamp(0);
        assert_eq!(pb.frame(), 0);
    }

    #[test]
    fn camera_projects_axes_when_level() {
        let cam = Camera { yaw: 0.0, pitch: 0.0 };
        let (xy, _) = cam.project([1.0, 0.0, 0.0]);
        assert_eq!(xy, [1.0, 0.0]);
        let (xy, _) = cam.project([0.0, 0.0, 1.0]);
        assert_eq!(xy, [0.0, 1.0]);
        let (_, near) = cam.project([0.0, -1.0, 0.0]);
        let (_, far) = cam.project([0.0, 1.0, 0.0]);
        assert!(near > far);
    }

    #[test]
    fn camera_pitch_is_limited() {
        let mut cam = Camera::default();
        cam.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.orbit(Vec2::new(100.0, 0.0));
        assert!((cam.yaw - (DEFAULT_YAW + 1.0)).abs() < 1e-6);
        cam.reset();
        assert_eq!(cam, Camera::default());
    }
}
