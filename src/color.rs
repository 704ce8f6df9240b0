use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart colour tables
// ---------------------------------------------------------------------------

/// Reversed Plasma sequential scale, used for the satisfaction pie.
pub const PLASMA_R: [&str; 10] = [
    "#f0f921", "#fdca26", "#fb9f3a", "#ed7953", "#d8576b", "#bd3786", "#9c179e", "#7201a8",
    "#46039f", "#0d0887",
];

/// Grouped-bar metric colours.
pub const METRIC_COLORS: [&str; 2] = ["#636EFA", "#EF553B"];

/// Retention colours for the 3D scatter.
pub const RETENTION_3D: [(&str, &str); 2] = [("Retained", "#00A0B0"), ("Churned", "#FF6F61")];

/// Retention colours for the animated product scatter.
pub const RETENTION_PRODUCTS: [(&str, &str); 2] =
    [("Retained", "#6B5B95"), ("Churned", "#FFC408")];

/// Marker outline on the 3D scatter (`DarkSlateGrey`).
pub const DARK_SLATE_GREY: &str = "#2F4F4F";

// ---------------------------------------------------------------------------
// Hex parsing and fallback palette
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` into a colour; malformed input falls back to grey.
pub fn hex(code: &str) -> Color32 {
    match code.parse::<Srgb<u8>>() {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("invalid colour '{code}': {e}");
            Color32::GRAY
        }
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category colours: discrete map first, then a cycled sequence
// ---------------------------------------------------------------------------

/// Assigns colours to category labels the way the chart builders need:
/// an explicit map wins, otherwise the next colour of the sequence.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    discrete: Vec<(String, Color32)>,
    sequence: Vec<Color32>,
    next: usize,
}

impl CategoryColors {
    /// Colours taken from `sequence` in order of request, cycling.
    pub fn sequence(codes: &[&str]) -> Self {
        CategoryColors {
            discrete: Vec::new(),
            sequence: codes.iter().map(|c| hex(c)).collect(),
            next: 0,
        }
    }

    /// Fixed colours for known labels; unknown labels get generated hues.
    pub fn discrete(map: &[(&str, &str)]) -> Self {
        CategoryColors {
            discrete: map.iter().map(|(k, c)| (k.to_string(), hex(c))).collect(),
            sequence: generate_palette(6),
            next: 0,
        }
    }

    /// Colour for `label`. Repeated calls for the same label may differ for
    /// sequence colours, so callers ask once per category.
    pub fn color_for(&mut self, label: &str) -> Color32 {
        if let Some((_, c)) = self.discrete.iter().find(|(k, _)| k == label) {
            return *c;
        }
        if self.sequence.is_empty() {
            return Color32::GRAY;
        }
        let c = self.sequence[self.next % self.sequence.len()];
        self.next += 1;
        c
    }
}
