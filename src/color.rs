use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

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
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging colour map for correlations
// ---------------------------------------------------------------------------

/// Blue → light grey → red, interpolated in linear RGB over `[-1, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct CoolWarm {
    cool: LinSrgb,
    mid: LinSrgb,
    warm: LinSrgb,
    /// Colour for NaN.
    pub missing: Color32,
}

impl Default for CoolWarm {
    fn default() -> Self {
        Self {
            cool: Srgb::new(59u8, 76, 192).into_format::<f32>().into_linear(),
            mid: Srgb::new(221u8, 221, 221).into_format::<f32>().into_linear(),
            warm: Srgb::new(180u8, 4, 38).into_format::<f32>().into_linear(),
            missing: Color32::DARK_GRAY,
        }
    }
}

impl CoolWarm {
    /// Colour for `value`, clamped to `[-1, 1]`.
    pub fn color_for(&self, value: f64) -> Color32 {
        if value.is_nan() {
            return self.missing;
        }
        let v = value.clamp(-1.0, 1.0) as f32;
        let lin = if v < 0.0 {
            self.mid.mix(self.cool, -v)
        } else {
            self.mid.mix(self.warm, v)
        };
        to_color32(Srgb::from_linear(lin))
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}
