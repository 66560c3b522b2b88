use palette::{IntoColor, Lab, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Diverging colour scale for correlation values
// ---------------------------------------------------------------------------

/// Blue → light grey → red, the classic "coolwarm" endpoints.
const COLD: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

/// Maps values in `[min, max]` onto a diverging colour scale, interpolating in
/// CIE Lab so the midpoint stays perceptually neutral.
#[derive(Debug, Clone)]
pub struct DivergingScale {
    min: f64,
    max: f64,
    cold: Lab,
    neutral: Lab,
    warm: Lab,
}

impl DivergingScale {
    pub fn new(min: f64, max: f64) -> Self {
        DivergingScale {
            min,
            max,
            cold: to_lab(COLD),
            neutral: to_lab(NEUTRAL),
            warm: to_lab(WARM),
        }
    }

    /// The scale used for correlation coefficients.
    pub fn correlation() -> Self {
        Self::new(-1.0, 1.0)
    }

    /// Look up the colour for a value; out-of-range values are clamped.
    pub fn color_for(&self, value: f64) -> RGBColor {
        let span = self.max - self.min;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        let lab = if t < 0.5 {
            self.cold.mix(self.neutral, (t * 2.0) as f32)
        } else {
            self.neutral.mix(self.warm, ((t - 0.5) * 2.0) as f32)
        };
        let rgb: Srgb = lab.into_color();
        RGBColor(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
    }

    /// Whether text drawn on top of `value` should be light for contrast.
    pub fn needs_light_text(&self, value: f64) -> bool {
        let mid = (self.min + self.max) / 2.0;
        let half = (self.max - self.min) / 2.0;
        half > 0.0 && ((value - mid) / half).abs() > 0.6
    }
}

fn to_lab((r, g, b): (u8, u8, u8)) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

fn channel(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: RGBColor, b: (u8, u8, u8)) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 2;
        d(a.0, b.0) && d(a.1, b.1) && d(a.2, b.2)
    }

    #[test]
    fn endpoints_and_midpoint() {
        let scale = DivergingScale::correlation();
        assert!(close(scale.color_for(-1.0), COLD));
        assert!(close(scale.color_for(0.0), NEUTRAL));
        assert!(close(scale.color_for(1.0), WARM));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let scale = DivergingScale::correlation();
        assert_eq!(scale.color_for(5.0), scale.color_for(1.0));
        assert_eq!(scale.color_for(-5.0), scale.color_for(-1.0));
    }

    #[test]
    fn strong_values_get_light_text() {
        let scale = DivergingScale::correlation();
        assert!(scale.needs_light_text(0.95));
        assert!(scale.needs_light_text(-0.8));
        assert!(!scale.needs_light_text(0.1));
    }
}
