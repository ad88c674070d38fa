//! Text-measurement seam
//!
//! The layout engine needs text extents for hit regions and for fitting the
//! calibration instructions to the screen, but the real measurement lives in
//! the host's font stack. The engine takes a [`TextMetrics`] implementation
//! at the call site; the heuristic below keeps core layout deterministic and
//! testable without any font machinery.

/// Measured extents of one text run at a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub width: f32,
    /// Height above the baseline
    pub ascent: f32,
    /// Depth below the baseline
    pub descent: f32,
}

impl TextBounds {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Host-provided text measurement. Object safe so hosts can hand the engine
/// a boxed font-backed implementation.
pub trait TextMetrics {
    fn measure(&self, text: &str, size: f32) -> TextBounds;
}

/// Width-proportional approximation of a typical UI font.
///
/// Good enough for hit regions a fingertip wide; hosts with a real font
/// stack should substitute exact measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMetrics;

impl TextMetrics for HeuristicTextMetrics {
    fn measure(&self, text: &str, size: f32) -> TextBounds {
        TextBounds {
            width: 0.62 * size * text.chars().count() as f32,
            ascent: 0.92 * size,
            descent: 0.22 * size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_scales_with_length_and_size() {
        let m = HeuristicTextMetrics;
        let short = m.measure("Pike", 20.0);
        let long = m.measure("Pike of Stickle", 20.0);
        let big = m.measure("Pike", 40.0);
        assert!(long.width > short.width);
        assert!((big.width - 2.0 * short.width).abs() < 0.001);
    }

    #[test]
    fn test_height_independent_of_text() {
        let m = HeuristicTextMetrics;
        assert_eq!(
            m.measure("a", 20.0).height(),
            m.measure("a much longer string", 20.0).height()
        );
    }
}
