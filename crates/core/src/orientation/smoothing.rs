//! Circular-mean smoothing filter
//!
//! Compass headings wrap at 0/360, so a plain moving average is wrong near
//! north (the mean of 359 and 1 should be 0, not 180). This filter keeps a
//! ring of (sin, cos) component pairs and recombines their means with atan2,
//! which handles wraparound correctly. The same filter smooths the vertical
//! elevation angle with a shorter window.

use libm::{atan2f, cosf, sinf};

/// Largest supported smoothing window
pub const MAX_SMOOTHING_WINDOW: usize = 128;

/// Default window for heading smoothing
pub const DEFAULT_HEADING_WINDOW: usize = 50;

/// Default window for elevation smoothing
pub const DEFAULT_ELEVATION_WINDOW: usize = 10;

/// Fixed-window circular-mean filter for an angular signal.
///
/// Keeps the last `window` samples as (sin, cos) pairs in a ring buffer.
/// The mean angle is `atan2(mean(sin), mean(cos))`; the variance score is a
/// display-only stability indicator derived from the component variances.
///
/// Not designed for concurrent mutation: callers must guarantee a single
/// writer (one sensor callback stream, or an owning task).
pub struct CircularSmoother {
    sin_ring: [f32; MAX_SMOOTHING_WINDOW],
    cos_ring: [f32; MAX_SMOOTHING_WINDOW],
    window: usize,
    cursor: usize,
    /// Number of slots holding real samples; saturates at `window`
    held: usize,
    mean: f32,
}

impl CircularSmoother {
    /// Create a filter with the given window size.
    ///
    /// The window is clamped to `1..=MAX_SMOOTHING_WINDOW`. A window of 1
    /// degenerates to "mean equals the latest sample".
    pub fn new(window: usize) -> Self {
        Self {
            sin_ring: [0.0; MAX_SMOOTHING_WINDOW],
            cos_ring: [0.0; MAX_SMOOTHING_WINDOW],
            window: window.clamp(1, MAX_SMOOTHING_WINDOW),
            cursor: 0,
            held: 0,
            mean: 0.0,
        }
    }

    /// Window size in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Add the latest angle sample in radians and recompute the mean.
    ///
    /// Once the ring has filled, exactly the last `window` samples are
    /// represented; earlier samples never leak into the mean.
    pub fn add_sample(&mut self, angle_rad: f32) {
        self.sin_ring[self.cursor] = sinf(angle_rad);
        self.cos_ring[self.cursor] = cosf(angle_rad);
        self.cursor += 1;
        if self.cursor > self.window - 1 {
            self.cursor = 0;
        }
        if self.held < self.window {
            self.held += 1;
        }

        let n = self.held as f32;
        let mut sum_sin = 0.0;
        let mut sum_cos = 0.0;
        for i in 0..self.held {
            sum_sin += self.sin_ring[i];
            sum_cos += self.cos_ring[i];
        }
        self.mean = atan2f(sum_sin / n, sum_cos / n);
    }

    /// Smoothed angle in [0, 2π) radians.
    ///
    /// Opposed samples can cancel the component sums to ~0; atan2(0, 0) is
    /// defined (returns 0), so the result is always finite.
    pub fn mean(&self) -> f32 {
        if self.mean < 0.0 {
            self.mean + 2.0 * core::f32::consts::PI
        } else {
            self.mean
        }
    }

    /// Stability score: combined sin/cos sample variance, ×1000, truncated.
    ///
    /// Bessel-corrected (divides by n−1). Display-only; never used for
    /// control decisions. 0 when fewer than two samples are held.
    pub fn variance_score(&self) -> i32 {
        if self.held < 2 {
            return 0;
        }
        let n = self.held as f32;
        let mut sum_sin = 0.0;
        let mut sum_cos = 0.0;
        for i in 0..self.held {
            sum_sin += self.sin_ring[i];
            sum_cos += self.cos_ring[i];
        }
        let avg_sin = sum_sin / n;
        let avg_cos = sum_cos / n;

        let mut var_sin = 0.0;
        let mut var_cos = 0.0;
        for i in 0..self.held {
            let ds = self.sin_ring[i] - avg_sin;
            let dc = self.cos_ring[i] - avg_cos;
            var_sin += ds * ds;
            var_cos += dc * dc;
        }
        let q = var_cos / (n - 1.0) + var_sin / (n - 1.0);

        (q * 1000.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_constant_input_gives_exact_mean_and_zero_variance() {
        let mut filter = CircularSmoother::new(8);
        for _ in 0..8 {
            filter.add_sample(1.25);
        }
        assert!(
            (filter.mean() - 1.25).abs() < 1e-5,
            "Expected ~1.25, got {}",
            filter.mean()
        );
        assert_eq!(filter.variance_score(), 0);
    }

    #[test]
    fn test_mean_handles_wraparound_at_north() {
        // 350 deg and 10 deg should average to ~0 deg, not 180
        let mut filter = CircularSmoother::new(2);
        filter.add_sample(350.0_f32.to_radians());
        filter.add_sample(10.0_f32.to_radians());
        let mean_deg = filter.mean().to_degrees();
        let err = (mean_deg % 360.0).min(360.0 - mean_deg % 360.0);
        assert!(err < 0.5, "Expected ~0 deg, got {}", mean_deg);
    }

    #[test]
    fn test_opposed_samples_stay_finite() {
        // 0/90/180/270 cancel both component sums; must not fault
        let mut filter = CircularSmoother::new(4);
        for _ in 0..3 {
            filter.add_sample(0.0);
            filter.add_sample(FRAC_PI_2);
            filter.add_sample(PI);
            filter.add_sample(PI + FRAC_PI_2);
        }
        let mean = filter.mean();
        assert!(mean.is_finite());
        assert!((0.0..2.0 * PI).contains(&mean));
        assert!(filter.variance_score() > 0);
    }

    #[test]
    fn test_window_of_one_tracks_latest_sample() {
        let mut filter = CircularSmoother::new(1);
        filter.add_sample(0.5);
        assert!((filter.mean() - 0.5).abs() < 1e-6);
        filter.add_sample(2.5);
        assert!(
            (filter.mean() - 2.5).abs() < 1e-6,
            "Expected 2.5, got {}",
            filter.mean()
        );
        assert_eq!(filter.variance_score(), 0);
    }

    #[test]
    fn test_old_samples_leave_the_window() {
        // Window 4: after four new samples the initial value is fully evicted
        let mut filter = CircularSmoother::new(4);
        filter.add_sample(PI);
        for _ in 0..4 {
            filter.add_sample(0.1);
        }
        assert!(
            (filter.mean() - 0.1).abs() < 1e-5,
            "Expected 0.1, got {}",
            filter.mean()
        );
        assert_eq!(filter.variance_score(), 0);
    }

    #[test]
    fn test_partial_fill_uses_only_held_samples() {
        // One sample into a wide window must return that sample, not a mean
        // dragged toward zero by empty slots
        let mut filter = CircularSmoother::new(50);
        filter.add_sample(2.0);
        assert!(
            (filter.mean() - 2.0).abs() < 1e-5,
            "Expected 2.0, got {}",
            filter.mean()
        );
    }

    #[test]
    fn test_window_clamped_to_capacity() {
        let filter = CircularSmoother::new(100_000);
        assert_eq!(filter.window(), MAX_SMOOTHING_WINDOW);
        let filter = CircularSmoother::new(0);
        assert_eq!(filter.window(), 1);
    }

    #[test]
    fn test_variance_rises_with_spread() {
        let mut steady = CircularSmoother::new(10);
        let mut noisy = CircularSmoother::new(10);
        for i in 0..10 {
            steady.add_sample(1.0);
            noisy.add_sample(1.0 + if i % 2 == 0 { 0.3 } else { -0.3 });
        }
        assert_eq!(steady.variance_score(), 0);
        assert!(noisy.variance_score() > steady.variance_score());
    }
}
