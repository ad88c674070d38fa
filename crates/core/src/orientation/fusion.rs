//! Orientation fusion: raw sensor pairs to smoothed heading/elevation
//!
//! Fuses the latest gravity and magnetic-field vectors into a rotation
//! basis, extracts heading and elevation, and feeds them through two
//! independent [`CircularSmoother`] instances. Heading uses a wide window
//! (noisy compass), elevation a short one.

use nalgebra::Vector3;

use super::rotation::{
    apply_declination, orientation_angles, remap_for_rotation, rotation_from_gravity_mag,
    ScreenRotation,
};
use super::smoothing::{CircularSmoother, DEFAULT_ELEVATION_WINDOW, DEFAULT_HEADING_WINDOW};
use crate::geo::wrap_360;

/// Which sensor channel a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    /// Accelerometer-equivalent gravity vector
    Gravity,
    /// Magnetometer-equivalent field vector
    MagneticField,
}

/// One raw 3-axis sample with the hardware's reliability flag.
#[derive(Debug, Clone, Copy)]
pub struct SensorSample {
    pub channel: SensorChannel,
    pub vector: Vector3<f32>,
    pub reliable: bool,
}

/// Converts raw gravity/magnetic-field samples into a smoothed
/// heading/elevation pair, compensating for magnetic declination and the
/// device's screen-rotation quadrant.
///
/// Must only be mutated from one producer at a time (the host delivers
/// sensor callbacks on a single stream; preserve that single-writer
/// property when wiring this up).
pub struct OrientationFusion {
    heading: CircularSmoother,
    elevation: CircularSmoother,
    gravity: Option<Vector3<f32>>,
    magnetic: Option<Vector3<f32>>,
    gravity_reliable_seen: bool,
    magnetic_reliable_seen: bool,
    declination_deg: f32,
    screen_rotation: ScreenRotation,
}

impl OrientationFusion {
    /// Create with the default heading window (50 samples).
    pub fn new() -> Self {
        Self::with_heading_window(DEFAULT_HEADING_WINDOW)
    }

    /// Create with a configurable heading window; the elevation window is
    /// fixed at 10 samples.
    pub fn with_heading_window(heading_window: usize) -> Self {
        Self {
            heading: CircularSmoother::new(heading_window),
            elevation: CircularSmoother::new(DEFAULT_ELEVATION_WINDOW),
            gravity: None,
            magnetic: None,
            gravity_reliable_seen: false,
            magnetic_reliable_seen: false,
            declination_deg: 0.0,
            screen_rotation: ScreenRotation::default(),
        }
    }

    /// Set the local magnetic declination in degrees.
    pub fn set_declination(&mut self, declination_deg: f32) {
        self.declination_deg = declination_deg;
    }

    /// Update the screen-rotation quadrant.
    pub fn set_screen_rotation(&mut self, rotation: ScreenRotation) {
        self.screen_rotation = rotation;
    }

    /// Ingest one raw sample. Returns true when a fused orientation update
    /// was produced (the caller should trigger a layout pass).
    ///
    /// Reliability gate: some hardware never flags its readings reliable yet
    /// still produces usable data, so unreliable samples pass through until
    /// the channel has been reliable at least once; after that, unreliable
    /// samples from it are dropped.
    pub fn ingest(&mut self, sample: SensorSample) -> bool {
        if sample.reliable {
            match sample.channel {
                SensorChannel::Gravity => self.gravity_reliable_seen = true,
                SensorChannel::MagneticField => self.magnetic_reliable_seen = true,
            }
        } else {
            let blocked = match sample.channel {
                SensorChannel::Gravity => self.gravity_reliable_seen,
                SensorChannel::MagneticField => self.magnetic_reliable_seen,
            };
            if blocked {
                return false;
            }
        }

        match sample.channel {
            SensorChannel::Gravity => self.gravity = Some(sample.vector),
            SensorChannel::MagneticField => self.magnetic = Some(sample.vector),
        }

        let (Some(gravity), Some(magnetic)) = (self.gravity, self.magnetic) else {
            return false;
        };
        let Some(basis) = rotation_from_gravity_mag(gravity, magnetic) else {
            return false;
        };

        let basis = apply_declination(&basis, self.declination_deg);
        let basis = remap_for_rotation(&basis, self.screen_rotation);
        let (azimuth, pitch, _roll) = orientation_angles(&basis);

        self.heading.add_sample(azimuth);
        self.elevation.add_sample(pitch);
        true
    }

    /// Smoothed heading in degrees [0, 360), with the calibration bias trim
    /// applied.
    pub fn heading_deg(&self, bias_deg: f32) -> f32 {
        wrap_360(self.heading.mean().to_degrees() + bias_deg)
    }

    /// Smoothed elevation in radians (only ever compared against other
    /// radians downstream, so never converted).
    pub fn elevation_rad(&self) -> f32 {
        let mean = self.elevation.mean();
        // Fold [0, 2pi) back to a signed pitch
        if mean > core::f32::consts::PI {
            mean - 2.0 * core::f32::consts::PI
        } else {
            mean
        }
    }

    /// Heading stability score for the UI variance indicator.
    pub fn heading_variance_score(&self) -> i32 {
        self.heading.variance_score()
    }
}

impl Default for OrientationFusion {
    fn default() -> Self {
        Self::new()
    }
}
