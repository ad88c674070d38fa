//! Orientation estimation from raw sensor vectors
//!
//! This module turns pairs of 3-axis gravity and magnetic-field samples into
//! a smoothed heading/elevation estimate:
//!
//! - [`smoothing`]: fixed-window circular-mean filter over an angular signal
//! - [`rotation`]: rotation-basis construction, declination, screen-rotation remap
//! - [`fusion`]: reliability gating and the sample-to-angles pipeline

pub mod fusion;
pub mod rotation;
pub mod smoothing;

pub use fusion::{OrientationFusion, SensorChannel, SensorSample};
pub use rotation::{
    apply_declination, orientation_angles, remap_for_rotation, rotation_from_gravity_mag,
    ScreenRotation,
};
pub use smoothing::{CircularSmoother, MAX_SMOOTHING_WINDOW};
