//! Rotation-basis construction and screen-rotation remap
//!
//! Builds a device-to-world rotation basis from a gravity/magnetic-field
//! vector pair, rotates it for magnetic declination, and remaps the axes for
//! the device's screen-rotation quadrant so that heading/elevation describe
//! the "looking through the device" direction.

use libm::{asinf, atan2f, cosf, sinf, sqrtf};
use nalgebra::{Matrix3, Vector3};

/// Screen-rotation quadrant of the device display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenRotation {
    /// Portrait, natural orientation
    #[default]
    Deg0,
    /// Rotated left (landscape)
    Deg90,
    /// Upside down
    Deg180,
    /// Rotated right (landscape)
    Deg270,
}

/// Minimum usable vector norm; below this the device is in free fall or the
/// field reading is degenerate.
const MIN_NORM: f32 = 0.1;

/// Compute the device-to-world rotation basis from a gravity vector and a
/// magnetic-field vector, both in device coordinates.
///
/// Rows of the result are the world east (H), north (M), and up (A) axes
/// expressed in device coordinates. Returns `None` when the pair is
/// degenerate (free fall, or gravity parallel to the field), which simply
/// suppresses the orientation update for that tick.
pub fn rotation_from_gravity_mag(
    gravity: Vector3<f32>,
    geomagnetic: Vector3<f32>,
) -> Option<Matrix3<f32>> {
    let mut h = geomagnetic.cross(&gravity);
    let h_norm = sqrtf(h.dot(&h));
    if h_norm < MIN_NORM {
        return None;
    }
    h /= h_norm;

    let a_norm = sqrtf(gravity.dot(&gravity));
    if a_norm < MIN_NORM {
        return None;
    }
    let a = gravity / a_norm;
    let m = a.cross(&h);

    Some(Matrix3::from_rows(&[
        h.transpose(),
        m.transpose(),
        a.transpose(),
    ]))
}

/// Rotate the basis about the world vertical axis to subtract magnetic
/// declination, converting magnetic headings to true headings.
pub fn apply_declination(basis: &Matrix3<f32>, declination_deg: f32) -> Matrix3<f32> {
    if declination_deg == 0.0 {
        return *basis;
    }
    let theta = declination_deg.to_radians();
    let (s, c) = (sinf(theta), cosf(theta));
    #[rustfmt::skip]
    let rot_z = Matrix3::new(
        c, -s, 0.0,
        s,  c, 0.0,
        0.0, 0.0, 1.0,
    );
    rot_z * basis
}

/// Remap the rotation basis for the device's screen-rotation quadrant.
///
/// Each quadrant is an explicit fixed axis-swap rule matching the sensor
/// stack's tabulated behavior, not a derived formula. Deg0, Deg90, and
/// Deg180 all use the (X, Z) mapping; Deg270 uses (-Z, X). Deg90 sharing
/// the portrait mapping looks like a vendor quirk but is kept as tabulated.
pub fn remap_for_rotation(basis: &Matrix3<f32>, rotation: ScreenRotation) -> Matrix3<f32> {
    let c0 = basis.column(0).into_owned();
    let c1 = basis.column(1).into_owned();
    let c2 = basis.column(2).into_owned();

    match rotation {
        // (X, Z): new axes are device X and device Z
        ScreenRotation::Deg0 => Matrix3::from_columns(&[c0, -c2, c1]),
        // same mapping as Deg0, see above
        ScreenRotation::Deg90 => Matrix3::from_columns(&[c0, -c2, c1]),
        ScreenRotation::Deg180 => Matrix3::from_columns(&[c0, -c2, c1]),
        // (-Z, X): new axes are negated device Z and device X
        ScreenRotation::Deg270 => Matrix3::from_columns(&[c1, -c2, -c0]),
    }
}

/// Extract (azimuth, pitch, roll) in radians from a remapped basis.
///
/// Azimuth is the compass heading of the viewing direction, pitch the
/// vertical elevation angle; roll is extracted for completeness but unused
/// downstream.
pub fn orientation_angles(basis: &Matrix3<f32>) -> (f32, f32, f32) {
    let azimuth = atan2f(basis[(0, 1)], basis[(1, 1)]);
    let pitch = asinf(-basis[(2, 1)]);
    let roll = atan2f(-basis[(2, 0)], basis[(2, 2)]);
    (azimuth, pitch, roll)
}
