//! Two-tap field-of-view calibration
//!
//! The camera's horizontal field of view is unknown on arbitrary hardware,
//! so it is measured in the field: the user aligns a known summit with the
//! left screen edge and taps, then pans right until the same summit sits at
//! the right edge and taps again. The heading swept between the two taps is
//! the horizontal field of view. A fine-trim control nudges the heading
//! bias in fixed steps afterwards, independent of the tap state machine.

use crate::geo::wrap_360;

/// Heading-bias nudge applied per trim command, in degrees.
pub const TRIM_STEP_DEG: f32 = 0.1;

/// Progress of the two-tap calibration gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// Calibration pending; taps drive the gesture
    Uncalibrated,
    /// First tap recorded; waiting for the second
    FirstPointCaptured {
        /// Smoothed heading at the first tap, degrees [0, 360)
        first_heading_deg: f32,
    },
    /// Measurement complete; taps are no longer consumed here
    Calibrated,
}

/// What a tap accomplished, so the caller can update the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// First point captured; prompt the user to pan right
    FirstPoint,
    /// Second point captured; calibration complete
    Completed {
        /// Measured horizontal field of view, degrees
        fov_deg: f32,
    },
}

/// Direction for a fine-trim nudge of the heading bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimDirection {
    Left,
    Right,
}

/// Field-of-view measurement state plus the persistent heading trim.
///
/// `fov_deg` survives across calibration gestures: re-triggering calibration
/// only resets the phase, the previous measurement stays live until the
/// second tap replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    phase: CalibrationPhase,
    fov_deg: f32,
    heading_bias_deg: f32,
}

impl CalibrationState {
    /// Fresh state that still needs the two-tap gesture.
    pub fn uncalibrated(fov_deg: f32) -> Self {
        Self {
            phase: CalibrationPhase::Uncalibrated,
            fov_deg,
            heading_bias_deg: 0.0,
        }
    }

    /// Restore a previously completed calibration.
    pub fn calibrated(fov_deg: f32, heading_bias_deg: f32) -> Self {
        Self {
            phase: CalibrationPhase::Calibrated,
            fov_deg,
            heading_bias_deg,
        }
    }

    /// Current horizontal field of view in degrees.
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    /// Accumulated fine-trim heading bias in degrees.
    pub fn heading_bias_deg(&self) -> f32 {
        self.heading_bias_deg
    }

    /// Current gesture phase.
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.phase, CalibrationPhase::Calibrated)
    }

    /// Whether a calibration gesture is waiting for its second tap.
    pub fn awaiting_second_tap(&self) -> bool {
        matches!(self.phase, CalibrationPhase::FirstPointCaptured { .. })
    }

    /// Re-trigger the two-tap gesture. Only the phase resets; the stored
    /// field of view keeps driving layout until remeasured.
    pub fn recalibrate(&mut self) {
        self.phase = CalibrationPhase::Uncalibrated;
    }

    /// Record a calibration tap at the given smoothed heading.
    ///
    /// The first tap captures the heading; the second computes
    /// `first - current`, adding 360 when the pan crossed north, and stores
    /// it as the new field of view. Returns `None` once calibrated (taps are
    /// someone else's to handle). A double tap without panning yields a zero
    /// field of view, which the layout treats as "nothing visible" until
    /// the user recalibrates.
    pub fn record_tap(&mut self, heading_deg: f32) -> Option<TapOutcome> {
        match self.phase {
            CalibrationPhase::Uncalibrated => {
                self.phase = CalibrationPhase::FirstPointCaptured {
                    first_heading_deg: heading_deg,
                };
                Some(TapOutcome::FirstPoint)
            }
            CalibrationPhase::FirstPointCaptured { first_heading_deg } => {
                let mut fov = first_heading_deg - heading_deg;
                if fov < 0.0 {
                    fov += 360.0;
                }
                self.fov_deg = fov;
                self.phase = CalibrationPhase::Calibrated;
                Some(TapOutcome::Completed { fov_deg: fov })
            }
            CalibrationPhase::Calibrated => None,
        }
    }

    /// Nudge the heading bias one trim step in the given direction.
    pub fn trim(&mut self, direction: TrimDirection) {
        match direction {
            TrimDirection::Left => self.heading_bias_deg -= TRIM_STEP_DEG,
            TrimDirection::Right => self.heading_bias_deg += TRIM_STEP_DEG,
        }
    }

    /// Apply the trim bias to a heading, wrapped back to [0, 360).
    pub fn apply_bias(&self, heading_deg: f32) -> f32 {
        wrap_360(heading_deg + self.heading_bias_deg)
    }
}
