//! View session context
//!
//! One `ViewSession` exists per activation of the view. It owns the fusion
//! filter, calibration state, layout engine, settings, and the current
//! feature snapshot; all mutation goes through `&mut self`, which keeps the
//! smoothing ring single-writer without a lock. The sample-to-layout hot
//! path does no I/O; settings saves are fire-and-forget and only happen on
//! command completion.

use log::{info, warn};
use peaksight_core::calibration::{CalibrationState, TapOutcome, TrimDirection};
use peaksight_core::layout::{
    calibration_overlay, variance_ring, Feature, HorizonLayoutEngine, LayoutConfig, LayoutOutput,
    TextMetrics,
};
use peaksight_core::orientation::{OrientationFusion, SensorSample};

use crate::error::SessionError;
use crate::features::{FeatureFilter, FeatureSource};
use crate::position::{position_status, PositionFix, PositionStatus};
use crate::settings::{Settings, SettingsStore};

/// What a tap on the view did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapAction {
    /// First calibration point captured
    CalibrationFirstPoint,
    /// Calibration gesture completed
    CalibrationComplete { fov_deg: f32 },
    /// Tap landed on a placed label
    Feature { id: u32 },
    /// Tap hit nothing
    Miss,
}

/// Display state for the status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReadout {
    pub heading_deg: f32,
    pub heading_bias_deg: f32,
    pub fov_deg: f32,
    pub variance_score: i32,
    pub position: PositionStatus,
    pub accuracy_m: Option<f32>,
}

/// Everything one activation of the horizon view owns.
pub struct ViewSession {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    metrics: Box<dyn TextMetrics + Send>,
    fusion: OrientationFusion,
    calibration: CalibrationState,
    engine: HorizonLayoutEngine,
    config: LayoutConfig,
    features: Vec<Feature>,
    latest_fix: Option<PositionFix>,
    trim_dirty: bool,
}

impl ViewSession {
    /// Create a session for a screen, loading persisted settings (defaults
    /// when none exist yet).
    pub fn new(
        screen_w: f32,
        screen_h: f32,
        store: Box<dyn SettingsStore>,
        metrics: Box<dyn TextMetrics + Send>,
    ) -> Self {
        let settings = store.load().unwrap_or_else(|e| {
            info!("no stored settings ({}), using defaults", e);
            Settings::default()
        });

        let mut config = LayoutConfig::for_screen(screen_w, screen_h);
        apply_to_config(&mut config, &settings);

        let calibration = if settings.is_calibrated {
            CalibrationState::calibrated(settings.fov_deg, settings.heading_bias_deg)
        } else {
            CalibrationState::uncalibrated(settings.fov_deg)
        };
        let fusion = OrientationFusion::with_heading_window(settings.smoothing_window);

        Self {
            settings,
            store,
            metrics,
            fusion,
            calibration,
            engine: HorizonLayoutEngine::new(),
            config,
            features: Vec::new(),
            latest_fix: None,
            trim_dirty: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn last_output(&self) -> &LayoutOutput {
        self.engine.output()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Local magnetic declination, forwarded to the fusion filter.
    pub fn set_declination(&mut self, declination_deg: f32) {
        self.fusion.set_declination(declination_deg);
    }

    /// Feed one raw sensor sample. Returns the refreshed layout when the
    /// sample produced an orientation update, `None` when it was gated or
    /// its channel partner is still missing.
    pub fn handle_sensor_sample(&mut self, sample: SensorSample) -> Option<&LayoutOutput> {
        if !self.fusion.ingest(sample) {
            return None;
        }
        Some(self.redraw())
    }

    /// Re-run layout from the latest smoothed orientation.
    pub fn redraw(&mut self) -> &LayoutOutput {
        let heading = self.fusion.heading_deg(self.calibration.heading_bias_deg());
        let elevation = self.fusion.elevation_rad();
        self.engine.layout(
            &self.features,
            heading,
            elevation,
            &self.config,
            self.metrics.as_ref(),
        );

        let variance = self.fusion.heading_variance_score();
        let calibrated = self.calibration.is_calibrated();
        let awaiting = self.calibration.awaiting_second_tap();
        let out = self.engine.output_mut();
        if calibrated {
            variance_ring(
                &mut out.primitives,
                variance,
                self.config.screen_w,
                self.config.screen_h,
            );
        } else {
            calibration_overlay(
                &mut out.primitives,
                &self.config,
                awaiting,
                heading,
                variance,
                self.metrics.as_ref(),
            );
        }
        self.engine.output()
    }

    /// Route a tap: the calibrator consumes taps until calibrated, after
    /// which taps hit-test against the most recent layout pass.
    pub fn handle_tap(&mut self, x: f32, y: f32) -> TapAction {
        if !self.calibration.is_calibrated() {
            let heading = self.fusion.heading_deg(self.calibration.heading_bias_deg());
            return match self.calibration.record_tap(heading) {
                Some(TapOutcome::FirstPoint) => TapAction::CalibrationFirstPoint,
                Some(TapOutcome::Completed { fov_deg }) => {
                    self.settings.fov_deg = fov_deg;
                    self.settings.is_calibrated = true;
                    self.config.fov_deg = fov_deg;
                    self.save_settings();
                    info!("calibration complete, fov {:.1} deg", fov_deg);
                    TapAction::CalibrationComplete { fov_deg }
                }
                None => TapAction::Miss,
            };
        }
        match self.engine.output().hit_test(x, y) {
            Some(id) => TapAction::Feature { id },
            None => TapAction::Miss,
        }
    }

    /// Nudge the heading trim one step. Not persisted until
    /// [`Self::commit_trim`]; trim commands arrive in bursts (key repeat)
    /// and only the final value is worth a write.
    pub fn trim_heading(&mut self, direction: TrimDirection) {
        self.calibration.trim(direction);
        self.trim_dirty = true;
    }

    /// Persist the accumulated trim, if it changed.
    pub fn commit_trim(&mut self) {
        if !self.trim_dirty {
            return;
        }
        self.settings.heading_bias_deg = self.calibration.heading_bias_deg();
        self.save_settings();
        self.trim_dirty = false;
    }

    /// Re-trigger the two-tap gesture. The stored field of view keeps
    /// driving layout until the new measurement completes.
    pub fn recalibrate(&mut self) {
        self.calibration.recalibrate();
        self.settings.is_calibrated = false;
        self.save_settings();
    }

    /// Record the latest position fix.
    pub fn update_fix(&mut self, fix: PositionFix) {
        self.latest_fix = Some(fix);
    }

    /// Re-filter the feature list for the current position and bounds.
    /// Without a fix yet, the list is simply empty.
    pub fn refresh_features(&mut self, source: &dyn FeatureSource) -> Result<usize, SessionError> {
        let Some(fix) = self.latest_fix else {
            self.features.clear();
            return Ok(0);
        };
        let filter = FeatureFilter::from_settings(&self.settings);
        self.features = source.features(&fix.position, &filter)?;
        Ok(self.features.len())
    }

    /// Replace display settings and reapply them to the layout config.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        apply_to_config(&mut self.config, &self.settings);
        self.save_settings();
    }

    pub fn status_readout(&self) -> StatusReadout {
        StatusReadout {
            heading_deg: self.fusion.heading_deg(self.calibration.heading_bias_deg()),
            heading_bias_deg: self.calibration.heading_bias_deg(),
            fov_deg: self.calibration.fov_deg(),
            variance_score: self.fusion.heading_variance_score(),
            position: position_status(self.latest_fix.as_ref()),
            accuracy_m: self.latest_fix.map(|f| f.accuracy_m),
        }
    }

    /// Lifecycle: view going to background. Flushes pending trim.
    pub fn suspend(&mut self) {
        self.commit_trim();
    }

    /// Lifecycle: view returning to foreground. Smoothers are recreated so
    /// every session starts with a fresh calibration window; calibration
    /// and settings carry over.
    pub fn resume(&mut self) {
        self.fusion = OrientationFusion::with_heading_window(self.settings.smoothing_window);
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("settings save failed: {}", e);
        }
    }
}

fn apply_to_config(config: &mut LayoutConfig, settings: &Settings) {
    config.fov_deg = settings.fov_deg;
    config.vertical_fov_deg = settings.vertical_fov_deg;
    config.text_size = settings.text_size;
    config.annotations = settings.annotations();
    config.units = settings.units.into();
}
