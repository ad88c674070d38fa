//! Persisted user settings
//!
//! Calibration results, smoothing window, display preferences, and the
//! feature-filter bounds all live in one JSON document. Unknown or missing
//! keys fall back to defaults so older settings files keep loading after
//! upgrades. Saves are fire-and-forget from command handlers: callers log a
//! failure and move on, the hot path never blocks on persistence.

use std::fs;
use std::path::PathBuf;

use peaksight_core::layout::{LabelAnnotations, Units, DEFAULT_FOV_DEG, DEFAULT_VERTICAL_FOV_DEG};
use peaksight_core::orientation::smoothing::DEFAULT_HEADING_WINDOW;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Position accuracy above which the UI shows a warning, meters.
pub const ACCURACY_WARNING_M: f32 = 200.0;

/// Unit system for distance/height annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl From<UnitPreference> for Units {
    fn from(pref: UnitPreference) -> Self {
        match pref {
            UnitPreference::Metric => Units::Metric,
            UnitPreference::Imperial => Units::Imperial,
        }
    }
}

/// All persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fov_deg: f32,
    pub heading_bias_deg: f32,
    pub is_calibrated: bool,
    pub smoothing_window: usize,
    pub vertical_fov_deg: f32,
    pub text_size: f32,
    pub show_direction: bool,
    pub show_distance: bool,
    pub show_height: bool,
    pub units: UnitPreference,
    /// Feature-filter bounds
    pub min_height_m: f32,
    pub max_height_m: f32,
    pub min_distance_km: f32,
    pub max_distance_km: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fov_deg: DEFAULT_FOV_DEG,
            heading_bias_deg: 0.0,
            is_calibrated: false,
            smoothing_window: DEFAULT_HEADING_WINDOW,
            vertical_fov_deg: DEFAULT_VERTICAL_FOV_DEG,
            text_size: text_size_for_dpi(240.0),
            show_direction: false,
            show_distance: false,
            show_height: false,
            units: UnitPreference::Metric,
            min_height_m: 0.0,
            max_height_m: 9000.0,
            min_distance_km: 0.0,
            max_distance_km: 30.0,
        }
    }
}

impl Settings {
    /// Annotation flags for the layout engine.
    pub fn annotations(&self) -> LabelAnnotations {
        let mut flags = LabelAnnotations::empty();
        if self.show_direction {
            flags |= LabelAnnotations::DIRECTION;
        }
        if self.show_distance {
            flags |= LabelAnnotations::DISTANCE;
        }
        if self.show_height {
            flags |= LabelAnnotations::HEIGHT;
        }
        flags
    }
}

/// Default label text size for a screen density, stepped rather than scaled
/// so sizes match familiar type ramps.
pub fn text_size_for_dpi(dpi: f32) -> f32 {
    if dpi < 160.0 {
        15.0
    } else if dpi < 240.0 {
        25.0
    } else if dpi < 480.0 {
        40.0
    } else {
        50.0
    }
}

/// Settings persistence seam.
pub trait SettingsStore: Send {
    fn load(&self) -> Result<Settings, SessionError>;
    fn save(&self, settings: &Settings) -> Result<(), SessionError>;
}

/// JSON-file settings store. Writes to a sibling temp file then renames, so
/// a crash mid-write never leaves a truncated document behind.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SessionError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, settings: &Settings) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and headless use.
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: std::sync::Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: std::sync::Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SessionError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), SessionError> {
        *self.inner.lock().unwrap() = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!((s.fov_deg - 50.2).abs() < 0.001);
        assert_eq!(s.smoothing_window, 50);
        assert!(!s.is_calibrated);
        assert!(s.annotations().is_empty());
    }

    #[test]
    fn test_text_size_ladder() {
        assert_eq!(text_size_for_dpi(120.0), 15.0);
        assert_eq!(text_size_for_dpi(160.0), 25.0);
        assert_eq!(text_size_for_dpi(320.0), 40.0);
        assert_eq!(text_size_for_dpi(640.0), 50.0);
    }

    #[test]
    fn test_annotation_flags() {
        let mut s = Settings::default();
        s.show_distance = true;
        s.show_height = true;
        let flags = s.annotations();
        assert!(flags.contains(LabelAnnotations::DISTANCE));
        assert!(flags.contains(LabelAnnotations::HEIGHT));
        assert!(!flags.contains(LabelAnnotations::DIRECTION));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"fov_deg": 61.5, "is_calibrated": true}"#)
            .unwrap();
        assert!((s.fov_deg - 61.5).abs() < 0.001);
        assert!(s.is_calibrated);
        assert_eq!(s.smoothing_window, 50);
    }

    #[test]
    fn test_json_store_round_trip() {
        let path = std::env::temp_dir().join(format!("peaksight-settings-{}.json", std::process::id()));
        let store = JsonSettingsStore::new(&path);
        let mut settings = Settings::default();
        settings.fov_deg = 48.7;
        settings.is_calibrated = true;
        settings.units = UnitPreference::Imperial;
        store.save(&settings).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let store = JsonSettingsStore::new("/nonexistent/peaksight.json");
        assert!(store.load().is_err());
    }
}
