//! Host integration for peaksight.
//!
//! Wraps the pure algorithms from `peaksight_core` with everything a real
//! deployment needs: persisted settings, asynchronous position acquisition,
//! a feature catalog, and the per-activation [`ViewSession`] context object
//! that ties sensor input to layout output.

pub mod error;
pub mod features;
pub mod position;
pub mod render;
pub mod session;
pub mod settings;

pub use error::SessionError;
pub use features::{CatalogFeatureSource, FeatureFilter, FeatureSource, SummitRecord};
pub use position::{
    position_status, PositionFix, PositionProvider, PositionStatus, PositionTracker,
    RENEWAL_INTERVAL,
};
pub use render::{RecordingSink, RenderSink};
pub use session::{StatusReadout, TapAction, ViewSession};
pub use settings::{
    text_size_for_dpi, JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore,
    UnitPreference, ACCURACY_WARNING_M,
};
