//! Horizon label layout engine
//!
//! - [`types`]: features, placed labels, hit regions, draw primitives
//! - [`metrics`]: text-measurement trait seam plus a deterministic heuristic
//! - [`engine`]: visibility, greedy stacking, projection, overlay drawing

pub mod engine;
pub mod metrics;
pub mod types;

pub use engine::{
    calibration_overlay, variance_ring, visible_ratio, HorizonLayoutEngine, LayoutConfig,
    DEFAULT_FOV_DEG, DEFAULT_VERTICAL_FOV_DEG,
};
pub use metrics::{HeuristicTextMetrics, TextBounds, TextMetrics};
pub use types::{
    Argb, DrawPrimitive, Feature, HitRegion, LabelAnnotations, LayoutOutput, PlacedLabel,
    ScreenRect, TextAlign, Units, MAX_NAME_LEN, MAX_PRIMITIVES, MAX_TEXT_LEN, MAX_VISIBLE_LABELS,
};
