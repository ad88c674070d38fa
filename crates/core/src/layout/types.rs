//! Data types shared across the layout engine and its consumers

use bitflags::bitflags;
use heapless::{String, Vec};

/// Longest feature name carried through layout
pub const MAX_NAME_LEN: usize = 48;

/// Longest rendered text run (name plus annotation suffix)
pub const MAX_TEXT_LEN: usize = 64;

/// Most labels a single pass can place
pub const MAX_VISIBLE_LABELS: usize = 32;

/// Capacity of the draw-primitive output buffer: a full complement of
/// annotated labels (8 primitives each) plus the status/calibration overlay
pub const MAX_PRIMITIVES: usize = 320;

/// One terrain feature as supplied by the feature source, immutable for the
/// duration of a layout pass. `elevation_rad` is the visual elevation angle,
/// already corrected for curvature and refraction upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: u32,
    pub name: String<MAX_NAME_LEN>,
    pub bearing_deg: f32,
    pub elevation_rad: f32,
    pub distance_km: f32,
    pub height_m: f32,
}

bitflags! {
    /// Optional annotation fields appended to a label's text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LabelAnnotations: u8 {
        const DIRECTION = 1 << 0;
        const DISTANCE = 1 << 1;
        const HEIGHT = 1 << 2;
    }
}

/// Display units for distance and height annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

/// Packed ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Horizontal anchoring of a text primitive at its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// One drawing command for the rendering surface, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: f32,
        color: Argb,
    },
    Text {
        text: String<MAX_TEXT_LEN>,
        x: f32,
        /// Baseline y
        y: f32,
        size: f32,
        color: Argb,
        align: TextAlign,
        /// 0.0 draws filled glyphs; nonzero draws an outline of this width
        stroke_width: f32,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Argb,
    },
}

/// A label the stacking pass decided to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLabel {
    pub feature_id: u32,
    /// Horizontal position within the field of view, -1 left edge to +1 right
    pub screen_ratio: f32,
    /// Absolute screen y of the label anchor. Assigned by the stacking pass
    /// alone, so two labels never share an anchor whatever their features'
    /// projected elevations.
    pub anchor_y: f32,
    pub font_size: f32,
    pub label_alpha: u8,
    pub line_alpha: u8,
}

/// Axis-aligned screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ScreenRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Tap target for one placed label, valid only until the next layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub feature_id: u32,
    pub rect: ScreenRect,
}

/// Everything one layout pass produces, in reusable buffers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutOutput {
    pub labels: Vec<PlacedLabel, MAX_VISIBLE_LABELS>,
    pub primitives: Vec<DrawPrimitive, MAX_PRIMITIVES>,
    pub hit_regions: Vec<HitRegion, MAX_VISIBLE_LABELS>,
}

impl LayoutOutput {
    pub fn clear(&mut self) {
        self.labels.clear();
        self.primitives.clear();
        self.hit_regions.clear();
    }

    /// Feature id of the topmost hit region containing the point, if any.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<u32> {
        self.hit_regions
            .iter()
            .find(|h| h.rect.contains(px, py))
            .map(|h| h.feature_id)
    }
}
