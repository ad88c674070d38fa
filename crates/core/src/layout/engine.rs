//! Horizon label layout
//!
//! Per redraw tick, takes the current smoothed heading/elevation, the
//! calibrated field of view, and a relevance-ordered feature sequence, and
//! produces an ordered primitive list plus tap targets. The stacking pass is
//! a single greedy sweep that hands each placed label its own slot of the
//! vertical budget: earlier (more relevant) features get larger text and
//! higher opacity; features beyond the budget are dropped entirely.

use core::fmt::Write as _;

use heapless::{String, Vec};
use libm::{cosf, fabsf, floorf, sinf};

use super::metrics::TextMetrics;
use super::types::{
    Argb, DrawPrimitive, Feature, HitRegion, LabelAnnotations, LayoutOutput, PlacedLabel,
    ScreenRect, TextAlign, Units, MAX_PRIMITIVES, MAX_TEXT_LEN, MAX_VISIBLE_LABELS,
};

/// Default horizontal field of view before calibration, degrees
pub const DEFAULT_FOV_DEG: f32 = 50.2;

/// Default vertical field of view, degrees
pub const DEFAULT_VERTICAL_FOV_DEG: f32 = 20.0;

const TEXT_SIZE_DECREMENT: f32 = 1.0;
const TEXT_SIZE_MIN: f32 = 7.0;
const ALPHA_LABEL_MAX: u8 = 255;
const ALPHA_LINE_MAX: u8 = 205;
const ALPHA_DECREMENT: u8 = 10;
const ALPHA_STROKE_MAX: u8 = 200;
const ALPHA_LABEL_MIN: u8 = 180;
const ALPHA_LINE_MIN: u8 = 50;
/// Residual clip correction applied when the font has shrunk below this
const LABEL_CLIP_FUDGE: f32 = 13.0;
const CROSSBAR_HALF_WIDTH: f32 = 20.0;
const LABEL_BASELINE_GAP: f32 = 5.0;

const MILES_PER_KM: f32 = 0.621_371;
const FEET_PER_M: f32 = 3.280_839_9;

const WHITE: Argb = Argb::new(255, 255, 255, 255);
const BLACK: Argb = Argb::new(255, 0, 0, 0);
const RED: Argb = Argb::new(255, 255, 0, 0);
const GREEN: Argb = Argb::new(255, 0, 200, 0);

/// Read-only layout inputs, persisted settings plus screen geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub screen_w: f32,
    pub screen_h: f32,
    pub fov_deg: f32,
    pub vertical_fov_deg: f32,
    /// Starting font size for the most relevant label
    pub text_size: f32,
    /// Vertical pixels available for stacking labels above the horizon
    pub top_budget: f32,
    pub annotations: LabelAnnotations,
    pub units: Units,
}

impl LayoutConfig {
    /// Defaults for a given screen, with the uncalibrated field of view.
    pub fn for_screen(screen_w: f32, screen_h: f32) -> Self {
        Self {
            screen_w,
            screen_h,
            fov_deg: DEFAULT_FOV_DEG,
            vertical_fov_deg: DEFAULT_VERTICAL_FOV_DEG,
            text_size: 25.0,
            top_budget: screen_h / 1.6,
            annotations: LabelAnnotations::empty(),
            units: Units::Metric,
        }
    }
}

/// Where a feature sits within the field of view, or `None` when out of view.
///
/// Tries the three wraparound phasings of the bearing so features near the
/// 0/360 boundary are never lost. Left of heading maps to negative ratios,
/// right to positive. A zero (or negative) field of view matches nothing.
pub fn visible_ratio(bearing_deg: f32, heading_deg: f32, fov_deg: f32) -> Option<f32> {
    if fov_deg <= 0.0 {
        return None;
    }
    let base = heading_deg - bearing_deg;
    let mut best: Option<f32> = None;
    for offset in [base, base - 360.0, base + 360.0] {
        if fabsf(offset) < fov_deg && best.map_or(true, |b| fabsf(offset) < fabsf(b)) {
            best = Some(offset);
        }
    }
    best.map(|offset| -offset / fov_deg)
}

/// Whether this feature gets the taller two-line slot.
fn wants_annotation(feature: &Feature, annotations: LabelAnnotations) -> bool {
    annotations.contains(LabelAnnotations::DIRECTION)
        || annotations.contains(LabelAnnotations::DISTANCE)
        || (annotations.contains(LabelAnnotations::HEIGHT) && feature.height_m > 0.0)
}

/// Truncate to one decimal place (display convention, never rounds up).
fn one_decimal(x: f32) -> f32 {
    floorf(x * 10.0) / 10.0
}

/// Build the annotation suffix line, e.g. `(124° 3.2km 931m)`.
fn annotation_text(
    feature: &Feature,
    annotations: LabelAnnotations,
    units: Units,
) -> String<MAX_TEXT_LEN> {
    let mut text = String::new();
    let _ = text.push('(');
    if annotations.contains(LabelAnnotations::DIRECTION) {
        let _ = write!(text, "{:.1}\u{b0}", one_decimal(feature.bearing_deg));
    }
    if annotations.contains(LabelAnnotations::DISTANCE) {
        if text.len() > 1 {
            let _ = text.push(' ');
        }
        match units {
            Units::Metric => {
                let _ = write!(text, "{:.1}km", one_decimal(feature.distance_km));
            }
            Units::Imperial => {
                let _ = write!(
                    text,
                    "{:.1}miles",
                    one_decimal(feature.distance_km * MILES_PER_KM)
                );
            }
        }
    }
    if annotations.contains(LabelAnnotations::HEIGHT) && feature.height_m > 0.0 {
        if text.len() > 1 {
            let _ = text.push(' ');
        }
        match units {
            Units::Metric => {
                let _ = write!(text, "{:.1}m", one_decimal(feature.height_m));
            }
            Units::Imperial => {
                let _ = write!(text, "{:.1}ft", one_decimal(feature.height_m * FEET_PER_M));
            }
        }
    }
    let _ = text.push(')');
    text
}

/// Greedy horizon label layout over reusable output buffers.
///
/// A pass with unchanged inputs produces identical output; buffers are
/// cleared at the start of every pass and hit regions are only valid until
/// the next one.
#[derive(Debug, Default)]
pub struct HorizonLayoutEngine {
    out: LayoutOutput,
}

impl HorizonLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of the most recent pass.
    pub fn output(&self) -> &LayoutOutput {
        &self.out
    }

    /// Mutable output access, for hosts that append overlay primitives
    /// (status ring, calibration instructions) after a pass.
    pub fn output_mut(&mut self) -> &mut LayoutOutput {
        &mut self.out
    }

    /// Run one layout pass.
    ///
    /// `features` must be pre-sorted by relevance (nearest/tallest first);
    /// placement order, text size, and opacity all follow that order. An
    /// empty result is valid output, not an error.
    pub fn layout(
        &mut self,
        features: &[Feature],
        heading_deg: f32,
        elevation_rad: f32,
        cfg: &LayoutConfig,
        metrics: &dyn TextMetrics,
    ) -> &LayoutOutput {
        self.out.clear();

        let mut visible: Vec<(usize, f32), MAX_VISIBLE_LABELS> = Vec::new();
        for (i, feature) in features.iter().enumerate() {
            if let Some(ratio) = visible_ratio(feature.bearing_deg, heading_deg, cfg.fov_deg) {
                if visible.push((i, ratio)).is_err() {
                    break;
                }
            }
        }

        // Stacking: consume the vertical budget top-down, shrinking font and
        // fading opacity per placed label
        let mut budget = cfg.top_budget;
        let mut font = cfg.text_size;
        let mut label_alpha = ALPHA_LABEL_MAX;
        let mut line_alpha = ALPHA_LINE_MAX;
        let mut anchors: Vec<f32, MAX_VISIBLE_LABELS> = Vec::new();
        for &(i, ratio) in visible.iter() {
            if budget <= 0.0 {
                break;
            }
            let feature = &features[i];
            let slot = if wants_annotation(feature, cfg.annotations) {
                1.0 + 2.0 * font
            } else {
                font
            };
            let _ = anchors.push(budget);
            let _ = self.out.labels.push(PlacedLabel {
                feature_id: feature.id,
                screen_ratio: ratio,
                anchor_y: 0.0,
                font_size: font,
                label_alpha,
                line_alpha,
            });
            budget -= slot;
            if font - TEXT_SIZE_DECREMENT >= TEXT_SIZE_MIN {
                font -= TEXT_SIZE_DECREMENT;
            }
            if label_alpha.saturating_sub(ALPHA_DECREMENT) >= ALPHA_LABEL_MIN {
                label_alpha -= ALPHA_DECREMENT;
            }
            if line_alpha.saturating_sub(ALPHA_DECREMENT) >= ALPHA_LINE_MIN {
                line_alpha -= ALPHA_DECREMENT;
            }
        }

        // Anchors are absolute screen positions from the stacking pass, not
        // offsets from the projected horizon point: two labels can share a
        // projected y (or an x) yet never an anchor, so stacked labels stay
        // apart whatever their features' elevations. Counting the anchors
        // down from the unspent budget sits the stack as low as possible,
        // with a clip correction at the smallest sizes.
        let leftover = budget - (LABEL_CLIP_FUDGE - font).max(0.0);
        for (label, anchor) in self.out.labels.iter_mut().zip(anchors.iter()) {
            label.anchor_y = anchor - leftover;
        }

        // Lines first, then text, so no leader line crosses a label
        let placed = self.out.labels.len();
        for k in 0..placed {
            let label = self.out.labels[k];
            let feature = &features[visible[k].0];
            let (x, y) = project(feature, label.screen_ratio, elevation_rad, cfg);
            let top = label.anchor_y;
            let stroke = BLACK.with_alpha(label.line_alpha.min(ALPHA_STROKE_MAX));
            let fill = WHITE.with_alpha(label.line_alpha);
            self.push_line(x, y, x, top, 2.0, stroke);
            self.push_line(x, y, x, top, 1.0, fill);
            self.push_line(x - CROSSBAR_HALF_WIDTH, top, x + CROSSBAR_HALF_WIDTH, top, 2.0, stroke);
            self.push_line(x - CROSSBAR_HALF_WIDTH, top, x + CROSSBAR_HALF_WIDTH, top, 1.0, fill);
        }

        for k in 0..placed {
            let label = self.out.labels[k];
            let feature = &features[visible[k].0];
            let (x, _) = project(feature, label.screen_ratio, elevation_rad, cfg);
            let baseline = label.anchor_y - LABEL_BASELINE_GAP;

            let mut name: String<MAX_TEXT_LEN> = String::new();
            let _ = name.push_str(feature.name.as_str());
            let stroke_alpha = label.label_alpha.min(ALPHA_STROKE_MAX);
            self.push_text(&name, x, baseline, label.font_size, BLACK.with_alpha(stroke_alpha), 2.0);
            self.push_text(&name, x, baseline, label.font_size, WHITE.with_alpha(label.label_alpha), 0.0);

            if wants_annotation(feature, cfg.annotations) {
                let detail = annotation_text(feature, cfg.annotations, cfg.units);
                let detail_baseline = baseline + label.font_size + 1.0;
                self.push_text(&detail, x, detail_baseline, label.font_size, BLACK.with_alpha(stroke_alpha), 2.0);
                self.push_text(&detail, x, detail_baseline, label.font_size, WHITE.with_alpha(label.label_alpha), 0.0);
            }

            let bounds = metrics.measure(name.as_str(), label.font_size);
            let _ = self.out.hit_regions.push(HitRegion {
                feature_id: feature.id,
                rect: ScreenRect {
                    x: x - bounds.width / 2.0,
                    y: baseline - bounds.ascent,
                    w: bounds.width,
                    h: bounds.height(),
                },
            });
        }

        &self.out
    }

    fn push_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Argb) {
        let _ = self.out.primitives.push(DrawPrimitive::Line {
            x0,
            y0,
            x1,
            y1,
            width,
            color,
        });
    }

    fn push_text(
        &mut self,
        text: &String<MAX_TEXT_LEN>,
        x: f32,
        y: f32,
        size: f32,
        color: Argb,
        stroke_width: f32,
    ) {
        let _ = self.out.primitives.push(DrawPrimitive::Text {
            text: text.clone(),
            x,
            y,
            size,
            color,
            align: TextAlign::Center,
            stroke_width,
        });
    }
}

/// Screen position of a feature's horizon point.
fn project(feature: &Feature, ratio: f32, elevation_rad: f32, cfg: &LayoutConfig) -> (f32, f32) {
    let x = cfg.screen_w * ratio + cfg.screen_w / 2.0;
    let y = cfg.screen_h * (feature.elevation_rad - elevation_rad).to_degrees()
        / cfg.vertical_fov_deg
        + cfg.screen_h / 2.0;
    (x, y)
}

/// Compass-stability indicator: a ring of 24 tick marks in the lower-left
/// corner, red up to the current variance score, green past it.
pub fn variance_ring(
    out: &mut Vec<DrawPrimitive, MAX_PRIMITIVES>,
    variance_score: i32,
    screen_w: f32,
    screen_h: f32,
) {
    let cx = screen_w / 7.0;
    let cy = screen_h - screen_h / 2.7;
    let dash = screen_h / 10.0;
    let inner = dash / 5.0;

    for i in 0..24 {
        let angle = ((i * 15) as f32).to_radians();
        let (s, c) = (sinf(angle), cosf(angle));
        let color = if (i as i32) < variance_score { RED } else { GREEN };
        let _ = out.push(DrawPrimitive::Line {
            x0: cx + inner * s,
            y0: cy - inner * c,
            x1: cx + dash * s,
            y1: cy - dash * c,
            width: 4.0,
            color,
        });
    }
}

/// Full-screen calibration instructions plus the live heading readout.
///
/// Text size adapts to the screen: the longest instruction line is shrunk
/// until it fits within the backdrop.
pub fn calibration_overlay(
    out: &mut Vec<DrawPrimitive, MAX_PRIMITIVES>,
    cfg: &LayoutConfig,
    awaiting_second_tap: bool,
    heading_deg: f32,
    variance_score: i32,
    metrics: &dyn TextMetrics,
) {
    let gap = cfg.screen_w / 20.0;
    let vgap = cfg.screen_h / 10.0;
    let _ = out.push(DrawPrimitive::Rect {
        x: gap,
        y: vgap,
        w: cfg.screen_w - 2.0 * gap,
        h: cfg.screen_h - 2.0 * vgap,
        color: Argb::new(100, 0, 0, 0),
    });

    let lines: [&str; 7] = if awaiting_second_tap {
        [
            "Calibrating field of view",
            "",
            "Now pan right until the same",
            "summit sits at the RIGHT edge",
            "of the screen, then tap again.",
            "",
            "The angle panned becomes the view width.",
        ]
    } else {
        [
            "Calibration needed",
            "",
            "Line up a summit you can identify",
            "with the LEFT edge of the screen,",
            "then tap anywhere.",
            "",
            "Let the heading readout settle first.",
        ]
    };

    let longest = lines
        .iter()
        .max_by_key(|l| l.chars().count())
        .copied()
        .unwrap_or("");
    let max_width = 0.7 * (cfg.screen_w - 4.0 * gap);
    let mut size = 40.0;
    while size > 10.0 && metrics.measure(longest, size).width > max_width {
        size -= 1.0;
    }

    let mut y = vgap * 2.0;
    for line in lines {
        if !line.is_empty() {
            let mut text: String<MAX_TEXT_LEN> = String::new();
            let _ = text.push_str(line);
            let _ = out.push(DrawPrimitive::Text {
                text,
                x: gap * 2.0,
                y,
                size,
                color: WHITE,
                align: TextAlign::Left,
                stroke_width: 0.0,
            });
        }
        y += size * 1.3;
    }

    let mut readout: String<MAX_TEXT_LEN> = String::new();
    let _ = write!(readout, "Dir: {:.1}\u{b0}  SD: {}", heading_deg, variance_score);
    let _ = out.push(DrawPrimitive::Text {
        text: readout,
        x: cfg.screen_w / 2.0,
        y: cfg.screen_h - vgap * 1.5,
        size,
        color: WHITE,
        align: TextAlign::Center,
        stroke_width: 0.0,
    });

    variance_ring(out, variance_score, cfg.screen_w, cfg.screen_h);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::HeuristicTextMetrics;

    fn feature(id: u32, name: &str, bearing_deg: f32) -> Feature {
        Feature {
            id,
            name: String::try_from(name).unwrap(),
            bearing_deg,
            elevation_rad: 0.02,
            distance_km: 8.5,
            height_m: 931.0,
        }
    }

    fn plain_config() -> LayoutConfig {
        let mut cfg = LayoutConfig::for_screen(800.0, 480.0);
        cfg.fov_deg = 20.0;
        cfg
    }

    #[test]
    fn test_visible_ratio_inside_fov() {
        let r = visible_ratio(95.0, 90.0, 20.0).unwrap();
        // Feature clockwise of heading: positive ratio
        assert!((r - 0.25).abs() < 0.001, "Expected 0.25, got {}", r);
        let r = visible_ratio(85.0, 90.0, 20.0).unwrap();
        assert!((r + 0.25).abs() < 0.001, "Expected -0.25, got {}", r);
    }

    #[test]
    fn test_visible_ratio_wraps_at_north() {
        // Heading 350, bearing 5: offset resolves to -15 via the +360 phasing
        let r = visible_ratio(5.0, 350.0, 20.0).unwrap();
        assert!((r - 0.75).abs() < 0.001, "Expected 0.75, got {}", r);
        let r = visible_ratio(350.0, 5.0, 20.0).unwrap();
        assert!((r + 0.75).abs() < 0.001, "Expected -0.75, got {}", r);
    }

    #[test]
    fn test_visible_ratio_rejects_out_of_view() {
        assert!(visible_ratio(120.0, 90.0, 20.0).is_none());
    }

    #[test]
    fn test_zero_fov_matches_nothing() {
        assert!(visible_ratio(90.0, 90.0, 0.0).is_none());

        let mut engine = HorizonLayoutEngine::new();
        let features = [feature(1, "Helvellyn", 90.0)];
        let mut cfg = plain_config();
        cfg.fov_deg = 0.0;
        let out = engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert!(out.labels.is_empty());
        assert!(out.primitives.is_empty());
        assert!(out.hit_regions.is_empty());
    }

    #[test]
    fn test_budget_for_three_short_slots_places_three_of_five() {
        let mut engine = HorizonLayoutEngine::new();
        let features: [Feature; 5] = core::array::from_fn(|i| {
            feature(i as u32, "Summit", 90.0)
        });
        let mut cfg = plain_config();
        cfg.annotations = LabelAnnotations::empty();
        cfg.text_size = 20.0;
        // 20 + 19 + 18 consumes exactly this; the fourth finds nothing left
        cfg.top_budget = 57.0;
        let out = engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert_eq!(out.labels.len(), 3);
        assert_eq!(out.hit_regions.len(), 3);
        assert!((out.labels[0].font_size - 20.0).abs() < 0.001);
        assert!((out.labels[2].font_size - 18.0).abs() < 0.001);
        assert!(out.labels[2].font_size <= out.labels[0].font_size);
    }

    #[test]
    fn test_font_never_shrinks_below_floor() {
        let mut engine = HorizonLayoutEngine::new();
        let features: [Feature; 20] = core::array::from_fn(|i| {
            feature(i as u32, "S", 90.0)
        });
        let mut cfg = plain_config();
        cfg.text_size = 9.0;
        cfg.top_budget = 10_000.0;
        let out = engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert_eq!(out.labels.len(), 20);
        for label in out.labels.iter() {
            assert!(label.font_size >= TEXT_SIZE_MIN);
        }
        assert!((out.labels.last().unwrap().font_size - TEXT_SIZE_MIN).abs() < 0.001);
    }

    #[test]
    fn test_alpha_fades_with_separate_floors() {
        let mut engine = HorizonLayoutEngine::new();
        let features: [Feature; 30] = core::array::from_fn(|i| {
            feature(i as u32, "S", 90.0)
        });
        let mut cfg = plain_config();
        cfg.top_budget = 100_000.0;
        let out = engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert_eq!(out.labels[0].label_alpha, 255);
        assert_eq!(out.labels[0].line_alpha, 205);
        let last = out.labels.last().unwrap();
        assert_eq!(last.label_alpha, 185);
        assert_eq!(last.line_alpha, 55);
    }

    #[test]
    fn test_tall_slots_consume_more_budget() {
        let features: [Feature; 5] = core::array::from_fn(|i| {
            feature(i as u32, "Summit", 90.0)
        });
        let mut cfg = plain_config();
        cfg.text_size = 20.0;
        cfg.top_budget = 57.0;

        let mut engine = HorizonLayoutEngine::new();
        cfg.annotations = LabelAnnotations::DIRECTION;
        // Tall slots of 41 and 40: only two fit where three shorts did
        let out = engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert_eq!(out.labels.len(), 2);
    }

    #[test]
    fn test_height_annotation_requires_positive_height() {
        let mut low = feature(1, "Sea Stack", 90.0);
        low.height_m = 0.0;
        let tall = feature(2, "Summit", 90.0);
        let mut cfg = plain_config();
        cfg.annotations = LabelAnnotations::HEIGHT;
        assert!(!wants_annotation(&low, cfg.annotations));
        assert!(wants_annotation(&tall, cfg.annotations));
    }

    #[test]
    fn test_projection_centers_level_feature() {
        let mut engine = HorizonLayoutEngine::new();
        let mut f = feature(1, "Summit", 90.0);
        f.elevation_rad = 0.0;
        let cfg = plain_config();
        let out = engine.layout(&[f], 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        // Dead ahead and level: leader line lands at screen center
        let line = out
            .primitives
            .iter()
            .find_map(|p| match p {
                DrawPrimitive::Line { x0, y0, .. } => Some((*x0, *y0)),
                _ => None,
            })
            .unwrap();
        assert!((line.0 - 400.0).abs() < 0.001);
        assert!((line.1 - 240.0).abs() < 0.001);
    }

    #[test]
    fn test_annotation_text_metric_and_imperial() {
        let f = feature(1, "Summit", 124.25);
        let all = LabelAnnotations::all();
        let metric = annotation_text(&f, all, Units::Metric);
        assert_eq!(metric.as_str(), "(124.2\u{b0} 8.5km 931.0m)");
        let imperial = annotation_text(&f, all, Units::Imperial);
        assert_eq!(imperial.as_str(), "(124.2\u{b0} 5.2miles 3054.4ft)");
    }

    #[test]
    fn test_labels_anchor_apart_across_elevations() {
        // Features whose projected horizon points coincide on screen must
        // still get distinct label anchors from the stacking pass
        let mut high = feature(1, "Summit", 90.0);
        high.elevation_rad = 0.0;
        let mut low = feature(2, "Summit", 90.0);
        low.elevation_rad = -0.0182;
        let cfg = plain_config();

        let mut engine = HorizonLayoutEngine::new();
        let out = engine.layout(&[high, low], 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert_eq!(out.labels.len(), 2);
        let gap = out.labels[0].anchor_y - out.labels[1].anchor_y;
        assert!(
            gap >= out.labels[0].font_size - 0.001,
            "Anchors must be a full slot apart, got {}",
            gap
        );

        // Each label is individually targetable at its own center
        let center = |r: &ScreenRect| (r.x + r.w / 2.0, r.y + r.h / 2.0);
        let (ax, ay) = center(&out.hit_regions[0].rect);
        let (bx, by) = center(&out.hit_regions[1].rect);
        assert_eq!(out.hit_test(ax, ay), Some(1));
        assert_eq!(out.hit_test(bx, by), Some(2));
    }

    #[test]
    fn test_variance_ring_survives_full_label_load() {
        // 32 annotated labels consume 256 primitives; the overlay must
        // still fit in the buffer behind them
        let mut engine = HorizonLayoutEngine::new();
        let features: [Feature; 32] = core::array::from_fn(|i| {
            feature(i as u32, "Summit", 90.0)
        });
        let mut cfg = plain_config();
        cfg.annotations = LabelAnnotations::DIRECTION;
        cfg.top_budget = 100_000.0;
        engine.layout(&features, 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        let out = engine.output_mut();
        assert_eq!(out.primitives.len(), 256);

        variance_ring(&mut out.primitives, 3, 800.0, 480.0);
        let ticks = out
            .primitives
            .iter()
            .filter(|p| matches!(p, DrawPrimitive::Line { width, .. } if *width == 4.0))
            .count();
        assert_eq!(ticks, 24);
    }

    #[test]
    fn test_hit_region_covers_label_text() {
        let mut engine = HorizonLayoutEngine::new();
        let features = [feature(42, "Helvellyn", 90.0)];
        let cfg = plain_config();
        let out = engine.layout(&features, 90.0, 0.02, &cfg, &HeuristicTextMetrics);
        let region = out.hit_regions[0];
        assert_eq!(region.feature_id, 42);
        let cx = region.rect.x + region.rect.w / 2.0;
        let cy = region.rect.y + region.rect.h / 2.0;
        assert_eq!(out.hit_test(cx, cy), Some(42));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let features: [Feature; 4] = core::array::from_fn(|i| {
            feature(i as u32, "Summit", 85.0 + 3.0 * i as f32)
        });
        let mut cfg = plain_config();
        cfg.annotations = LabelAnnotations::DISTANCE;

        let mut engine = HorizonLayoutEngine::new();
        let first = engine
            .layout(&features, 90.0, 0.01, &cfg, &HeuristicTextMetrics)
            .clone();
        let second = engine.layout(&features, 90.0, 0.01, &cfg, &HeuristicTextMetrics);
        assert_eq!(&first, second);
    }

    #[test]
    fn test_empty_feature_list_is_valid() {
        let mut engine = HorizonLayoutEngine::new();
        let cfg = plain_config();
        let out = engine.layout(&[], 90.0, 0.0, &cfg, &HeuristicTextMetrics);
        assert!(out.labels.is_empty());
        assert!(out.primitives.is_empty());
    }

    #[test]
    fn test_variance_ring_colors_split_at_score() {
        let mut out: Vec<DrawPrimitive, MAX_PRIMITIVES> = Vec::new();
        variance_ring(&mut out, 6, 800.0, 480.0);
        assert_eq!(out.len(), 24);
        let reds = out
            .iter()
            .filter(|p| matches!(p, DrawPrimitive::Line { color, .. } if *color == RED))
            .count();
        assert_eq!(reds, 6);
    }

    #[test]
    fn test_calibration_overlay_has_backdrop_and_readout() {
        let mut out: Vec<DrawPrimitive, MAX_PRIMITIVES> = Vec::new();
        let cfg = plain_config();
        calibration_overlay(&mut out, &cfg, false, 213.4, 2, &HeuristicTextMetrics);
        assert!(matches!(out[0], DrawPrimitive::Rect { .. }));
        let readout = out.iter().any(|p| {
            matches!(p, DrawPrimitive::Text { text, .. } if text.as_str().contains("Dir: 213.4"))
        });
        assert!(readout);
        // Ring ticks ride along
        let lines = out
            .iter()
            .filter(|p| matches!(p, DrawPrimitive::Line { .. }))
            .count();
        assert_eq!(lines, 24);
    }
}
