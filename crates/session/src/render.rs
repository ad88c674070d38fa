//! Rendering seam
//!
//! The session hands each frame's primitive list to a [`RenderSink`]; the
//! real implementation rasterizes to a surface, the recording sink captures
//! frames for tests and the demo binary.

use peaksight_core::layout::DrawPrimitive;

/// Consumes one frame of draw primitives, in paint order.
pub trait RenderSink: Send {
    fn submit(&mut self, primitives: &[DrawPrimitive]);
}

/// Keeps every submitted frame.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Vec<Vec<DrawPrimitive>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<DrawPrimitive>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[DrawPrimitive]> {
        self.frames.last().map(|f| f.as_slice())
    }
}

impl RenderSink for RecordingSink {
    fn submit(&mut self, primitives: &[DrawPrimitive]) {
        self.frames.push(primitives.to_vec());
    }
}
