use std::f64::consts::SQRT_2;

use crate::{
    animation::value::TextValue,
    foundation::core::{Affine, BezPath, Cap, Color, Join, Rect},
};

/// How a path is painted.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintStyle {
    Fill {
        color: Color,
    },
    Stroke {
        color: Color,
        width: f32,
        join: Join,
        cap: Cap,
        miter_limit: f32,
    },
}

impl PaintStyle {
    /// Stroke with miter joins (limit 4) and butt caps.
    pub fn stroke(color: Color, width: f32) -> Self {
        Self::Stroke {
            color,
            width,
            join: Join::Miter,
            cap: Cap::Butt,
            miter_limit: 4.0,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Fill { color } | Self::Stroke { color, .. } => *color,
        }
    }

    /// How far painted pixels may reach outside the geometry's bounding box.
    pub fn outset(&self) -> f64 {
        let Self::Stroke {
            width,
            join,
            cap,
            miter_limit,
            ..
        } = self
        else {
            return 0.0;
        };
        let mut factor: f64 = 1.0;
        if *join == Join::Miter {
            factor = factor.max(f64::from(*miter_limit));
        }
        if *cap == Cap::Square {
            factor = factor.max(SQRT_2);
        }
        f64::from(*width) / 2.0 * factor
    }
}

/// Drawing backend driven by `RenderNode::render`.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn concat(&mut self, transform: Affine);
    /// Intersect the clip with `rect` in current coordinates.
    fn clip_rect(&mut self, rect: Rect);
    /// `opacity` is the accumulated group opacity, to be multiplied with the paint color.
    fn draw_path(&mut self, path: &BezPath, style: &PaintStyle, opacity: f32);
    fn draw_text(&mut self, text: &TextValue, opacity: f32);
}

/// State inherited down the tree while rendering.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext {
    pub opacity: f32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

impl RenderContext {
    pub(crate) fn with_opacity(self, opacity: f32) -> Self {
        Self {
            opacity: self.opacity * opacity,
        }
    }
}

/// One recorded canvas call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Concat(Affine),
    ClipRect(Rect),
    Path {
        path: BezPath,
        style: PaintStyle,
        opacity: f32,
    },
    Text {
        text: TextValue,
        opacity: f32,
    },
}

/// Canvas that records draw calls instead of rasterizing them.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Drawing ops only (paths and text), in paint order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Path { .. } | DrawOp::Text { .. }))
    }
}

impl Canvas for DisplayList {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn concat(&mut self, transform: Affine) {
        self.ops.push(DrawOp::Concat(transform));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClipRect(rect));
    }

    fn draw_path(&mut self, path: &BezPath, style: &PaintStyle, opacity: f32) {
        self.ops.push(DrawOp::Path {
            path: path.clone(),
            style: style.clone(),
            opacity,
        });
    }

    fn draw_text(&mut self, text: &TextValue, opacity: f32) {
        self.ops.push(DrawOp::Text {
            text: text.clone(),
            opacity,
        });
    }
}
