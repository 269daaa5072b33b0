use std::{cell::RefCell, rc::Rc};

use kurbo::{Ellipse, RoundedRect, Shape as _};

use crate::{
    animation::value::{Justification, TextValue},
    foundation::core::{Affine, BezPath, Point, Rect, Size},
    scene::{
        canvas::{Canvas, PaintStyle, RenderContext},
        node::{InvalidationController, MatrixRef, RenderNode},
    },
};

const PATH_TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum GeometryKind {
    Rect {
        center: Point,
        size: Size,
        radius: f64,
    },
    Ellipse {
        center: Point,
        size: Size,
    },
    Path(BezPath),
}

impl GeometryKind {
    fn to_path(&self) -> BezPath {
        match self {
            Self::Rect {
                center,
                size,
                radius,
            } => {
                let rect = Rect::from_center_size(*center, *size);
                let radius = radius.min(rect.width().min(rect.height()) / 2.0).max(0.0);
                RoundedRect::from_rect(rect, radius).to_path(PATH_TOLERANCE)
            }
            Self::Ellipse { center, size } => {
                Ellipse::new(*center, (size.width / 2.0, size.height / 2.0), 0.0)
                    .to_path(PATH_TOLERANCE)
            }
            Self::Path(path) => path.clone(),
        }
    }
}

/// Shared geometry; every change bumps the revision so dependent draws revalidate.
#[derive(Debug)]
pub(crate) struct Geometry {
    kind: GeometryKind,
    path: BezPath,
    revision: u64,
}

pub(crate) type GeometryRef = Rc<RefCell<Geometry>>;

impl Geometry {
    pub(crate) fn new_ref(kind: GeometryKind) -> GeometryRef {
        let path = kind.to_path();
        Rc::new(RefCell::new(Self {
            kind,
            path,
            revision: 0,
        }))
    }

    pub(crate) fn set(&mut self, kind: GeometryKind) {
        if self.kind != kind {
            self.path = kind.to_path();
            self.kind = kind;
            self.revision += 1;
        }
    }

    pub(crate) fn path(&self) -> &BezPath {
        &self.path
    }
}

#[derive(Debug)]
pub(crate) struct Paint {
    style: PaintStyle,
    revision: u64,
}

pub(crate) type PaintRef = Rc<RefCell<Paint>>;

impl Paint {
    pub(crate) fn new_ref(style: PaintStyle) -> PaintRef {
        Rc::new(RefCell::new(Self { style, revision: 0 }))
    }

    pub(crate) fn set(&mut self, style: PaintStyle) {
        if self.style != style {
            self.style = style;
            self.revision += 1;
        }
    }

    pub(crate) fn style(&self) -> &PaintStyle {
        &self.style
    }
}

/// A geometry as seen from an enclosing shape group: the shared geometry moved by the
/// transforms of the nested groups it was declared in, innermost first.
#[derive(Clone, Debug)]
pub(crate) struct GeometryView {
    geometry: GeometryRef,
    transforms: Vec<MatrixRef>,
}

impl GeometryView {
    /// Lift the view out of a group transformed by `matrix`.
    pub(crate) fn transformed(mut self, matrix: MatrixRef) -> Self {
        self.transforms.push(matrix);
        self
    }

    fn transform(&self) -> Affine {
        self.transforms
            .iter()
            .fold(Affine::IDENTITY, |acc, m| m.borrow().total() * acc)
    }

    fn path(&self) -> BezPath {
        let mut path = self.geometry.borrow().path().clone();
        if !self.transforms.is_empty() {
            path.apply_affine(self.transform());
        }
        path
    }
}

impl From<GeometryRef> for GeometryView {
    fn from(geometry: GeometryRef) -> Self {
        Self {
            geometry,
            transforms: Vec::new(),
        }
    }
}

/// Leaf drawing one geometry with one paint.
pub(crate) struct Draw {
    geometry: GeometryView,
    paint: PaintRef,
    seen: Option<(u64, u64, Affine, Affine)>,
    bounds: Rect,
}

impl Draw {
    pub(crate) fn new(geometry: impl Into<GeometryView>, paint: PaintRef) -> Self {
        Self {
            geometry: geometry.into(),
            paint,
            seen: None,
            bounds: Rect::ZERO,
        }
    }

    fn device_bounds(&self, ctm: Affine) -> Rect {
        let local = self.geometry.path().bounding_box();
        let outset = self.paint.borrow().style().outset();
        ctm.transform_rect_bbox(local.inflate(outset, outset))
    }
}

impl RenderNode for Draw {
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect {
        let state = (
            self.geometry.geometry.borrow().revision,
            self.paint.borrow().revision,
            self.geometry.transform(),
            ctm,
        );
        if self.seen != Some(state) {
            let bounds = self.device_bounds(ctm);
            ic.inval(self.bounds);
            ic.inval(bounds);
            self.bounds = bounds;
            self.seen = Some(state);
        }
        self.bounds
    }

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext) {
        canvas.draw_path(
            &self.geometry.path(),
            self.paint.borrow().style(),
            ctx.opacity,
        );
    }
}

/// A single text run with approximate metrics (no shaping).
pub(crate) struct TextNode {
    value: TextValue,
    dirty: bool,
    ctm: Option<Affine>,
    bounds: Rect,
}

impl TextNode {
    pub(crate) fn new() -> Self {
        Self {
            value: TextValue::default(),
            dirty: true,
            ctm: None,
            bounds: Rect::ZERO,
        }
    }

    pub(crate) fn set_value(&mut self, value: &TextValue) {
        if self.value != *value {
            self.value = value.clone();
            self.dirty = true;
        }
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> &TextValue {
        &self.value
    }

    /// Baseline at `y = 0`, advance estimated at 0.6 em per character.
    fn local_bounds(&self) -> Rect {
        let v = &self.value;
        let size = f64::from(v.size);
        let widest = v
            .text
            .split(['\r', '\n'])
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let width = widest as f64 * size * 0.6;
        let height = (v.line_count().saturating_sub(1)) as f64
            * f64::from(v.effective_line_height())
            + size;
        let x0 = match v.justification {
            Justification::Left => 0.0,
            Justification::Right => -width,
            Justification::Center => -width / 2.0,
        };
        Rect::new(x0, -size, x0 + width, height - size)
    }
}

impl RenderNode for TextNode {
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect {
        if self.dirty || self.ctm != Some(ctm) {
            let bounds = ctm.transform_rect_bbox(self.local_bounds());
            ic.inval(self.bounds);
            ic.inval(bounds);
            self.bounds = bounds;
            self.ctm = Some(ctm);
            self.dirty = false;
        }
        self.bounds
    }

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext) {
        if !self.value.text.is_empty() {
            canvas.draw_text(&self.value, ctx.opacity);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/draw.rs"]
mod tests;
