use std::{cell::RefCell, rc::Rc};

use crate::{
    foundation::core::{Affine, Rect},
    scene::canvas::{Canvas, RenderContext},
};

/// A node of the render tree.
pub trait RenderNode {
    /// Refresh cached bounds under `ctm`, reporting changed areas to `ic`.
    ///
    /// Returns the node's device-space bounds.
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect;

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext);
}

pub(crate) type NodeRef = Rc<RefCell<dyn RenderNode>>;

pub(crate) fn union_bounds(acc: Option<Rect>, r: Rect) -> Option<Rect> {
    if r.is_zero_area() {
        return acc;
    }
    Some(acc.map_or(r, |a| a.union(r)))
}

/// Accumulates the damage of one revalidation pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct InvalidationController {
    damage: Option<Rect>,
}

impl InvalidationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inval(&mut self, r: Rect) {
        self.damage = union_bounds(self.damage, r);
    }

    /// Union of all invalidated areas, `Rect::ZERO` when nothing changed.
    pub fn bounds(&self) -> Rect {
        self.damage.unwrap_or(Rect::ZERO)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.damage.is_none()
    }
}

/// Ordered children, drawn first to last. Hidden groups are skipped entirely.
pub(crate) struct Group {
    children: Vec<NodeRef>,
    visible: bool,
    visibility_dirty: bool,
    bounds: Rect,
}

impl Group {
    pub(crate) fn new(children: Vec<NodeRef>) -> Self {
        Self {
            children,
            visible: true,
            visibility_dirty: false,
            bounds: Rect::ZERO,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.visibility_dirty = true;
        }
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }
}

impl RenderNode for Group {
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect {
        if !self.visible {
            if self.visibility_dirty {
                ic.inval(self.bounds);
                self.visibility_dirty = false;
            }
            return Rect::ZERO;
        }

        let mut bounds = None;
        for child in &self.children {
            bounds = union_bounds(bounds, child.borrow_mut().revalidate(ic, ctm));
        }
        self.bounds = bounds.unwrap_or(Rect::ZERO);

        if self.visibility_dirty {
            ic.inval(self.bounds);
            self.visibility_dirty = false;
        }
        self.bounds
    }

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext) {
        if !self.visible {
            return;
        }
        for child in &self.children {
            child.borrow().render(canvas, ctx);
        }
    }
}

/// A local transform, optionally chained to a parent layer's matrix.
#[derive(Debug, Default)]
pub(crate) struct Matrix {
    local: Affine,
    parent: Option<MatrixRef>,
}

pub(crate) type MatrixRef = Rc<RefCell<Matrix>>;

impl Matrix {
    pub(crate) fn new_ref() -> MatrixRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub(crate) fn set_local(&mut self, local: Affine) {
        self.local = local;
    }

    pub(crate) fn set_parent(&mut self, parent: MatrixRef) {
        self.parent = Some(parent);
    }

    /// `parent.total() * local`.
    pub(crate) fn total(&self) -> Affine {
        match &self.parent {
            Some(parent) => parent.borrow().total() * self.local,
            None => self.local,
        }
    }
}

pub(crate) struct TransformEffect {
    matrix: MatrixRef,
    child: NodeRef,
}

impl TransformEffect {
    pub(crate) fn new(matrix: MatrixRef, child: NodeRef) -> Self {
        Self { matrix, child }
    }
}

impl RenderNode for TransformEffect {
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect {
        let total = self.matrix.borrow().total();
        self.child.borrow_mut().revalidate(ic, ctm * total)
    }

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext) {
        canvas.save();
        canvas.concat(self.matrix.borrow().total());
        self.child.borrow().render(canvas, ctx);
        canvas.restore();
    }
}

/// Group opacity in `[0, 1]`. A change damages the child's previous and current bounds.
pub(crate) struct OpacityEffect {
    opacity: f32,
    dirty: bool,
    child: NodeRef,
    bounds: Rect,
}

impl OpacityEffect {
    pub(crate) fn new(child: NodeRef) -> Self {
        Self {
            opacity: 1.0,
            dirty: false,
            child,
            bounds: Rect::ZERO,
        }
    }

    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.opacity != opacity {
            self.opacity = opacity;
            self.dirty = true;
        }
    }

    #[cfg(test)]
    pub(crate) fn opacity(&self) -> f32 {
        self.opacity
    }
}

impl RenderNode for OpacityEffect {
    fn revalidate(&mut self, ic: &mut InvalidationController, ctm: Affine) -> Rect {
        let bounds = self.child.borrow_mut().revalidate(ic, ctm);
        if self.dirty {
            ic.inval(self.bounds);
            ic.inval(bounds);
            self.dirty = false;
        }
        self.bounds = bounds;
        bounds
    }

    fn render(&self, canvas: &mut dyn Canvas, ctx: &RenderContext) {
        if self.opacity <= 0.0 {
            return;
        }
        self.child
            .borrow()
            .render(canvas, &ctx.with_opacity(self.opacity));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
