use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    animation::{
        animator::{AnimatorScope, Slot},
        container::{Adapter, PropertyContainer},
    },
    bind::binder::PropertyBinder,
    foundation::core::{Affine, Point, Vec2},
    json,
    scene::node::{MatrixRef, OpacityEffect},
};

enum Position {
    Combined(Slot<Point>),
    /// `"p": {"s": true, "x": .., "y": ..}`
    Split { x: Slot<f32>, y: Slot<f32> },
}

/// Transform properties (`ks` of a layer, `tr` of a shape group) feeding a matrix node.
pub(crate) struct TransformAdapter {
    anchor: Slot<Point>,
    position: Position,
    scale: Slot<Vec<f32>>,
    rotation: Slot<f32>,
    skew: Slot<f32>,
    skew_axis: Slot<f32>,
    matrix: MatrixRef,
}

impl TransformAdapter {
    pub(crate) fn bind(
        binder: &PropertyBinder<'_>,
        jtransform: &Value,
        matrix: MatrixRef,
    ) -> PropertyContainer<Self> {
        let mut scope = AnimatorScope::new();

        let anchor = Slot::new(Point::ZERO);
        binder.bind(&jtransform["a"], &mut scope, &anchor);

        let jpos = &jtransform["p"];
        let position = if json::parse_or::<bool>(&jpos["s"], false) {
            let (x, y) = (Slot::new(0.0), Slot::new(0.0));
            binder.bind(&jpos["x"], &mut scope, &x);
            binder.bind(&jpos["y"], &mut scope, &y);
            Position::Split { x, y }
        } else {
            let p = Slot::new(Point::ZERO);
            binder.bind(jpos, &mut scope, &p);
            Position::Combined(p)
        };

        let scale = Slot::new(vec![100.0, 100.0]);
        binder.bind(&jtransform["s"], &mut scope, &scale);

        // 3D layers carry "rz" instead of "r".
        let rotation = Slot::new(0.0);
        if !binder.bind(&jtransform["r"], &mut scope, &rotation) {
            binder.bind(&jtransform["rz"], &mut scope, &rotation);
        }

        let skew = Slot::new(0.0);
        let skew_axis = Slot::new(0.0);
        binder.bind(&jtransform["sk"], &mut scope, &skew);
        binder.bind(&jtransform["sa"], &mut scope, &skew_axis);

        PropertyContainer::new(
            scope,
            Self {
                anchor,
                position,
                scale,
                rotation,
                skew,
                skew_axis,
                matrix,
            },
        )
    }

    /// `T(p) * R(r) * Skew(sk, sa) * S(s / 100) * T(-a)`
    pub(crate) fn affine(&self) -> Affine {
        let position = match &self.position {
            Position::Combined(p) => p.get().to_vec2(),
            Position::Split { x, y } => Vec2::new(f64::from(x.get()), f64::from(y.get())),
        };
        let scale = self.scale.borrow();
        let sx = scale.first().copied().unwrap_or(100.0);
        let sy = scale.get(1).copied().unwrap_or(sx);

        let mut m = Affine::translate(position)
            * Affine::rotate(f64::from(self.rotation.get()).to_radians());
        let skew = f64::from(self.skew.get());
        if skew != 0.0 {
            let axis = f64::from(self.skew_axis.get()).to_radians();
            m = m
                * Affine::rotate(axis)
                * Affine::skew((-skew.to_radians()).tan(), 0.0)
                * Affine::rotate(-axis);
        }
        m * Affine::scale_non_uniform(f64::from(sx) / 100.0, f64::from(sy) / 100.0)
            * Affine::translate(-self.anchor.get().to_vec2())
    }
}

impl Adapter for TransformAdapter {
    fn on_sync(&mut self) {
        let affine = self.affine();
        self.matrix.borrow_mut().set_local(affine);
    }
}

/// Percent opacity (`o`, 0..100) feeding an opacity node.
pub(crate) struct OpacityAdapter {
    opacity: Slot<f32>,
    node: Rc<RefCell<OpacityEffect>>,
}

impl OpacityAdapter {
    pub(crate) fn bind(
        binder: &PropertyBinder<'_>,
        jopacity: &Value,
        node: Rc<RefCell<OpacityEffect>>,
    ) -> PropertyContainer<Self> {
        let mut scope = AnimatorScope::new();
        let opacity = Slot::new(100.0);
        binder.bind(jopacity, &mut scope, &opacity);
        PropertyContainer::new(scope, Self { opacity, node })
    }
}

impl Adapter for OpacityAdapter {
    fn on_sync(&mut self) {
        self.node
            .borrow_mut()
            .set_opacity(self.opacity.get() * 0.01);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/transform.rs"]
mod tests;
