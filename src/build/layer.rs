use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    animation::animator::{Animator, AnimatorScope, seek_all},
    build::{
        composition::{BuildContext, CompRange},
        transform::OpacityAdapter,
    },
    foundation::core::{Color, Point, Size},
    json,
    scene::{
        canvas::PaintStyle,
        draw::{Draw, Geometry, GeometryKind, Paint},
        node::{Group, MatrixRef, NodeRef, OpacityEffect, TransformEffect},
    },
};

/// Shows a layer within `[in_point, out_point)` and ticks its animators only while shown.
pub(crate) struct LayerController {
    animators: AnimatorScope,
    group: Rc<RefCell<Group>>,
    in_point: f32,
    out_point: f32,
}

impl LayerController {
    pub(crate) fn new(
        animators: AnimatorScope,
        group: Rc<RefCell<Group>>,
        in_point: f32,
        out_point: f32,
    ) -> Self {
        Self {
            animators,
            group,
            in_point,
            out_point,
        }
    }

    pub(crate) fn is_active(&self, t: f32) -> bool {
        self.in_point <= t && t < self.out_point
    }
}

impl Animator for LayerController {
    fn seek(&mut self, t: f32) -> bool {
        let active = self.is_active(t);
        let mut changed = {
            let mut group = self.group.borrow_mut();
            let was_visible = group.is_visible();
            group.set_visible(active);
            was_visible != active
        };
        if active {
            changed |= seek_all(&mut self.animators, t);
        }
        changed
    }
}

impl<'a> BuildContext<'a> {
    pub(crate) fn attach_layer(
        &mut self,
        jlayer: &'a Value,
        matrix: MatrixRef,
        scope: &mut AnimatorScope,
        range: CompRange,
    ) -> Option<NodeRef> {
        if json::parse_or::<bool>(&jlayer["hd"], false) {
            return None;
        }

        let mut layer_scope = AnimatorScope::new();
        let content = match json::parse::<i32>(&jlayer["ty"]) {
            Some(0) => self.attach_precomp_layer(jlayer, &mut layer_scope),
            Some(1) => self.attach_solid_layer(jlayer),
            Some(2) => {
                self.binder
                    .warn("Image layers are not supported.", Some(&jlayer["nm"]));
                None
            }
            // Null layers only contribute their transform to children.
            Some(3) => None,
            Some(4) => self.attach_shape_layer(jlayer, &mut layer_scope),
            Some(5) => self.attach_text_layer(jlayer, &mut layer_scope),
            _ => {
                self.binder
                    .warn("Unsupported layer type.", Some(&jlayer["ty"]));
                None
            }
        }?;

        let transformed: NodeRef = Rc::new(RefCell::new(TransformEffect::new(matrix, content)));
        let opacity = Rc::new(RefCell::new(OpacityEffect::new(transformed)));
        OpacityAdapter::bind(&self.binder, &jlayer["ks"]["o"], Rc::clone(&opacity))
            .attach_discardable(&mut layer_scope);

        let group = Rc::new(RefCell::new(Group::new(vec![opacity as NodeRef])));
        let in_point = json::parse_or(&jlayer["ip"], range.in_point);
        let out_point = json::parse_or(&jlayer["op"], range.out_point);
        self.counters.layers += 1;

        let always_visible = in_point <= range.in_point && out_point >= range.out_point;
        if !layer_scope.is_empty() || !always_visible {
            scope.push(Box::new(LayerController::new(
                layer_scope,
                Rc::clone(&group),
                in_point,
                out_point,
            )));
        }
        Some(group as NodeRef)
    }

    fn attach_solid_layer(&mut self, jlayer: &Value) -> Option<NodeRef> {
        let width = json::parse_or::<f32>(&jlayer["sw"], 0.0);
        let height = json::parse_or::<f32>(&jlayer["sh"], 0.0);
        let color = json::parse::<String>(&jlayer["sc"])
            .and_then(|hex| Color::from_hex(&hex))
            .unwrap_or(Color::BLACK);
        if width <= 0.0 || height <= 0.0 {
            self.binder.warn("Ignoring empty solid layer.", None);
            return None;
        }

        let size = Size::new(f64::from(width), f64::from(height));
        let geometry = Geometry::new_ref(GeometryKind::Rect {
            center: Point::new(size.width / 2.0, size.height / 2.0),
            size,
            radius: 0.0,
        });
        let paint = Paint::new_ref(PaintStyle::Fill { color });
        let draw: NodeRef = Rc::new(RefCell::new(Draw::new(geometry, paint)));
        Some(draw)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/layer.rs"]
mod tests;
