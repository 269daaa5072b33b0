use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    animation::{
        animator::{AnimatorScope, Slot},
        container::{Adapter, PropertyContainer},
        shape::shape_to_path,
    },
    build::{
        composition::BuildContext,
        transform::{OpacityAdapter, TransformAdapter},
    },
    foundation::core::{Cap, Color, Join, Point, Size},
    json,
    scene::{
        canvas::PaintStyle,
        draw::{Draw, Geometry, GeometryKind, GeometryRef, GeometryView, Paint, PaintRef},
        node::{Group, Matrix, NodeRef, OpacityEffect, TransformEffect},
    },
};

fn size_of(v: &[f32]) -> Size {
    let w = v.first().copied().unwrap_or(0.0);
    let h = v.get(1).copied().unwrap_or(w);
    Size::new(f64::from(w), f64::from(h))
}

struct RectAdapter {
    position: Slot<Point>,
    size: Slot<Vec<f32>>,
    roundness: Slot<f32>,
    geometry: GeometryRef,
}

impl Adapter for RectAdapter {
    fn on_sync(&mut self) {
        self.geometry.borrow_mut().set(GeometryKind::Rect {
            center: self.position.get(),
            size: size_of(&self.size.borrow()),
            radius: f64::from(self.roundness.get()),
        });
    }
}

struct EllipseAdapter {
    position: Slot<Point>,
    size: Slot<Vec<f32>>,
    geometry: GeometryRef,
}

impl Adapter for EllipseAdapter {
    fn on_sync(&mut self) {
        self.geometry.borrow_mut().set(GeometryKind::Ellipse {
            center: self.position.get(),
            size: size_of(&self.size.borrow()),
        });
    }
}

struct PathAdapter {
    shape: Slot<Vec<f32>>,
    geometry: GeometryRef,
}

impl Adapter for PathAdapter {
    fn on_sync(&mut self) {
        let path = shape_to_path(&self.shape.borrow());
        self.geometry.borrow_mut().set(GeometryKind::Path(path));
    }
}

struct StrokeProps {
    width: Slot<f32>,
    join: Join,
    cap: Cap,
    miter_limit: f32,
}

impl StrokeProps {
    fn parse(item: &Value) -> Self {
        let join = match json::parse_or::<i32>(&item["lj"], 1) {
            1 => Join::Miter,
            2 => Join::Round,
            _ => Join::Bevel,
        };
        let cap = match json::parse_or::<i32>(&item["lc"], 1) {
            1 => Cap::Butt,
            2 => Cap::Round,
            _ => Cap::Square,
        };
        Self {
            width: Slot::new(1.0),
            join,
            cap,
            miter_limit: json::parse_or(&item["ml"], 4.0),
        }
    }
}

/// Fill (`fl`) or stroke (`st`) paint properties.
struct PaintAdapter {
    color: Slot<Vec<f32>>,
    opacity: Slot<f32>,
    /// `None` for fills.
    stroke: Option<StrokeProps>,
    paint: PaintRef,
}

impl Adapter for PaintAdapter {
    fn on_sync(&mut self) {
        let base = Color::from_components(&self.color.borrow());
        let color = base.with_alpha(base.a * (self.opacity.get() * 0.01).clamp(0.0, 1.0));
        let style = match &self.stroke {
            Some(stroke) => PaintStyle::Stroke {
                color,
                width: stroke.width.get().max(0.0),
                join: stroke.join,
                cap: stroke.cap,
                miter_limit: stroke.miter_limit,
            },
            None => PaintStyle::Fill { color },
        };
        self.paint.borrow_mut().set(style);
    }
}

/// An attached shape group.
struct ShapeGroup {
    /// The group's own draws, `None` when it paints nothing.
    node: Option<NodeRef>,
    /// Geometries declared in the group, lifted into the parent's coordinates so that
    /// paints listed after the group apply to them too.
    geometries: Vec<GeometryView>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn attach_shape_layer(
        &mut self,
        jlayer: &'a Value,
        scope: &mut AnimatorScope,
    ) -> Option<NodeRef> {
        let items = jlayer["shapes"].as_array()?;
        self.attach_shape_group(items, scope).node
    }

    /// Paints apply to the geometries listed before them, including those of earlier nested
    /// groups; items listed first are drawn on top.
    fn attach_shape_group(&mut self, items: &'a [Value], scope: &mut AnimatorScope) -> ShapeGroup {
        let mut geometries: Vec<GeometryView> = Vec::new();
        let mut draws: Vec<NodeRef> = Vec::new();
        let mut jtransform = None;

        for item in items {
            if json::parse_or::<bool>(&item["hd"], false) {
                continue;
            }
            match item["ty"].as_str() {
                Some(ty @ ("rc" | "el" | "sh")) => {
                    geometries.push(self.attach_geometry(ty, item, scope).into());
                }
                Some(ty @ ("fl" | "st")) => {
                    let paint = self.attach_paint(ty == "st", item, scope);
                    for geometry in &geometries {
                        draws.push(Rc::new(RefCell::new(Draw::new(
                            geometry.clone(),
                            Rc::clone(&paint),
                        ))));
                    }
                }
                Some("gr") => {
                    let children = item["it"].as_array().map(Vec::as_slice).unwrap_or_default();
                    let group = self.attach_shape_group(children, scope);
                    draws.extend(group.node);
                    geometries.extend(group.geometries);
                }
                Some("tr") => jtransform = Some(item),
                _ => self
                    .binder
                    .warn("Unsupported shape type.", Some(&item["ty"])),
            }
        }

        if draws.is_empty() && geometries.is_empty() {
            return ShapeGroup {
                node: None,
                geometries,
            };
        }

        let matrix = jtransform.map(|jtransform| {
            let matrix = Matrix::new_ref();
            TransformAdapter::bind(&self.binder, jtransform, Rc::clone(&matrix))
                .attach_discardable(scope);
            matrix
        });
        if let Some(matrix) = &matrix {
            geometries = geometries
                .into_iter()
                .map(|geometry| geometry.transformed(Rc::clone(matrix)))
                .collect();
        }

        if draws.is_empty() {
            return ShapeGroup {
                node: None,
                geometries,
            };
        }
        draws.reverse();
        let group: NodeRef = Rc::new(RefCell::new(Group::new(draws)));
        let node = match (matrix, jtransform) {
            (Some(matrix), Some(jtransform)) => {
                let transformed: NodeRef =
                    Rc::new(RefCell::new(TransformEffect::new(matrix, group)));
                let opacity = Rc::new(RefCell::new(OpacityEffect::new(transformed)));
                OpacityAdapter::bind(&self.binder, &jtransform["o"], Rc::clone(&opacity))
                    .attach_discardable(scope);
                opacity as NodeRef
            }
            _ => group,
        };
        ShapeGroup {
            node: Some(node),
            geometries,
        }
    }

    fn attach_geometry(&self, ty: &str, item: &Value, scope: &mut AnimatorScope) -> GeometryRef {
        let binder = &self.binder;
        let mut local = AnimatorScope::new();
        let geometry = Geometry::new_ref(GeometryKind::Path(Default::default()));

        match ty {
            "rc" => {
                let adapter = RectAdapter {
                    position: Slot::new(Point::ZERO),
                    size: Slot::new(vec![0.0, 0.0]),
                    roundness: Slot::new(0.0),
                    geometry: Rc::clone(&geometry),
                };
                binder.bind(&item["p"], &mut local, &adapter.position);
                binder.bind(&item["s"], &mut local, &adapter.size);
                binder.bind(&item["r"], &mut local, &adapter.roundness);
                PropertyContainer::new(local, adapter).attach_discardable(scope);
            }
            "el" => {
                let adapter = EllipseAdapter {
                    position: Slot::new(Point::ZERO),
                    size: Slot::new(vec![0.0, 0.0]),
                    geometry: Rc::clone(&geometry),
                };
                binder.bind(&item["p"], &mut local, &adapter.position);
                binder.bind(&item["s"], &mut local, &adapter.size);
                PropertyContainer::new(local, adapter).attach_discardable(scope);
            }
            _ => {
                let adapter = PathAdapter {
                    shape: Slot::new(Vec::new()),
                    geometry: Rc::clone(&geometry),
                };
                binder.bind_shape(&item["ks"], &mut local, &adapter.shape);
                PropertyContainer::new(local, adapter).attach_discardable(scope);
            }
        }
        geometry
    }

    fn attach_paint(&self, stroke: bool, item: &Value, scope: &mut AnimatorScope) -> PaintRef {
        let binder = &self.binder;
        let mut local = AnimatorScope::new();
        let paint = Paint::new_ref(PaintStyle::Fill {
            color: Color::BLACK,
        });

        let adapter = PaintAdapter {
            color: Slot::new(vec![0.0, 0.0, 0.0, 1.0]),
            opacity: Slot::new(100.0),
            stroke: stroke.then(|| StrokeProps::parse(item)),
            paint: Rc::clone(&paint),
        };
        binder.bind(&item["c"], &mut local, &adapter.color);
        binder.bind(&item["o"], &mut local, &adapter.opacity);
        if let Some(stroke) = &adapter.stroke {
            binder.bind(&item["w"], &mut local, &stroke.width);
        }
        PropertyContainer::new(local, adapter).attach_discardable(scope);
        paint
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/shape.rs"]
mod tests;
