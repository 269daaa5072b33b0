use kurbo::{CubicBez, ParamCurve, ParamCurveArclen};
use serde_json::Value;

use crate::{
    animation::{
        keyframe::{KeyframeRecord, Mapping},
        store::{KeyframeStore, PushError},
    },
    foundation::core::{Point, Vec2},
    json::FromJson,
};

const ARCLEN_ACCURACY: f64 = 1e-3;
const COLLINEAR_TOLERANCE: f64 = 1e-4;

/// Arc-length parametrized cubic between two spatial keyframes.
#[derive(Clone, Debug)]
pub(crate) struct SpatialPath {
    curve: CubicBez,
    length: f64,
}

impl SpatialPath {
    fn new(curve: CubicBez) -> Self {
        let length = curve.arclen(ARCLEN_ACCURACY);
        Self { curve, length }
    }

    #[cfg(test)]
    pub(crate) fn length(&self) -> f64 {
        self.length
    }

    /// Point at `fraction` of the path length.
    pub(crate) fn point_at(&self, fraction: f32) -> Point {
        let fraction = f64::from(fraction).clamp(0.0, 1.0);
        if self.length <= 0.0 {
            return self.curve.p0;
        }
        let u = self
            .curve
            .inv_arclen(fraction * self.length, ARCLEN_ACCURACY);
        self.curve.eval(u)
    }
}

/// A 2D keyframe value with its AE spatial tangents (`to` out of this point, `ti` into the
/// next one).
#[derive(Clone, Debug)]
pub(crate) struct SpatialValue {
    pub(crate) point: Point,
    pub(crate) to: Vec2,
    pub(crate) ti: Vec2,
    pub(crate) path: Option<SpatialPath>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SpatialStore {
    values: Vec<SpatialValue>,
}

impl SpatialStore {
    pub(crate) fn get(&self, i: u32) -> &SpatialValue {
        &self.values[i as usize]
    }
}

fn parse_tangent(v: &Value) -> Vec2 {
    Point::from_json(v).map(Point::to_vec2).unwrap_or(Vec2::ZERO)
}

impl KeyframeStore for SpatialStore {
    fn push(&mut self, jv: &Value, jkf: &Value) -> Result<u32, PushError> {
        let point = Point::from_json(jv).ok_or(PushError::Unparseable)?;
        self.values.push(SpatialValue {
            point,
            to: parse_tangent(&jkf["to"]),
            ti: parse_tangent(&jkf["ti"]),
            path: None,
        });
        Ok(u32::try_from(self.values.len() - 1).unwrap_or(u32::MAX))
    }

    fn same_value(&self, a: u32, b: u32) -> bool {
        self.get(a).point == self.get(b).point
    }

    fn finish(&mut self, records: &[KeyframeRecord]) {
        for rec in records {
            if rec.mapping == Mapping::Constant || rec.v0 == rec.v1 {
                continue;
            }
            let end = self.get(rec.v1).point;
            let start = &mut self.values[rec.v0 as usize];
            start.path = build_path(start.point, start.to, start.ti, end);
        }
    }
}

/// Curved motion only when a tangent is set, the endpoints differ, and the handles do not
/// lie on the straight segment.
fn build_path(p0: Point, to: Vec2, ti: Vec2, p1: Point) -> Option<SpatialPath> {
    if to == Vec2::ZERO && ti == Vec2::ZERO {
        return None;
    }
    if p0 == p1 {
        return None;
    }
    if handles_on_segment(p1 - p0, to, ti) {
        return None;
    }
    Some(SpatialPath::new(CubicBez::new(p0, p0 + to, p1 + ti, p1)))
}

fn handles_on_segment(seg: Vec2, to: Vec2, ti: Vec2) -> bool {
    let len2 = seg.hypot2();
    let on_segment = |h: Vec2, forward: bool| {
        if h == Vec2::ZERO {
            return true;
        }
        let collinear = (seg.cross(h)).abs() <= COLLINEAR_TOLERANCE * len2;
        let dot = seg.dot(h);
        let directed = if forward { dot >= 0.0 } else { dot <= 0.0 };
        collinear && directed && h.hypot2() <= len2
    };
    on_segment(to, true) && on_segment(ti, false)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spatial.rs"]
mod tests;
