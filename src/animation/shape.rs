//! Flat float encoding of Lottie shape paths, so they animate through the vector animator.
//!
//! Layout: `[closed, (vx, vy, ix, iy, ox, oy) * n]`, tangents relative to their vertex.

use serde_json::Value;

use crate::{
    foundation::core::{BezPath, Point},
    json::{self, FromJson},
};

const STRIDE: usize = 6;

pub(crate) fn parse_shape_vector(v: &Value) -> Option<Vec<f32>> {
    let v = json::unwrap_single(v);
    if !v.is_object() {
        return None;
    }
    let vertices = v["v"].as_array()?;
    let ins = v["i"].as_array();
    let outs = v["o"].as_array();
    let tangent = |list: Option<&Vec<Value>>, i: usize| {
        list.and_then(|l| l.get(i))
            .and_then(Point::from_json)
            .unwrap_or(Point::ZERO)
    };

    let closed = json::parse_or::<bool>(&v["c"], false);
    let mut out = Vec::with_capacity(1 + vertices.len() * STRIDE);
    out.push(if closed { 1.0 } else { 0.0 });
    for (i, jv) in vertices.iter().enumerate() {
        let p = Point::from_json(jv)?;
        let ti = tangent(ins, i);
        let to = tangent(outs, i);
        out.extend_from_slice(&[
            p.x as f32,
            p.y as f32,
            ti.x as f32,
            ti.y as f32,
            to.x as f32,
            to.y as f32,
        ]);
    }
    Some(out)
}

pub(crate) fn shape_to_path(v: &[f32]) -> BezPath {
    let mut path = BezPath::new();
    let Some((&closed, rest)) = v.split_first() else {
        return path;
    };
    let verts: Vec<(Point, Point, Point)> = rest
        .chunks_exact(STRIDE)
        .map(|c| {
            let p = Point::new(f64::from(c[0]), f64::from(c[1]));
            let ti = p + Point::new(f64::from(c[2]), f64::from(c[3])).to_vec2();
            let to = p + Point::new(f64::from(c[4]), f64::from(c[5])).to_vec2();
            (p, ti, to)
        })
        .collect();
    let Some(&(first, first_in, _)) = verts.first() else {
        return path;
    };

    path.move_to(first);
    for pair in verts.windows(2) {
        let (_, _, prev_out) = pair[0];
        let (p, p_in, _) = pair[1];
        path.curve_to(prev_out, p_in, p);
    }
    // Interpolated flags are blended floats.
    if closed >= 0.5 {
        if let Some(&(_, _, last_out)) = verts.last() {
            path.curve_to(last_out, first_in, first);
        }
        path.close_path();
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/animation/shape.rs"]
mod tests;
