//! Typed, non-panicking coercions over a `serde_json::Value` document.
//!
//! Member lookup uses `serde_json`'s indexing, which already yields `Value::Null` for absent
//! keys and out-of-range indices. Coercions return `None` on type mismatch.

use serde_json::Value;

use crate::foundation::core::Point;

/// Coerce a JSON value into a typed Rust value.
pub(crate) trait FromJson: Sized {
    fn from_json(v: &Value) -> Option<Self>;
}

/// Some exporters wrap scalars in single-element arrays.
pub(crate) fn unwrap_single(v: &Value) -> &Value {
    match v {
        Value::Array(items) if items.len() == 1 => &items[0],
        _ => v,
    }
}

pub(crate) fn parse<T: FromJson>(v: &Value) -> Option<T> {
    T::from_json(v)
}

pub(crate) fn parse_or<T: FromJson>(v: &Value, default: T) -> T {
    T::from_json(v).unwrap_or(default)
}

impl FromJson for f32 {
    fn from_json(v: &Value) -> Option<Self> {
        unwrap_single(v).as_f64().map(|n| n as f32)
    }
}

impl FromJson for i32 {
    fn from_json(v: &Value) -> Option<Self> {
        let v = unwrap_single(v);
        if let Some(n) = v.as_i64() {
            return i32::try_from(n).ok();
        }
        // Some exporters emit integral fields as floats ("ty": 4.0).
        v.as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX))
            .map(|n| n as i32)
    }
}

impl FromJson for bool {
    fn from_json(v: &Value) -> Option<Self> {
        match unwrap_single(v) {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        }
    }
}

impl FromJson for String {
    fn from_json(v: &Value) -> Option<Self> {
        unwrap_single(v).as_str().map(str::to_owned)
    }
}

impl FromJson for Vec<f32> {
    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64().map(|n| n as f32))
                .collect(),
            Value::Number(n) => n.as_f64().map(|n| vec![n as f32]),
            _ => None,
        }
    }
}

impl FromJson for Point {
    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Array(items) if items.len() >= 2 => {
                Some(Point::new(items[0].as_f64()?, items[1].as_f64()?))
            }
            // Easing handles may be per-dimension arrays: {"x": [..], "y": [..]}.
            Value::Object(_) => {
                let first = |c: &Value| match c {
                    Value::Array(items) => items.first().and_then(Value::as_f64),
                    other => other.as_f64(),
                };
                Some(Point::new(first(&v["x"])?, first(&v["y"])?))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/json/mod.rs"]
mod tests;
