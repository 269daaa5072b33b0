use serde_json::Value;

use crate::{
    animation::{keyframe::KeyframeRecord, value::TextValue},
    foundation::error::LottieError,
    json::FromJson,
};

pub(crate) enum PushError {
    /// The JSON could not be read as this store's value type; the keyframe has no value.
    Unparseable,
    /// The value is well-formed but incompatible with earlier ones; binding fails.
    Incompatible(LottieError),
}

/// Typed storage for the values referenced by keyframe records.
pub(crate) trait KeyframeStore {
    /// Parse `jv` and append it, returning its index.
    ///
    /// `jkf` is the keyframe entry owning the value (`Value::Null` for end values), for stores
    /// that read per-keyframe metadata.
    fn push(&mut self, jv: &Value, jkf: &Value) -> Result<u32, PushError>;

    fn same_value(&self, a: u32, b: u32) -> bool;

    /// Discrete stores never interpolate; every record is a hold.
    fn is_discrete(&self) -> bool {
        false
    }

    /// Called once with the final records.
    fn finish(&mut self, _records: &[KeyframeRecord]) {}
}

fn index_of(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ScalarStore {
    values: Vec<f32>,
}

impl ScalarStore {
    pub(crate) fn get(&self, i: u32) -> f32 {
        self.values[i as usize]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

impl KeyframeStore for ScalarStore {
    fn push(&mut self, jv: &Value, _jkf: &Value) -> Result<u32, PushError> {
        let v = f32::from_json(jv).ok_or(PushError::Unparseable)?;
        if self.values.last() != Some(&v) {
            self.values.push(v);
        }
        Ok(index_of(self.values.len() - 1))
    }

    fn same_value(&self, a: u32, b: u32) -> bool {
        self.get(a) == self.get(b)
    }
}

/// Flat storage for fixed-length float vectors.
///
/// The length is taken from the first value; later values of a different length are
/// rejected.
#[derive(Clone, Debug)]
pub(crate) struct VectorStore {
    dim: Option<usize>,
    data: Vec<f32>,
    parser: fn(&Value) -> Option<Vec<f32>>,
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::with_parser(<Vec<f32> as FromJson>::from_json)
    }
}

impl VectorStore {
    /// A store reading values through a custom encoding (e.g. shape paths).
    pub(crate) fn with_parser(parser: fn(&Value) -> Option<Vec<f32>>) -> Self {
        Self {
            dim: None,
            data: Vec::new(),
            parser,
        }
    }

    pub(crate) fn dim(&self) -> usize {
        self.dim.unwrap_or(0)
    }

    pub(crate) fn get(&self, i: u32) -> &[f32] {
        let dim = self.dim();
        let start = i as usize * dim;
        &self.data[start..start + dim]
    }

    pub(crate) fn len(&self) -> usize {
        match self.dim() {
            0 => 0,
            dim => self.data.len() / dim,
        }
    }
}

impl KeyframeStore for VectorStore {
    fn push(&mut self, jv: &Value, _jkf: &Value) -> Result<u32, PushError> {
        let v = (self.parser)(jv).ok_or(PushError::Unparseable)?;
        let dim = *self.dim.get_or_insert(v.len());
        if v.len() != dim {
            return Err(PushError::Incompatible(LottieError::bind(format!(
                "Mismatched keyframe vector length: expected {dim}, found {}.",
                v.len()
            ))));
        }
        if dim == 0 {
            return Err(PushError::Incompatible(LottieError::bind(
                "Empty keyframe vector.",
            )));
        }
        let count = self.len();
        if count == 0 || self.get(index_of(count - 1)) != v.as_slice() {
            self.data.extend_from_slice(&v);
        }
        Ok(index_of(self.len() - 1))
    }

    fn same_value(&self, a: u32, b: u32) -> bool {
        self.get(a) == self.get(b)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TextStore {
    values: Vec<TextValue>,
}

impl TextStore {
    pub(crate) fn get(&self, i: u32) -> &TextValue {
        &self.values[i as usize]
    }
}

impl KeyframeStore for TextStore {
    fn push(&mut self, jv: &Value, _jkf: &Value) -> Result<u32, PushError> {
        let v = TextValue::from_json(jv).ok_or(PushError::Unparseable)?;
        if self.values.last() != Some(&v) {
            self.values.push(v);
        }
        Ok(index_of(self.values.len() - 1))
    }

    fn same_value(&self, a: u32, b: u32) -> bool {
        self.get(a) == self.get(b)
    }

    fn is_discrete(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/store.rs"]
mod tests;
