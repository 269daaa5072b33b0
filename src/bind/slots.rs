use std::collections::HashMap;

use serde_json::{Value, json};

use crate::foundation::core::Color;

/// Caller-side property overrides keyed by slot id (`"sid"` in the document).
///
/// Overrides take precedence over the document's own `slots` table.
#[derive(Clone, Debug, Default)]
pub struct SlotManager {
    overrides: HashMap<String, Value>,
}

impl SlotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace slot `id` with a full property node (`{"a": .., "k": ..}`).
    pub fn set_property(&mut self, id: impl Into<String>, property: Value) {
        self.overrides.insert(id.into(), property);
    }

    pub fn set_scalar(&mut self, id: impl Into<String>, value: f32) {
        self.set_property(id, json!({ "a": 0, "k": value }));
    }

    pub fn set_color(&mut self, id: impl Into<String>, color: Color) {
        self.set_property(id, json!({ "a": 0, "k": [color.r, color.g, color.b, color.a] }));
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.overrides.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.overrides.get(id)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
