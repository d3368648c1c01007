//! Scenario overrides: a caller-supplied map from attribute id to a
//! replacement value for a single run, applied to Input attributes only.

use std::collections::HashMap;

/// Mutable between runs; does not persist across an explicit
/// [`ScenarioStore::clear`].
#[derive(Debug, Default, Clone)]
pub struct ScenarioStore {
    overrides: HashMap<String, f64>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attribute_id: impl Into<String>, value: f64) {
        self.overrides.insert(attribute_id.into(), value);
    }

    pub fn clear(&mut self) {
        self.overrides.clear();
    }

    pub fn get(&self, attribute_id: &str) -> Option<f64> {
        self.overrides.get(attribute_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.overrides.iter()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
