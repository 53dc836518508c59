use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const BODY: &str = "body";
pub const HEADER: &str = "header";

/// Field-level noise, keyed by scope (`body` or `header`) and then by field name.
///
/// Every field maps to the tolerance patterns its values may match. An empty
/// list means the field is ignored whatever its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseMap(HashMap<String, HashMap<String, Vec<String>>>);

impl NoiseMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builds a map from `scope.field` keys, the shape test cases store their own noise in.
    /// A bare `body` key covers the whole body (the empty field). Keys without
    /// a scope prefix are treated as body fields.
    pub fn from_flat<'a, I: IntoIterator<Item = (&'a String, &'a Vec<String>)>>(
        entries: I,
    ) -> Self {
        let mut noise = Self::new();

        for (key, patterns) in entries {
            match key.split_once('.') {
                Some((scope, field)) if scope == BODY || scope == HEADER => {
                    noise.insert(scope, field, patterns.clone())
                }
                _ if key == BODY => noise.insert(BODY, "", patterns.clone()),
                _ => noise.insert(BODY, key.as_str(), patterns.clone()),
            }
        }

        noise
    }

    pub fn insert<S: Into<String>, F: Into<String>>(
        &mut self,
        scope: S,
        field: F,
        patterns: Vec<String>,
    ) {
        self.0
            .entry(scope.into())
            .or_default()
            .insert(field.into(), patterns);
    }

    pub fn scope(&self, scope: &str) -> Option<&HashMap<String, Vec<String>>> {
        self.0.get(scope)
    }

    pub fn body(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.scope(BODY)
    }

    pub fn header(&self) -> Option<&HashMap<String, Vec<String>>> {
        self.scope(HEADER)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(HashMap::is_empty)
    }

    /// Overrides this map with `overrides`, field by field, in the `body` and `header` scopes.
    ///
    /// The result is a fresh map; neither input is touched. A field that
    /// `overrides` sets to an empty list becomes fully ignored in the result.
    pub fn merge(&self, overrides: &NoiseMap) -> NoiseMap {
        let mut merged = self.clone();

        for scope in &[BODY, HEADER] {
            if let Some(fields) = overrides.scope(scope) {
                for (field, patterns) in fields {
                    merged.insert(*scope, field.as_str(), patterns.clone());
                }
            }
        }

        merged
    }
}

impl From<HashMap<String, HashMap<String, Vec<String>>>> for NoiseMap {
    fn from(map: HashMap<String, HashMap<String, Vec<String>>>) -> Self {
        Self(map)
    }
}
