//! The structured action recovered from model output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool arguments: parameter name → arbitrary JSON value.
pub type Arguments = serde_json::Map<String, Value>;

/// A tool invocation requested by the model.
///
/// Wire format: `{"name": "...", "arguments": {...}}`. A missing `arguments`
/// field decodes as an empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Tool identifier
    pub name: String,

    /// Named arguments, order irrelevant
    #[serde(default)]
    pub arguments: Arguments,
}

impl Action {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Look up a single argument.
    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}
