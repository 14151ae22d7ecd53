//! Declarative slice configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options of one slice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliceOptions {
    /// Reject `set`-style writes that change a property's initial type.
    pub strict_typing: bool,
}

/// A slice described as data.
///
/// ```json
/// {
///   "name": "counter",
///   "initial": {"value": 0},
///   "actions": {"value": ["inc", "dec", "reset"]},
///   "options": {"strictTyping": true}
/// }
/// ```
///
/// Each action maps to a kind or a list of kinds. Selectors and middlewares
/// are code and are attached to the built slice.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceDefinition {
    pub name: String,
    pub initial: Value,
    #[serde(default)]
    pub actions: IndexMap<String, Value>,
    #[serde(default)]
    pub options: SliceOptions,
}
