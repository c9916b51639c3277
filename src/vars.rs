//! The generic variables container.

use serde_json::{Map, Value};

/// A mapping from variable key to value.
///
/// Both the content of a single loaded variable file and the resolved
/// variables environment the merger reads take this shape. Values are opaque
/// to this crate: whatever a file yields for a key (scalar, list, mapping) is
/// carried as-is and only ever appended, never introspected or merged.
pub type Vars = Map<String, Value>;

/// Human-readable name for a value's shape, for error messages.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
