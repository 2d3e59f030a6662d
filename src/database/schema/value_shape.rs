use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse classification of what a column stores, used to pick the SQL
/// pattern for member paths and filters.
///
/// The shape is declared on the column when metadata is built and is never
/// re-derived while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueShape {
    /// Plain scalar column (text, numbers, booleans, dates...)
    #[default]
    Scalar,
    /// A `json`/`jsonb` column holding an object
    JsonObject,
    /// A `jsonb[]` column holding an array of objects
    JsonArray,
}

impl ValueShape {
    /// Classify a sample JSON value.
    ///
    /// Objects map to `JsonObject`; arrays map to `JsonArray` when every
    /// element is an object (an empty array counts as one), otherwise the
    /// array is stored whole and treated as a `JsonObject` document.
    pub fn of_value(v: &Value) -> ValueShape {
        match v {
            Value::Object(_) => ValueShape::JsonObject,
            Value::Array(items) => {
                if items.iter().all(Value::is_object) {
                    ValueShape::JsonArray
                } else {
                    ValueShape::JsonObject
                }
            }
            _ => ValueShape::Scalar,
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, ValueShape::Scalar)
    }

    /// Merge the shape seen in a new sample with the one already recorded.
    /// Null samples do not carry shape information, so the left side wins
    /// unless it is `Scalar`.
    pub fn promote(a: ValueShape, b: ValueShape) -> ValueShape {
        use ValueShape::*;
        match (a, b) {
            (x, y) if x == y => x,
            (Scalar, y) => y,
            (x, _) => x,
        }
    }
}
