// Field values, type tags and the objects validation reads from

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Runtime type tag of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl FieldType {
    /// The tag of a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Boolean,
            Value::Number(_) => FieldType::Number,
            Value::String(_) => FieldType::String,
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Object,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Null => "Null",
            FieldType::Boolean => "Boolean",
            FieldType::Number => "Number",
            FieldType::String => "String",
            FieldType::Array => "Array",
            FieldType::Object => "Object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flat object whose named fields can be validated.
///
/// A field is absent when `field` returns `None`. A field bound to JSON
/// `null` is present.
pub trait Surrogate {
    fn field(&self, name: &str) -> Option<&Value>;
}

impl Surrogate for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<S: BuildHasher> Surrogate for HashMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Surrogate for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Objects expose their keys; any other JSON value has no fields.
impl Surrogate for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_tags() {
        assert_eq!(FieldType::of(&json!(0)), FieldType::Number);
        assert_eq!(FieldType::of(&json!("0")), FieldType::String);
        assert_eq!(FieldType::of(&json!([])), FieldType::Array);
        assert_eq!(FieldType::of(&json!({})), FieldType::Object);
        assert_eq!(FieldType::of(&json!(false)), FieldType::Boolean);
        assert_eq!(FieldType::of(&Value::Null), FieldType::Null);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(FieldType::Number.to_string(), "Number");
        assert_eq!(FieldType::Array.name(), "Array");
    }

    #[test]
    fn test_surrogates() {
        let object = json!({"a": 1, "n": null});
        assert_eq!(object.field("a"), Some(&json!(1)));
        assert_eq!(object.field("n"), Some(&Value::Null));
        assert_eq!(object.field("missing"), None);
        assert_eq!(json!([1, 2]).field("0"), None);

        let mut map = HashMap::new();
        map.insert("a".to_string(), json!("x"));
        assert_eq!(map.field("a"), Some(&json!("x")));

        let tree: BTreeMap<String, Value> = BTreeMap::new();
        assert_eq!(tree.field("a"), None);
    }
}
