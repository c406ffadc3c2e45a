// Rule evaluators
//
// One pure function per rule. None of them know about messages or error
// construction; the engine turns their answers into errors.

use crate::{FieldType, OmittedSpec, Predicate, Verdict};
use serde_json::Value;

/// Passes when the value is present or the field is optional.
pub fn required(value: Option<&Value>, required: bool) -> bool {
    value.is_some() || !required
}

/// Absent values always pass. A present value fails a `true` flag, passes a
/// `false` flag, and is otherwise judged by the predicate.
pub fn omitted(value: Option<&Value>, spec: &OmittedSpec) -> Verdict {
    let Some(value) = value else {
        return Verdict::Bool(true);
    };

    match spec {
        OmittedSpec::Flag(flag) => Verdict::Bool(!flag),
        OmittedSpec::Predicate(predicate) => predicate.call(value),
    }
}

/// Passes when the value is absent or carries the expected tag. No coercion.
pub fn type_of(value: Option<&Value>, expected: FieldType) -> bool {
    value.is_none_or(|v| FieldType::of(v) == expected)
}

/// Scalar used by `min`/`max`.
///
/// Numbers and numeric text compare by value; other text by its length in
/// characters; arrays by their length. Anything else has no comparable
/// scalar.
pub fn comparable(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => Some(s.chars().count() as f64),
        },
        Value::Array(items) => Some(items.len() as f64),
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}

/// Fails closed on values without a comparable scalar.
pub fn min(value: &Value, bound: f64) -> bool {
    comparable(value).is_some_and(|n| n >= bound)
}

/// Fails closed on values without a comparable scalar.
pub fn max(value: &Value, bound: f64) -> bool {
    comparable(value).is_some_and(|n| n <= bound)
}

/// An element flagged by `each`.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHit {
    /// Array index or object key of the element
    pub key: String,
    pub verdict: Verdict,
}

/// Returns the first element whose verdict is truthy.
///
/// Arrays are walked by index and objects in insertion order; a scalar is
/// a single element with key `"0"`.
pub fn each(collection: &Value, predicate: &Predicate) -> Option<ElementHit> {
    let hit = |key: String, item: &Value| {
        let verdict = predicate.call(item);
        verdict.is_truthy().then_some(ElementHit { key, verdict })
    };

    match collection {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, item)| hit(index.to_string(), item)),
        Value::Object(map) => map.iter().find_map(|(key, item)| hit(key.clone(), item)),
        scalar => hit("0".to_string(), scalar),
    }
}

/// Returns the predicate's verdict on the whole value.
pub fn validator(value: &Value, predicate: &Predicate) -> Verdict {
    predicate.call(value)
}
