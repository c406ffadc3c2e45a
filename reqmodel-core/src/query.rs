//! Query string parsing.
//!
//! Turns a raw query string into flat parameters, and flat parameters into
//! the JSON object shape that validation works on:
//!
//! - integer-looking values become numbers (`?a=10` gives `10`, not `"10"`),
//! - indexed keys collapse into arrays (`?a[0]=x&a[1]=y` gives `["x", "y"]`),
//! - a bare key is present with an empty string (`?a` gives `""`).

use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};

/// Split a raw query string into decoded key/value pairs.
///
/// Later duplicates of a key replace earlier ones.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, decode_component(value));
    }

    params
}

/// Build a flat JSON object from decoded query parameters.
pub fn query_to_object(params: &HashMap<String, String>) -> Map<String, Value> {
    let mut object = Map::new();
    let mut indexed: BTreeMap<&str, BTreeMap<usize, Value>> = BTreeMap::new();

    for (key, raw) in params {
        match split_indexed_key(key) {
            Some((name, index)) => {
                indexed
                    .entry(name)
                    .or_default()
                    .insert(index, coerce_scalar(raw));
            }
            None => {
                object.insert(key.clone(), coerce_scalar(raw));
            }
        }
    }

    for (name, items) in indexed {
        object.insert(name.to_string(), Value::Array(items.into_values().collect()));
    }

    object
}

/// Convert a raw parameter to a JSON number when it is a plain integer.
pub fn coerce_scalar(raw: &str) -> Value {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Number(Number::from(n));
        }
    }
    Value::String(raw.to_string())
}

fn split_indexed_key(key: &str) -> Option<(&str, usize)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    let index = inner.parse::<usize>().ok()?;
    let name = &key[..open];
    (!name.is_empty()).then_some((name, index))
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
