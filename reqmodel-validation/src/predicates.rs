// Built-in predicates
//
// Each function returns a predicate that answers `true` for a valid value.
// Use them with `validate`, or negated with `each`:
//
//     FieldRule::new().each_rule(predicates::email().negate())

use crate::Predicate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("email pattern compiles")
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern compiles"));

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern compiles")
});

static ALPHA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("alpha pattern compiles"));

static ALPHANUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("alphanumeric pattern compiles"));

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern compiles"));

fn text_matching(regex: &'static Lazy<Regex>) -> Predicate {
    Predicate::new(move |value: &Value| value.as_str().is_some_and(|s| regex.is_match(s)))
}

/// Text that looks like an email address.
pub fn email() -> Predicate {
    text_matching(&EMAIL_REGEX)
}

/// Text starting with `http://` or `https://`.
pub fn url() -> Predicate {
    text_matching(&URL_REGEX)
}

/// Hyphenated UUID text, either case.
pub fn uuid() -> Predicate {
    text_matching(&UUID_REGEX)
}

pub fn alpha() -> Predicate {
    text_matching(&ALPHA_REGEX)
}

pub fn alphanumeric() -> Predicate {
    text_matching(&ALPHANUMERIC_REGEX)
}

/// Digits only. Numbers from a parsed query are accepted too.
pub fn numeric() -> Predicate {
    Predicate::new(|value: &Value| match value {
        Value::String(s) => NUMERIC_REGEX.is_match(s),
        Value::Number(n) => n.is_u64(),
        _ => false,
    })
}

/// Text matching a caller-supplied pattern.
pub fn matches(regex: Regex) -> Predicate {
    Predicate::new(move |value: &Value| value.as_str().is_some_and(|s| regex.is_match(s)))
}

/// Value equal to one of the allowed values.
pub fn one_of<I, V>(allowed: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    Predicate::new(move |value: &Value| allowed.contains(value))
}

/// Non-blank text, or a non-empty array or object. Numbers and booleans
/// always count as non-empty; `null` never does.
pub fn not_empty() -> Predicate {
    Predicate::new(|value: &Value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    })
}
