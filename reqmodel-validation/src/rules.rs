// Field rules and models

use crate::FieldType;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Answer of a user-supplied predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Bool(bool),
    /// A failing answer that carries its own message.
    Error(String),
}

impl Verdict {
    pub fn error(message: impl Into<String>) -> Self {
        Verdict::Error(message.into())
    }

    /// `Bool(true)` and any `Error` are truthy.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Verdict::Bool(true) | Verdict::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Error(message) => Some(message),
            Verdict::Bool(_) => None,
        }
    }

    /// Flip a boolean answer; an `Error` stays an `Error`.
    pub fn negate(self) -> Self {
        match self {
            Verdict::Bool(b) => Verdict::Bool(!b),
            error => error,
        }
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        Verdict::Bool(value)
    }
}

impl<E: fmt::Display> From<Result<bool, E>> for Verdict {
    fn from(result: Result<bool, E>) -> Self {
        match result {
            Ok(b) => Verdict::Bool(b),
            Err(e) => Verdict::Error(e.to_string()),
        }
    }
}

/// Shareable predicate over a field value.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> Verdict + Send + Sync>);

impl Predicate {
    /// Wrap a closure returning anything convertible into a [`Verdict`]
    /// (`bool`, `Result<bool, E>`, `Verdict`).
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self(Arc::new(move |value: &Value| f(value).into()))
    }

    pub fn call(&self, value: &Value) -> Verdict {
        (self.0)(value)
    }

    /// Predicate with the boolean answer flipped.
    ///
    /// `each` flags the elements its predicate answers `true` for, so a
    /// validity check such as [`crate::predicates::email`] is passed to
    /// `each` as `email().negate()`.
    pub fn negate(self) -> Self {
        let inner = self.0;
        Self(Arc::new(move |value: &Value| inner(value).negate()))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// `omitted` accepts a plain flag or a predicate deciding on the present value.
#[derive(Debug, Clone)]
pub enum OmittedSpec {
    Flag(bool),
    Predicate(Predicate),
}

/// One sub-rule value plus an optional message replacing the default one.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T> {
    pub value: T,
    pub message: Option<String>,
}

impl<T> Rule<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            message: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<bool> for Rule<bool> {
    fn from(value: bool) -> Self {
        Rule::new(value)
    }
}

impl From<FieldType> for Rule<FieldType> {
    fn from(value: FieldType) -> Self {
        Rule::new(value)
    }
}

impl From<Predicate> for Rule<Predicate> {
    fn from(value: Predicate) -> Self {
        Rule::new(value)
    }
}

impl From<bool> for Rule<OmittedSpec> {
    fn from(value: bool) -> Self {
        Rule::new(OmittedSpec::Flag(value))
    }
}

macro_rules! bound_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Rule<f64> {
                fn from(value: $t) -> Self {
                    Rule::new(value as f64)
                }
            }
        )*
    };
}

bound_from!(f64, f32, i32, i64, u32, u64, usize);

/// Rules for one field. A rule with nothing set always passes.
///
/// ```
/// use reqmodel_validation::{FieldRule, FieldType, Rule};
///
/// let age = FieldRule::new()
///     .required(true)
///     .of_type(FieldType::Number)
///     .min(0)
///     .max(Rule::new(150.0).message("Nobody is that old"));
/// assert!(!age.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    pub(crate) required: Option<Rule<bool>>,
    pub(crate) omitted: Option<Rule<OmittedSpec>>,
    pub(crate) field_type: Option<Rule<FieldType>>,
    pub(crate) min: Option<Rule<f64>>,
    pub(crate) max: Option<Rule<f64>>,
    pub(crate) each: Option<Rule<Predicate>>,
    pub(crate) validate: Option<Rule<Predicate>>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be present when the flag is true.
    pub fn required(mut self, flag: impl Into<Rule<bool>>) -> Self {
        self.required = Some(flag.into());
        self
    }

    /// The field must be absent when the flag is true.
    pub fn omitted(mut self, flag: impl Into<Rule<OmittedSpec>>) -> Self {
        self.omitted = Some(flag.into());
        self
    }

    /// Decide on a present field with a predicate; `true` lets it through.
    pub fn omitted_unless<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.omitted = Some(Rule::new(OmittedSpec::Predicate(Predicate::new(f))));
        self
    }

    pub fn of_type(mut self, field_type: impl Into<Rule<FieldType>>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Lower bound on the number, or on the length of text and arrays.
    pub fn min(mut self, bound: impl Into<Rule<f64>>) -> Self {
        self.min = Some(bound.into());
        self
    }

    /// Upper bound on the number, or on the length of text and arrays.
    pub fn max(mut self, bound: impl Into<Rule<f64>>) -> Self {
        self.max = Some(bound.into());
        self
    }

    /// Flag elements of a collection.
    ///
    /// The first element the predicate answers `true` (or an `Error`) for
    /// fails the field; if no element is flagged the field passes.
    pub fn each<F, R>(self, f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.each_rule(Predicate::new(f))
    }

    pub fn each_rule(mut self, rule: impl Into<Rule<Predicate>>) -> Self {
        self.each = Some(rule.into());
        self
    }

    /// Custom check on the whole value; `false` or an `Error` fails the field.
    pub fn validate<F, R>(self, f: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.validate_rule(Predicate::new(f))
    }

    pub fn validate_rule(mut self, rule: impl Into<Rule<Predicate>>) -> Self {
        self.validate = Some(rule.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_none()
            && self.omitted.is_none()
            && self.field_type.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.each.is_none()
            && self.validate.is_none()
    }
}

/// Field name to rule mapping, walked in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Model {
    fields: Vec<(String, FieldRule)>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field. Declaring a name twice replaces the first
    /// declaration in place.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: FieldRule) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((name, rule)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldRule)> for Model {
    fn from_iter<I: IntoIterator<Item = (S, FieldRule)>>(iter: I) -> Self {
        let mut model = Model::new();
        for (name, rule) in iter {
            model.insert(name, rule);
        }
        model
    }
}
