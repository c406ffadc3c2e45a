// Model validation
//
// Walks a model in declaration order and stops at the first failing rule.
// Within a field the rules run as: required, omitted, type, min, max, each,
// validate. Only required and omitted look at absent fields.

use crate::errors::{ErrorContext, ErrorFactory, ErrorKind, ModelValue};
use crate::evaluators::{self, ElementHit};
use crate::rules::{FieldRule, OmittedSpec, Rule, Verdict};
use crate::Model;
use crate::Surrogate;
use reqmodel_core::logging::{debug, trace, warn};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};

/// Validate one object against a model.
///
/// Returns the factory's error for the first failing rule. Validation never
/// mutates the object, so repeated calls give the same answer.
///
/// ```
/// use reqmodel_validation::*;
/// use serde_json::json;
///
/// let model = Model::new().field("a", FieldRule::new().of_type(FieldType::Number).min(10));
/// let factory = RequestErrorFactory::default();
///
/// assert!(validate(&json!({"a": 12}), &model, &factory).is_ok());
///
/// let err = validate(&json!({"a": "9"}), &model, &factory).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::TypeMismatch);
/// assert_eq!(err.message(), "Invalid type for parameter: a. Expected: Number");
/// ```
pub fn validate<S, F>(object: &S, model: &Model, factory: &F) -> Result<(), F::Error>
where
    S: Surrogate + ?Sized,
    F: ErrorFactory + ?Sized,
{
    debug!(fields = model.len(), "Validating object");

    for (property, rule) in model.iter() {
        let value = object.field(property);
        trace!(property, present = value.is_some(), "Checking field");

        if let Err(failure) = check_field(property, value, rule) {
            debug!(
                property,
                kind = %failure.kind,
                message = %failure.message,
                "Validation failed"
            );
            let context = ErrorContext {
                kind: failure.kind,
                property: property.to_string(),
                value: value.cloned(),
                model_value: Some(failure.model_value),
                key: failure.key,
            };
            return Err(factory.create(failure.message, context));
        }
    }

    Ok(())
}

/// Validate several objects against the same model, in order.
///
/// The first object to fail ends the walk; later objects are never read.
pub fn validate_all<F>(objects: &[&dyn Surrogate], model: &Model, factory: &F) -> Result<(), F::Error>
where
    F: ErrorFactory + ?Sized,
{
    debug!(objects = objects.len(), fields = model.len(), "Validating objects");

    for object in objects {
        validate(*object, model, factory)?;
    }
    Ok(())
}

struct Failure {
    kind: ErrorKind,
    message: String,
    model_value: ModelValue,
    key: Option<String>,
}

impl Failure {
    fn new(kind: ErrorKind, message: String, model_value: ModelValue) -> Self {
        Self {
            kind,
            message,
            model_value,
            key: None,
        }
    }

    fn at(mut self, key: String) -> Self {
        self.key = Some(key);
        self
    }
}

fn check_field(property: &str, value: Option<&Value>, rule: &FieldRule) -> Result<(), Failure> {
    if let Some(required) = &rule.required {
        if !evaluators::required(value, required.value) {
            return Err(Failure::new(
                ErrorKind::MissingRequiredField,
                message(None, required, || format!("Missing parameter: {property}")),
                ModelValue::Flag(required.value),
            ));
        }
    }

    if let Some(omitted) = &rule.omitted {
        let verdict = guarded(property, "omitted", || evaluators::omitted(value, &omitted.value))
            .unwrap_or(Verdict::Bool(false));
        if verdict != Verdict::Bool(true) {
            let model_value = match omitted.value {
                OmittedSpec::Flag(flag) => ModelValue::Flag(flag),
                OmittedSpec::Predicate(_) => ModelValue::Predicate,
            };
            return Err(Failure::new(
                ErrorKind::UnexpectedPresentField,
                message(Some(&verdict), omitted, || {
                    format!("Unexpected parameter: {property}")
                }),
                model_value,
            ));
        }
    }

    let Some(value) = value else {
        return Ok(());
    };

    if let Some(field_type) = &rule.field_type {
        if !evaluators::type_of(Some(value), field_type.value) {
            return Err(Failure::new(
                ErrorKind::TypeMismatch,
                message(None, field_type, || {
                    format!(
                        "Invalid type for parameter: {property}. Expected: {}",
                        field_type.value
                    )
                }),
                ModelValue::Type(field_type.value),
            ));
        }
    }

    if let Some(min) = &rule.min {
        if !evaluators::min(value, min.value) {
            return Err(Failure::new(
                ErrorKind::BelowMinimum,
                message(None, min, || {
                    format!("Invalid min for parameter: {property}. Expected: {}", min.value)
                }),
                ModelValue::Bound(min.value),
            ));
        }
    }

    if let Some(max) = &rule.max {
        if !evaluators::max(value, max.value) {
            return Err(Failure::new(
                ErrorKind::AboveMaximum,
                message(None, max, || {
                    format!("Invalid max for parameter: {property}. Expected: {}", max.value)
                }),
                ModelValue::Bound(max.value),
            ));
        }
    }

    if let Some(each) = &rule.each {
        let invalid = || format!("Invalid parameter: {property}");
        match guarded(property, "each", || evaluators::each(value, &each.value)) {
            Some(None) => {}
            Some(Some(ElementHit { key, verdict })) => {
                return Err(Failure::new(
                    ErrorKind::ElementValidationFailure,
                    message(Some(&verdict), each, invalid),
                    ModelValue::Predicate,
                )
                .at(key));
            }
            None => {
                return Err(Failure::new(
                    ErrorKind::ElementValidationFailure,
                    message(None, each, invalid),
                    ModelValue::Predicate,
                ));
            }
        }
    }

    if let Some(validator) = &rule.validate {
        let verdict = guarded(property, "validate", || {
            evaluators::validator(value, &validator.value)
        })
        .unwrap_or(Verdict::Bool(false));
        if verdict != Verdict::Bool(true) {
            return Err(Failure::new(
                ErrorKind::CustomValidationFailure,
                message(Some(&verdict), validator, || {
                    format!("Invalid parameter: {property}")
                }),
                ModelValue::Predicate,
            ));
        }
    }

    Ok(())
}

/// Message precedence: the verdict's own message, then the rule's, then the
/// default.
fn message<T>(verdict: Option<&Verdict>, rule: &Rule<T>, default: impl FnOnce() -> String) -> String {
    verdict
        .and_then(Verdict::message)
        .or(rule.message.as_deref())
        .map(str::to_string)
        .unwrap_or_else(default)
}

/// Run a user predicate. A panic counts as a failed rule.
fn guarded<T>(property: &str, rule: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => Some(result),
        Err(_) => {
            warn!(property, rule, "Predicate panicked; treating the field as invalid");
            None
        }
    }
}
