// Validation errors and the factories that build them

use crate::FieldType;
use reqmodel_core::{Error, HttpResponse};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Name carried by errors from the default factory.
pub const DEFAULT_ERROR_NAME: &str = "RequestValidationError";

/// Status carried by errors from the default factory.
pub const DEFAULT_STATUS: u16 = 400;

/// Which rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingRequiredField,
    UnexpectedPresentField,
    TypeMismatch,
    BelowMinimum,
    AboveMaximum,
    ElementValidationFailure,
    CustomValidationFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "MissingRequiredField",
            ErrorKind::UnexpectedPresentField => "UnexpectedPresentField",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::BelowMinimum => "BelowMinimum",
            ErrorKind::AboveMaximum => "AboveMaximum",
            ErrorKind::ElementValidationFailure => "ElementValidationFailure",
            ErrorKind::CustomValidationFailure => "CustomValidationFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule value that triggered a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Flag(bool),
    Type(FieldType),
    Bound(f64),
    Predicate,
}

impl Serialize for ModelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ModelValue::Flag(flag) => serializer.serialize_bool(*flag),
            ModelValue::Type(field_type) => serializer.serialize_str(field_type.name()),
            ModelValue::Bound(bound) if bound.fract() == 0.0 && bound.abs() < 9.0e15 => {
                serializer.serialize_i64(*bound as i64)
            }
            ModelValue::Bound(bound) => serializer.serialize_f64(*bound),
            ModelValue::Predicate => serializer.serialize_str("[predicate]"),
        }
    }
}

/// Everything a factory knows about a failure besides its message.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    pub kind: ErrorKind,
    pub property: String,
    /// The offending value; `None` when the field was absent
    pub value: Option<Value>,
    pub model_value: Option<ModelValue>,
    /// Element key or index for `each` failures
    pub key: Option<String>,
}

/// A failed validation. Built once by an [`ErrorFactory`] and read through
/// accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ValidationError {
    name: String,
    kind: ErrorKind,
    message: String,
    status: u16,
    property: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_value: Option<ModelValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

impl ValidationError {
    /// Error with the default name and status.
    pub fn new(message: impl Into<String>, context: ErrorContext) -> Self {
        Self {
            name: DEFAULT_ERROR_NAME.to_string(),
            kind: context.kind,
            message: message.into(),
            status: DEFAULT_STATUS,
            property: context.property,
            value: context.value,
            model_value: context.model_value,
            key: context.key,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn model_value(&self) -> Option<&ModelValue> {
        self.model_value.as_ref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "name": self.name,
                "message": self.message,
                "status": self.status,
                "property": self.property,
            })
        })
    }

    /// JSON response carrying the error's status.
    pub fn into_response(self) -> HttpResponse {
        let body = self.to_json().to_string().into_bytes();
        HttpResponse::new(self.status)
            .with_header("Content-Type".to_string(), "application/json".to_string())
            .with_body(body)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Error::Validation(error.message)
    }
}

/// Builds the error returned for a failed rule.
///
/// Any `Fn(String, ErrorContext) -> E` is a factory, so callers can map
/// failures straight into their own error type.
pub trait ErrorFactory {
    type Error;

    fn create(&self, message: String, context: ErrorContext) -> Self::Error;
}

impl<F, E> ErrorFactory for F
where
    F: Fn(String, ErrorContext) -> E,
{
    type Error = E;

    fn create(&self, message: String, context: ErrorContext) -> E {
        self(message, context)
    }
}

/// Default factory producing [`ValidationError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestErrorFactory {
    pub status: u16,
    pub name: String,
}

impl RequestErrorFactory {
    pub fn new() -> Self {
        Self {
            status: DEFAULT_STATUS,
            name: DEFAULT_ERROR_NAME.to_string(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for RequestErrorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorFactory for RequestErrorFactory {
    type Error = ValidationError;

    fn create(&self, message: String, context: ErrorContext) -> ValidationError {
        ValidationError::new(message, context)
            .with_status(self.status)
            .with_name(self.name.clone())
    }
}
