//! Declarative request parameter validation for reqmodel
//!
//! A [`Model`] maps field names to [`FieldRule`]s. Validating an object
//! walks the model in declaration order and returns the first failure as an
//! error built by an [`ErrorFactory`].
//!
//! # Examples
//!
//! ## Validating an object
//!
//! ```
//! use reqmodel_validation::*;
//! use serde_json::json;
//!
//! let model = Model::new()
//!     .field("name", FieldRule::new().required(true).of_type(FieldType::String).min(3))
//!     .field("tags", FieldRule::new().of_type(FieldType::Array).max(5))
//!     .field("debug", FieldRule::new().omitted(true));
//!
//! let factory = RequestErrorFactory::default();
//!
//! assert!(validate(&json!({"name": "John", "tags": ["a"]}), &model, &factory).is_ok());
//!
//! let err = validate(&json!({"name": "Jo"}), &model, &factory).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::BelowMinimum);
//! assert_eq!(err.message(), "Invalid min for parameter: name. Expected: 3");
//! ```
//!
//! ## Custom predicates
//!
//! ```
//! use reqmodel_validation::*;
//! use serde_json::{Value, json};
//!
//! let model = Model::new()
//!     .field("emails", FieldRule::new().each_rule(predicates::email().negate()))
//!     .field("code", FieldRule::new().validate(|v: &Value| {
//!         if v.as_str().is_some_and(|s| s.starts_with("RM-")) {
//!             Ok(true)
//!         } else {
//!             Err("code must start with RM-")
//!         }
//!     }));
//!
//! let factory = RequestErrorFactory::default();
//!
//! let err = validate(&json!({"emails": ["a@b.io", "nope"]}), &model, &factory).unwrap_err();
//! assert_eq!(err.key(), Some("1"));
//!
//! let err = validate(&json!({"code": "X-1"}), &model, &factory).unwrap_err();
//! assert_eq!(err.message(), "code must start with RM-");
//! ```
//!
//! ## Validating requests
//!
//! ```
//! use reqmodel_core::HttpRequest;
//! use reqmodel_validation::*;
//!
//! let model = Model::new().field("page", FieldRule::new().of_type(FieldType::Number).min(1));
//!
//! let mut req = HttpRequest::from_uri("GET", "/items?page=0");
//! let err = req.validate(&model).unwrap().unwrap();
//! assert_eq!(err.status(), 400);
//! assert_eq!(req.validate_error(), Some(&err));
//! ```

mod binding;
mod engine;
mod errors;
mod rules;
mod value;

pub mod config;
pub mod evaluators;
pub mod predicates;

pub use binding::*;
pub use config::{ConfigError, ValidatorConfig};
pub use engine::*;
pub use errors::*;
pub use rules::*;
pub use value::*;
