// reqmodel - declarative validation of HTTP request parameters
//
// Re-exports the request types and middleware chain from reqmodel-core and,
// with the `validation` feature (on by default), the model validator.

// Re-export core functionality
pub use reqmodel_core::*;

// Re-export optional crates
#[cfg(feature = "validation")]
pub use reqmodel_validation;

/// Everything needed to declare models and validate requests.
pub mod prelude {
    pub use reqmodel_core::logging::{LogConfig, LogFormat, LogLevel, LogOutput};
    pub use reqmodel_core::{
        Error, HandlerFn, HttpRequest, HttpResponse, Middleware, MiddlewareChain, Next,
        RequestLogger, handler,
    };

    #[cfg(feature = "validation")]
    pub use reqmodel_validation::{
        ErrorContext, ErrorFactory, ErrorKind, FieldRule, FieldType, Model, ModelValue,
        Predicate, RequestErrorFactory, RequestValidator, Rule, Source, ValidateRequest,
        ValidationError, ValidatorConfig, Verdict, predicates, validate, validate_all,
    };

    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}
