// Request binding
//
// `RequestValidator` installs the error factory on each request;
// `ValidateRequest` runs a model against the request and records the
// outcome in the request's extensions.

use crate::config::ValidatorConfig;
use crate::errors::{ErrorFactory, RequestErrorFactory, ValidationError};
use crate::{Model, Surrogate, engine};
use async_trait::async_trait;
use reqmodel_core::logging::{debug, info};
use reqmodel_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Part of a request a model is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Query,
    Body,
    Params,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Query => "query",
            Source::Body => "body",
            Source::Params => "params",
        }
    }

    /// Read this part of the request as a flat object.
    pub fn extract(&self, req: &HttpRequest) -> Result<Map<String, Value>, Error> {
        match self {
            Source::Query => Ok(req.query_object()),
            Source::Body => req.body_object(),
            Source::Params => Ok(req.params_object()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Source::Query),
            "body" => Ok(Source::Body),
            "params" => Ok(Source::Params),
            other => Err(format!("unknown request source: {other}")),
        }
    }
}

type SharedFactory = Arc<dyn ErrorFactory<Error = ValidationError> + Send + Sync>;

/// Per-request validation settings installed by [`RequestValidator`].
#[derive(Clone)]
pub struct Validation {
    factory: SharedFactory,
    sources: Vec<Source>,
    log_failures: bool,
}

impl Validation {
    pub fn new<F>(factory: F) -> Self
    where
        F: ErrorFactory<Error = ValidationError> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            sources: vec![Source::Query],
            log_failures: true,
        }
    }

    pub fn factory(&self) -> &(dyn ErrorFactory<Error = ValidationError> + Send + Sync) {
        self.factory.as_ref()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn log_failures(&self) -> bool {
        self.log_failures
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new(RequestErrorFactory::default())
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("sources", &self.sources)
            .field("log_failures", &self.log_failures)
            .finish_non_exhaustive()
    }
}

/// Outcome of the last validation run on a request. `None` means it passed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidateError(pub Option<ValidationError>);

/// Middleware that prepares each request for validation.
///
/// Clears any previous outcome and installs the configured [`Validation`]
/// before handing the request on.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    binding: Arc<Validation>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self {
            binding: Arc::new(Validation::default()),
        }
    }

    /// Use a custom error factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: ErrorFactory<Error = ValidationError> + Send + Sync + 'static,
    {
        Self {
            binding: Arc::new(Validation::new(factory)),
        }
    }

    /// Request parts checked by [`ValidateRequest::validate`].
    pub fn with_sources(mut self, sources: impl Into<Vec<Source>>) -> Self {
        Arc::make_mut(&mut self.binding).sources = sources.into();
        self
    }

    pub fn with_failure_logging(mut self, enabled: bool) -> Self {
        Arc::make_mut(&mut self.binding).log_failures = enabled;
        self
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::with_factory(config.error_factory())
            .with_sources(config.sources.clone())
            .with_failure_logging(config.log_failures)
    }

    pub fn binding(&self) -> &Validation {
        &self.binding
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for RequestValidator {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        req.extensions.remove::<ValidateError>();
        req.extensions.insert_arc(self.binding.clone());
        next(req).await
    }
}

/// Model validation on a request.
///
/// Results are stored in the request's extensions and can be read back
/// with [`validate_error`](ValidateRequest::validate_error). Requests that
/// did not pass through [`RequestValidator`] use the default factory and
/// check the query only.
pub trait ValidateRequest {
    /// Check the sources configured on the request's binding.
    fn validate(&mut self, model: &Model) -> Result<Option<ValidationError>, Error>;

    /// Check the given sources in order.
    ///
    /// Fails only when a source cannot be read, such as a malformed JSON
    /// body.
    fn validate_sources(
        &mut self,
        model: &Model,
        sources: &[Source],
    ) -> Result<Option<ValidationError>, Error>;

    /// Check caller-provided objects in order.
    fn validate_objects(
        &mut self,
        model: &Model,
        objects: &[&dyn Surrogate],
    ) -> Option<ValidationError>;

    /// Outcome of the last validation, if it failed.
    fn validate_error(&self) -> Option<&ValidationError>;
}

impl ValidateRequest for HttpRequest {
    fn validate(&mut self, model: &Model) -> Result<Option<ValidationError>, Error> {
        let sources = binding_of(self).sources.clone();
        self.validate_sources(model, &sources)
    }

    fn validate_sources(
        &mut self,
        model: &Model,
        sources: &[Source],
    ) -> Result<Option<ValidationError>, Error> {
        let req: &HttpRequest = self;
        let objects = match sources
            .iter()
            .map(|source| source.extract(req))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(objects) => objects,
            Err(err) => {
                // An unreadable source leaves no outcome for this call
                self.extensions.remove::<ValidateError>();
                return Err(err);
            }
        };
        let objects: Vec<&dyn Surrogate> = objects.iter().map(|o| o as &dyn Surrogate).collect();

        Ok(self.validate_objects(model, &objects))
    }

    fn validate_objects(
        &mut self,
        model: &Model,
        objects: &[&dyn Surrogate],
    ) -> Option<ValidationError> {
        let binding = binding_of(self);
        let outcome = engine::validate_all(objects, model, binding.factory()).err();

        if let Some(err) = &outcome {
            if binding.log_failures() {
                info!(
                    method = %self.method,
                    path = %self.path,
                    property = %err.property(),
                    kind = %err.kind(),
                    "Request failed validation"
                );
            }
        } else {
            debug!(path = %self.path, "Request passed validation");
        }

        self.extensions.insert(ValidateError(outcome.clone()));
        outcome
    }

    fn validate_error(&self) -> Option<&ValidationError> {
        self.extensions
            .get::<ValidateError>()
            .and_then(|slot| slot.0.as_ref())
    }
}

fn binding_of(req: &HttpRequest) -> Arc<Validation> {
    req.extensions.get_arc::<Validation>().unwrap_or_default()
}

/// Validate a request in a handler and return the error response early.
///
/// ```ignore
/// let mut req = req;
/// validate_request!(req, &MODEL);
/// ```
#[macro_export]
macro_rules! validate_request {
    ($req:expr, $model:expr) => {{
        use $crate::ValidateRequest as _;
        if let Some(err) = $req.validate($model)? {
            return Ok(err.into_response());
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorContext, ErrorKind, FieldRule, FieldType};
    use reqmodel_core::{MiddlewareChain, handler};
    use serde_json::json;

    fn required_a() -> Model {
        Model::new().field("a", FieldRule::new().required(true))
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!("query".parse::<Source>(), Ok(Source::Query));
        assert_eq!(" Body ".parse::<Source>(), Ok(Source::Body));
        assert_eq!("params".parse::<Source>(), Ok(Source::Params));
        assert!("headers".parse::<Source>().is_err());
        assert_eq!(Source::Params.to_string(), "params");
    }

    #[test]
    fn test_validate_without_middleware_uses_defaults() {
        let mut req = HttpRequest::from_uri("GET", "/required");

        let err = req.validate(&required_a()).unwrap().unwrap();
        assert_eq!(err.message(), "Missing parameter: a");
        assert_eq!(err.status(), 400);
        assert_eq!(req.validate_error(), Some(&err));
    }

    #[test]
    fn test_successful_validation_clears_slot() {
        let mut req = HttpRequest::from_uri("GET", "/required");
        assert!(req.validate(&required_a()).unwrap().is_some());

        req.query_params.insert("a".to_string(), "1".to_string());
        assert_eq!(req.validate(&required_a()).unwrap(), None);
        assert_eq!(req.validate_error(), None);
    }

    #[test]
    fn test_validate_sources_in_order() {
        let mut req = HttpRequest::from_uri("POST", "/users?a=1")
            .with_body(br#"{"b": "x"}"#.to_vec());
        let model = Model::new().field("b", FieldRule::new().of_type(FieldType::Number));

        let err = req
            .validate_sources(&model, &[Source::Query, Source::Body])
            .unwrap()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.value(), Some(&json!("x")));
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let mut req = HttpRequest::from_uri("POST", "/users").with_body(b"{not json".to_vec());
        let result = req.validate_sources(&required_a(), &[Source::Body]);
        assert!(result.is_err());
        assert_eq!(req.validate_error(), None);
    }

    #[test]
    fn test_unreadable_source_clears_previous_outcome() {
        let mut req = HttpRequest::from_uri("POST", "/users");
        assert!(req.validate(&required_a()).unwrap().is_some());
        assert!(req.validate_error().is_some());

        req.body = b"{oops".to_vec();
        assert!(req.validate_sources(&required_a(), &[Source::Body]).is_err());
        assert_eq!(req.validate_error(), None);
    }

    #[test]
    fn test_each_walks_body_keys_in_document_order() {
        let mut req = HttpRequest::from_uri("POST", "/flags")
            .with_body(br#"{"a": {"z": true, "b": true}}"#.to_vec());
        let model = Model::new().field(
            "a",
            FieldRule::new().each(|v: &Value| v.as_bool().unwrap_or(false)),
        );

        let err = req
            .validate_sources(&model, &[Source::Body])
            .unwrap()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ElementValidationFailure);
        assert_eq!(err.key(), Some("z"));
    }

    #[test]
    fn test_validate_objects() {
        let mut req = HttpRequest::from_uri("GET", "/");
        let present = json!({"a": null});
        let absent = json!({});

        let passing: [&dyn Surrogate; 1] = [&present];
        let failing: [&dyn Surrogate; 2] = [&present, &absent];

        assert_eq!(req.validate_objects(&required_a(), &passing), None);
        assert!(req.validate_objects(&required_a(), &failing).is_some());
    }

    #[tokio::test]
    async fn test_middleware_installs_factory() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(RequestValidator::with_factory(
            RequestErrorFactory::new().with_status(422),
        ));

        let app = handler(|mut req: HttpRequest| async move {
            match req.validate(&required_a())? {
                Some(err) => Ok(err.into_response()),
                None => Ok(HttpResponse::ok()),
            }
        });

        let response = chain
            .apply(HttpRequest::from_uri("GET", "/required"), app.clone())
            .await
            .unwrap();
        assert_eq!(response.status, 422);

        let response = chain
            .apply(HttpRequest::from_uri("GET", "/required?a=1"), app)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_middleware_resets_previous_outcome() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(RequestValidator::new());

        let mut req = HttpRequest::from_uri("GET", "/required");
        req.validate(&required_a()).unwrap();
        assert!(req.validate_error().is_some());

        let app = handler(|req: HttpRequest| async move {
            assert!(req.validate_error().is_none());
            Ok(HttpResponse::no_content())
        });
        let response = chain.apply(req, app).await.unwrap();
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_configured_sources() {
        let mut chain = MiddlewareChain::new();
        chain.use_middleware(RequestValidator::new().with_sources([Source::Params]));

        let app = handler(|mut req: HttpRequest| async move {
            req.path_params.insert("a".to_string(), "7".to_string());
            let outcome = req.validate(&required_a())?;
            Ok(HttpResponse::new(if outcome.is_none() { 200 } else { 400 }))
        });

        let response = chain
            .apply(HttpRequest::from_uri("GET", "/items"), app)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_validate_request_macro() {
        fn route(mut req: HttpRequest) -> Result<HttpResponse, Error> {
            validate_request!(req, &required_a());
            Ok(HttpResponse::ok())
        }

        assert_eq!(route(HttpRequest::from_uri("GET", "/?a=1")).unwrap().status, 200);
        assert_eq!(route(HttpRequest::from_uri("GET", "/")).unwrap().status, 400);
    }

    #[test]
    fn test_closure_factory_binding() {
        let factory = |message: String, context: ErrorContext| {
            ValidationError::new(format!("[{}] {message}", context.kind), context).with_status(409)
        };
        let validator = RequestValidator::with_factory(factory);

        let mut req = HttpRequest::from_uri("GET", "/");
        req.extensions.insert_arc(Arc::new(validator.binding().clone()));

        let err = req.validate(&required_a()).unwrap().unwrap();
        assert_eq!(err.status(), 409);
        assert_eq!(err.message(), "[MissingRequiredField] Missing parameter: a");
    }
}
