// HTTP request and response types

use crate::query::{parse_query_string, query_to_object};
use crate::{Error, Extensions, HttpStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: String, path: String) -> Self {
        Self {
            method,
            path,
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Build a request from a raw `path?query` target.
    ///
    /// ```rust
    /// use reqmodel_core::HttpRequest;
    ///
    /// let req = HttpRequest::from_uri("GET", "/search?q=rust&page=2");
    /// assert_eq!(req.path, "/search");
    /// assert_eq!(req.query("page"), Some(&"2".to_string()));
    /// ```
    pub fn from_uri(method: &str, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };

        let mut req = Self::new(method.to_string(), path.to_string());
        req.query_params = parse_query_string(query);
        req
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Parse the request body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Get a path parameter by name
    pub fn param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Query parameters as a flat JSON object (integers coerced, indexed keys grouped).
    pub fn query_object(&self) -> Map<String, Value> {
        query_to_object(&self.query_params)
    }

    /// Path parameters as a flat JSON object, with the same coercion as the query.
    pub fn params_object(&self) -> Map<String, Value> {
        query_to_object(&self.path_params)
    }

    /// Body parsed as a JSON object. An empty body is an empty object.
    pub fn body_object(&self) -> Result<Map<String, Value>, Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::BadRequest(format!(
                "Expected a JSON object body, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(Error::Deserialization(e.to_string())),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(HttpStatus::Ok.code())
    }

    pub fn no_content() -> Self {
        Self::new(HttpStatus::NoContent.code())
    }

    pub fn bad_request() -> Self {
        Self::new(HttpStatus::BadRequest.code())
    }

    /// 200 response with a JSON body
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Self::ok().with_json(value)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Decode the body as JSON
    pub fn body_json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Render a framework error as a JSON response carrying its status.
impl From<&Error> for HttpResponse {
    fn from(error: &Error) -> Self {
        let status = error.status_code();
        let body = serde_json::json!({
            "status": status,
            "message": error.to_string(),
        });
        HttpResponse::new(status)
            .with_header("Content-Type".to_string(), "application/json".to_string())
            .with_body(body.to_string().into_bytes())
    }
}
