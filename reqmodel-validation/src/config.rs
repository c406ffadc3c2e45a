// Validator configuration
//
// Settings can come from code, a TOML or JSON file, or REQMODEL_*
// environment variables (with `.env` support).

use crate::binding::Source;
use crate::errors::{DEFAULT_ERROR_NAME, DEFAULT_STATUS, RequestErrorFactory};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const ENV_STATUS: &str = "REQMODEL_STATUS";
pub const ENV_ERROR_NAME: &str = "REQMODEL_ERROR_NAME";
pub const ENV_SOURCES: &str = "REQMODEL_SOURCES";
pub const ENV_LOG_FAILURES: &str = "REQMODEL_LOG_FAILURES";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for [`RequestValidator`](crate::RequestValidator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// HTTP status carried by validation errors
    pub status: u16,
    /// `name` carried by validation errors
    pub error_name: String,
    /// Request parts checked by `validate`, in order
    pub sources: Vec<Source>,
    /// Log an `info` event for each rejected request
    pub log_failures: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS,
            error_name: DEFAULT_ERROR_NAME.to_string(),
            sources: vec![Source::Query],
            log_failures: true,
        }
    }
}

impl ValidatorConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(status) = lookup(ENV_STATUS) {
            config.status = status.trim().parse().map_err(|_| {
                ConfigError::ParseError(format!("{ENV_STATUS}: not a status code: {status}"))
            })?;
        }

        if let Some(name) = lookup(ENV_ERROR_NAME) {
            config.error_name = name;
        }

        if let Some(sources) = lookup(ENV_SOURCES) {
            config.sources = sources
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Source>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| ConfigError::ParseError(format!("{ENV_SOURCES}: {e}")))?;
        }

        if let Some(flag) = lookup(ENV_LOG_FAILURES) {
            config.log_failures = parse_bool(&flag).ok_or_else(|| {
                ConfigError::ParseError(format!("{ENV_LOG_FAILURES}: not a boolean: {flag}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        match ext.to_ascii_lowercase().as_str() {
            "toml" => Self::from_toml_str(&std::fs::read_to_string(path)?),
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?),
            other => Err(ConfigError::LoadError(format!(
                "Unsupported file format: {other}"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(400..=599).contains(&self.status) {
            return Err(ConfigError::ValidationError(format!(
                "status must be an error status (400-599), got {}",
                self.status
            )));
        }
        if self.error_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "error_name must not be empty".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one source is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn error_factory(&self) -> RequestErrorFactory {
        RequestErrorFactory::new()
            .with_status(self.status)
            .with_name(self.error_name.clone())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.status, 400);
        assert_eq!(config.error_name, "RequestValidationError");
        assert_eq!(config.sources, vec![Source::Query]);
        assert!(config.log_failures);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = ValidatorConfig::from_lookup(lookup(&[
            (ENV_STATUS, "422"),
            (ENV_ERROR_NAME, "ParamError"),
            (ENV_SOURCES, "query, body,params"),
            (ENV_LOG_FAILURES, "off"),
        ]))
        .unwrap();

        assert_eq!(config.status, 422);
        assert_eq!(config.error_name, "ParamError");
        assert_eq!(config.sources, vec![Source::Query, Source::Body, Source::Params]);
        assert!(!config.log_failures);
    }

    #[test]
    fn test_from_lookup_keeps_defaults_for_unset_keys() {
        let config = ValidatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(matches!(
            ValidatorConfig::from_lookup(lookup(&[(ENV_STATUS, "four hundred")])),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ValidatorConfig::from_lookup(lookup(&[(ENV_SOURCES, "query,headers")])),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ValidatorConfig::from_lookup(lookup(&[(ENV_LOG_FAILURES, "maybe")])),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ValidatorConfig::from_lookup(lookup(&[(ENV_STATUS, "200")])),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let config = ValidatorConfig::from_toml_str(
            r#"
            status = 422
            sources = ["body", "query"]
            "#,
        )
        .unwrap();

        assert_eq!(config.status, 422);
        assert_eq!(config.error_name, "RequestValidationError");
        assert_eq!(config.sources, vec![Source::Body, Source::Query]);
    }

    #[test]
    fn test_from_json_str() {
        let config =
            ValidatorConfig::from_json_str(r#"{"error_name": "BadInput", "log_failures": false}"#)
                .unwrap();
        assert_eq!(config.error_name, "BadInput");
        assert!(!config.log_failures);
    }

    #[test]
    fn test_validation_rules() {
        let mut config = ValidatorConfig::default();
        config.sources.clear();
        assert!(config.validate().is_err());

        let config = ValidatorConfig {
            status: 600,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(ValidatorConfig::from_toml_str("error_name = \"  \"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("reqmodel-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "status = 409").unwrap();
        drop(file);

        let config = ValidatorConfig::from_file(&path).unwrap();
        assert_eq!(config.status, 409);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            ValidatorConfig::from_file("settings.yaml"),
            Err(ConfigError::LoadError(_))
        ));
        assert!(matches!(
            ValidatorConfig::from_file(dir.join("reqmodel-missing.json")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_error_factory_uses_settings() {
        let config = ValidatorConfig {
            status: 422,
            error_name: "ParamError".to_string(),
            ..Default::default()
        };
        let factory = config.error_factory();
        assert_eq!(factory.status, 422);
        assert_eq!(factory.name, "ParamError");
    }
}
