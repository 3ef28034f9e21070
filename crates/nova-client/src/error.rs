//! Client error types

use crate::types::ApiError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::backtrace::Backtrace;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, NovaError>;

/// Status reported when no HTTP status is available (network failure, unset)
pub const DEFAULT_STATUS_CODE: u16 = 503;

/// Status carried by local validation and configuration errors
pub const LOCAL_ERROR_STATUS_CODE: u16 = 500;

/// Status carried by well-formed HTTP responses the SDK could not interpret
pub const INVALID_RESPONSE_STATUS_CODE: u16 = 502;

/// How much diagnostic detail [`NovaError::serialize_error`] exposes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorExposure {
    /// Only `id`, `code` and `fields` leave the process
    #[default]
    Public,
    /// Also include `resource` and `meta` (with the captured stack)
    Development,
}

impl ErrorExposure {
    /// `development` (any case) selects [`ErrorExposure::Development`]; anything else is public
    pub fn from_mode(mode: &str) -> Self {
        if mode.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Public
        }
    }
}

/// The single error type of the SDK.
///
/// Every failure surfaces as a `NovaError`: local validation of arguments,
/// transport failures and error responses from the service. It always has a
/// numeric status code and a (possibly empty) [`ApiError`] details object.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct NovaError {
    message: String,
    status_code: u16,
    details: ApiError,
    local: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    stack: CapturedStack,
}

/// Stack captured when the error was created, regardless of `RUST_BACKTRACE`
#[derive(Debug)]
struct CapturedStack(Backtrace);

impl NovaError {
    /// Create an error with an explicit status code and details
    pub fn new(message: impl Into<String>, status_code: u16, details: ApiError) -> Self {
        Self {
            message: message.into(),
            status_code,
            details,
            local: false,
            source: None,
            stack: CapturedStack(Backtrace::force_capture()),
        }
    }

    /// Create an error with the default status code and no details
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(message, DEFAULT_STATUS_CODE, ApiError::default())
    }

    /// Argument rejected before any request was sent
    pub fn validation(
        resource: &str,
        message: impl Into<String>,
        field: &str,
        value: Value,
    ) -> Self {
        Self::new(
            message,
            LOCAL_ERROR_STATUS_CODE,
            ApiError::for_field(resource, field, value),
        )
        .into_local()
    }

    /// Configuration that cannot produce a working client
    pub fn config(message: impl Into<String>, variable: &str, value: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            variable.to_string(),
            value.map_or(Value::Null, |v| Value::String(v.to_string())),
        );
        Self::new(
            message,
            LOCAL_ERROR_STATUS_CODE,
            ApiError {
                fields: Some(fields),
                ..Default::default()
            },
        )
        .into_local()
    }

    fn into_local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Human readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code (or the default when none was available)
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Structured details supplied by the service or by local validation
    pub fn details(&self) -> &ApiError {
        &self.details
    }

    /// Check if the service reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    /// Check if the service rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code, 401 | 403)
    }

    /// Check if this error was raised locally before any request
    pub fn is_validation(&self) -> bool {
        self.local && self.details.resource.is_some()
    }

    /// Reduced view of the error that is safe to hand to an external caller.
    ///
    /// `id`, `code` and `fields` are always present when set. `resource` and
    /// `meta` are only populated under [`ErrorExposure::Development`], where
    /// `meta` additionally carries the captured stack under `"stack"`.
    pub fn serialize_error(&self, exposure: ErrorExposure) -> SerializedError {
        let development = exposure == ErrorExposure::Development;

        let meta = development.then(|| {
            let mut meta = self.details.meta.clone().unwrap_or_default();
            meta.insert("stack".to_string(), Value::String(self.stack.0.to_string()));
            meta
        });

        SerializedError {
            id: self.details.id.clone(),
            code: self.details.code.clone(),
            fields: self.details.fields.clone(),
            resource: if development {
                self.details.resource.clone()
            } else {
                None
            },
            meta,
        }
    }
}

impl From<reqwest::Error> for NovaError {
    fn from(err: reqwest::Error) -> Self {
        crate::envelope::normalize_failure(err.status(), None, &err.to_string()).with_source(err)
    }
}

/// Public shape of a [`NovaError`]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SerializedError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detailed_error() -> NovaError {
        let details: ApiError = serde_json::from_value(json!({
            "id": "err-1",
            "code": "DIR_EXISTS",
            "resource": "directory",
            "fields": { "name": "already taken" },
            "meta": { "owner": 7 }
        }))
        .unwrap();
        NovaError::new("Directory already exists", 409, details)
    }

    #[test]
    fn test_public_serialization_omits_gated_fields() {
        let serialized = detailed_error().serialize_error(ErrorExposure::Public);

        assert_eq!(serialized.id.as_deref(), Some("err-1"));
        assert_eq!(serialized.code.as_deref(), Some("DIR_EXISTS"));
        assert_eq!(serialized.fields.unwrap()["name"], "already taken");
        assert!(serialized.resource.is_none());
        assert!(serialized.meta.is_none());
    }

    #[test]
    fn test_public_json_has_no_gated_keys() {
        let value = serde_json::to_value(detailed_error().serialize_error(ErrorExposure::Public)).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("resource"));
        assert!(!object.contains_key("meta"));
        assert!(object.contains_key("fields"));
    }

    #[test]
    fn test_development_serialization_includes_stack() {
        let serialized = detailed_error().serialize_error(ErrorExposure::Development);

        assert_eq!(serialized.resource.as_deref(), Some("directory"));
        let meta = serialized.meta.unwrap();
        assert_eq!(meta["owner"], 7);
        let stack = meta.get("stack").and_then(Value::as_str).unwrap();
        assert_ne!(stack, "disabled backtrace");
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_development_meta_present_without_details() {
        let serialized = NovaError::unavailable("offline").serialize_error(ErrorExposure::Development);

        let meta = serialized.meta.unwrap();
        assert_ne!(meta["stack"], "disabled backtrace");
        assert!(serialized.resource.is_none());
    }

    #[test]
    fn test_validation_error_shape() {
        let error = NovaError::validation("create_directory", "Directory name is required", "name", json!("  "));

        assert_eq!(error.status_code(), LOCAL_ERROR_STATUS_CODE);
        assert_eq!(error.to_string(), "Directory name is required");
        assert_eq!(error.details().resource.as_deref(), Some("create_directory"));
        assert_eq!(error.details().fields.as_ref().unwrap()["name"], "  ");
        assert!(error.is_validation());
    }

    #[test]
    fn test_config_error_names_variable() {
        let error = NovaError::config("base url must be set in env.NOVA_URL", "NOVA_URL", None);

        assert_eq!(error.status_code(), 500);
        assert_eq!(error.details().fields.as_ref().unwrap()["NOVA_URL"], Value::Null);
        assert!(!error.is_validation());
    }

    #[test]
    fn test_exposure_from_mode() {
        assert_eq!(ErrorExposure::from_mode("development"), ErrorExposure::Development);
        assert_eq!(ErrorExposure::from_mode("DEVELOPMENT"), ErrorExposure::Development);
        assert_eq!(ErrorExposure::from_mode("production"), ErrorExposure::Public);
    }

    #[test]
    fn test_status_predicates() {
        assert!(NovaError::new("gone", 404, ApiError::default()).is_not_found());
        assert!(NovaError::new("no", 403, ApiError::default()).is_unauthorized());
        assert_eq!(NovaError::unavailable("down").status_code(), DEFAULT_STATUS_CODE);
    }
}
