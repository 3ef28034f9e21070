//! Response envelope normalization
//!
//! Every response from the service goes through this module before an
//! operation sees it. A 2xx body is classified into [`Normalized`]; anything
//! else (transport failure, non-2xx status) becomes a [`NovaError`] with a
//! guaranteed status code, a non-empty message and a details object.

use crate::error::{NovaError, Result, DEFAULT_STATUS_CODE, INVALID_RESPONSE_STATUS_CODE};
use crate::types::ApiError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A successful (2xx) response body after envelope inspection
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    /// `success` was `true` and `data` was present; holds `data` alone
    Unwrapped(Value),
    /// Any other body, passed on untouched
    Passthrough(Value),
}

impl Normalized {
    /// Classify a decoded response body
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut map) if is_unwrappable(&map) => match map.remove("data") {
                Some(data) => Self::Unwrapped(data),
                None => Self::Passthrough(Value::Object(map)),
            },
            other => Self::Passthrough(other),
        }
    }

    /// Classify raw response bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_body(parse_body(bytes))
    }

    /// Extract the named payload field as `T`.
    ///
    /// A passthrough body is accepted when it carries the field itself and does
    /// not declare `success: false`. Otherwise the response is rejected with an
    /// invalid-response error.
    pub fn take_field<T: DeserializeOwned>(
        self,
        field: &str,
        resource: &str,
        route: &str,
    ) -> Result<T> {
        let mut payload = match self {
            Self::Unwrapped(data) => data,
            Self::Passthrough(body) if declares_failure(&body) => {
                return Err(invalid_response(&body, resource, route));
            }
            Self::Passthrough(body) => body,
        };

        match payload.get_mut(field).map(Value::take) {
            Some(value) if !value.is_null() => serde_json::from_value(value).map_err(|e| {
                warn!(resource, route, error = %e, "response payload did not match");
                invalid_response(&Value::Null, resource, route).with_source(e)
            }),
            _ => {
                warn!(resource, route, field, "response payload missing field");
                Err(invalid_response(&payload, resource, route))
            }
        }
    }

    /// Require the body to acknowledge success, discarding any payload
    pub fn ensure_success(self, resource: &str, route: &str) -> Result<()> {
        match self {
            Self::Unwrapped(_) => Ok(()),
            Self::Passthrough(body) if body.get("success") == Some(&Value::Bool(true)) => Ok(()),
            Self::Passthrough(body) => Err(invalid_response(&body, resource, route)),
        }
    }
}

fn is_unwrappable(map: &serde_json::Map<String, Value>) -> bool {
    map.get("success") == Some(&Value::Bool(true))
        && map.get("data").is_some_and(|data| !data.is_null())
}

fn declares_failure(body: &Value) -> bool {
    body.get("success") == Some(&Value::Bool(false))
}

/// Decode a response body. Empty bodies become `null`, non-JSON bodies a string.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Build the error for a failed call.
///
/// * status: the HTTP status, or [`DEFAULT_STATUS_CODE`] when there is none
/// * message: body `message`, then the status reason phrase, then `transport_message`
/// * details: body `error`, or an empty [`ApiError`]
pub fn normalize_failure(
    status: Option<StatusCode>,
    body: Option<&Value>,
    transport_message: &str,
) -> NovaError {
    let status_code = status.map_or(DEFAULT_STATUS_CODE, |s| s.as_u16());

    let message = body
        .and_then(body_message)
        .or_else(|| status.and_then(|s| s.canonical_reason()).map(str::to_string))
        .unwrap_or_else(|| transport_message.to_string());

    NovaError::new(message, status_code, body.map(body_details).unwrap_or_default())
}

/// Build the error for a non-2xx response
pub(crate) fn failure_from_response(status: StatusCode, bytes: &[u8]) -> NovaError {
    let body = parse_body(bytes);
    normalize_failure(
        Some(status),
        Some(&body),
        &format!("Request failed with status code {}", status.as_u16()),
    )
}

fn invalid_response(body: &Value, resource: &str, route: &str) -> NovaError {
    let message = body_message(body).unwrap_or_else(|| format!("invalid response from {}", route));
    let mut details = body_details(body);
    details.resource.get_or_insert_with(|| resource.to_string());
    NovaError::new(message, INVALID_RESPONSE_STATUS_CODE, details)
}

fn body_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Decode the `error` object key by key so one oddly typed key does not lose the rest
fn body_details(body: &Value) -> ApiError {
    let Some(error) = body.get("error").and_then(Value::as_object) else {
        return ApiError::default();
    };

    ApiError {
        id: error.get("id").and_then(scalar_string),
        code: error.get("code").and_then(scalar_string),
        resource: error.get("resource").and_then(scalar_string),
        fields: error.get("fields").and_then(Value::as_object).cloned(),
        meta: error.get("meta").and_then(Value::as_object).cloned(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_is_unwrapped() {
        let body = json!({ "success": true, "data": { "directory": { "id": 1 } } });
        assert_eq!(
            Normalized::from_body(body),
            Normalized::Unwrapped(json!({ "directory": { "id": 1 } }))
        );
    }

    #[test]
    fn test_failure_envelope_passes_through() {
        let body = json!({ "success": false, "message": "x" });
        assert_eq!(Normalized::from_body(body.clone()), Normalized::Passthrough(body));
    }

    #[test]
    fn test_success_without_data_passes_through() {
        let body = json!({ "success": true });
        assert_eq!(Normalized::from_body(body.clone()), Normalized::Passthrough(body));

        let body = json!({ "success": true, "data": null });
        assert_eq!(Normalized::from_body(body.clone()), Normalized::Passthrough(body));
    }

    #[test]
    fn test_truthy_success_is_not_unwrapped() {
        let body = json!({ "success": "yes", "data": { "a": 1 } });
        assert_eq!(Normalized::from_body(body.clone()), Normalized::Passthrough(body));
    }

    #[test]
    fn test_empty_and_text_bodies() {
        assert_eq!(Normalized::from_bytes(b""), Normalized::Passthrough(Value::Null));
        assert_eq!(
            Normalized::from_bytes(b"<html>oops</html>"),
            Normalized::Passthrough(json!("<html>oops</html>"))
        );
    }

    #[test]
    fn test_take_field_from_unwrapped() {
        let normalized = Normalized::Unwrapped(json!({ "count": 4 }));
        let count: u32 = normalized.take_field("count", "test", "/route").unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_take_field_from_bare_body() {
        let normalized = Normalized::Passthrough(json!({ "count": 4 }));
        let count: u32 = normalized.take_field("count", "test", "/route").unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_take_field_rejects_declared_failure() {
        let normalized = Normalized::Passthrough(json!({
            "success": false,
            "message": "quota exceeded",
            "count": 4,
            "error": { "code": "QUOTA" }
        }));
        let err = normalized.take_field::<u32>("count", "test", "/route").unwrap_err();

        assert_eq!(err.status_code(), INVALID_RESPONSE_STATUS_CODE);
        assert_eq!(err.message(), "quota exceeded");
        assert_eq!(err.details().code.as_deref(), Some("QUOTA"));
        assert_eq!(err.details().resource.as_deref(), Some("test"));
    }

    #[test]
    fn test_take_field_missing() {
        let err = Normalized::Unwrapped(json!({}))
            .take_field::<u32>("count", "test", "/route")
            .unwrap_err();
        assert_eq!(err.message(), "invalid response from /route");
    }

    #[test]
    fn test_take_field_wrong_shape() {
        let err = Normalized::Unwrapped(json!({ "count": "many" }))
            .take_field::<u32>("count", "test", "/route")
            .unwrap_err();
        assert_eq!(err.status_code(), INVALID_RESPONSE_STATUS_CODE);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_ensure_success() {
        assert!(Normalized::Passthrough(json!({ "success": true })).ensure_success("r", "/x").is_ok());
        assert!(Normalized::Unwrapped(json!({})).ensure_success("r", "/x").is_ok());

        let err = Normalized::Passthrough(json!({ "success": false, "message": "in use" }))
            .ensure_success("r", "/x")
            .unwrap_err();
        assert_eq!(err.message(), "in use");
    }

    #[test]
    fn test_failure_with_api_body() {
        let body = json!({ "message": "not found", "error": { "code": "E1" } });
        let err = normalize_failure(Some(StatusCode::NOT_FOUND), Some(&body), "Request failed");

        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "not found");
        assert_eq!(
            err.details(),
            &ApiError {
                code: Some("E1".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_failure_keeps_details_with_numeric_id() {
        let body = json!({
            "message": "Directory already exists",
            "error": { "id": 17, "code": "E1", "resource": ["dir"], "fields": { "name": "taken" } }
        });
        let err = normalize_failure(Some(StatusCode::CONFLICT), Some(&body), "Request failed");

        let details = err.details();
        assert_eq!(details.id.as_deref(), Some("17"));
        assert_eq!(details.code.as_deref(), Some("E1"));
        assert!(details.resource.is_none());
        assert_eq!(details.fields.as_ref().unwrap()["name"], "taken");
        assert!(details.meta.is_none());
    }

    #[test]
    fn test_failure_with_non_object_error_has_empty_details() {
        let body = json!({ "message": "boom", "error": "E_INTERNAL" });
        let err = normalize_failure(Some(StatusCode::INTERNAL_SERVER_ERROR), Some(&body), "x");
        assert!(err.details().is_empty());
    }

    #[test]
    fn test_failure_without_message_uses_reason_phrase() {
        let err = failure_from_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.message(), "Bad Gateway");
        assert!(err.details().is_empty());
    }

    #[test]
    fn test_failure_with_unknown_status_uses_transport_message() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = failure_from_response(status, b"");
        assert_eq!(err.status_code(), 599);
        assert_eq!(err.message(), "Request failed with status code 599");
    }

    #[test]
    fn test_network_failure_defaults() {
        let err = normalize_failure(None, None, "error trying to connect: connection refused");
        assert_eq!(err.status_code(), DEFAULT_STATUS_CODE);
        assert_eq!(err.message(), "error trying to connect: connection refused");
        assert!(err.details().is_empty());
    }
}
