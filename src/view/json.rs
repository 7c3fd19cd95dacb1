//! JSON helpers for views.
//!
//! NOTE: only call these from view code, never from business logic. A failure
//! here is reported to the caller as a 400 saying their JSON is wrong. Business
//! logic should call `serde_json` directly so a failure surfaces as an
//! unexpected error.

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{FriendlyError, ValidationError, WebError, codes};

pub const MISSING_JSON: &str = "Missing JSON.";
pub const INVALID_JSON: &str = "Invalid JSON syntax.";

/// Deserialize a request body, failing with a [`FriendlyError`] the exception
/// filter knows how to render.
///
/// # Example
/// ```
/// use st1_axum::view::json_deserialize;
/// use st1_axum::error::HttpError;
///
/// assert_eq!(json_deserialize("[1, 2]").unwrap(), serde_json::json!([1, 2]));
/// assert_eq!(json_deserialize(None).unwrap_err().code(), 1000);
/// assert_eq!(json_deserialize("{invalid").unwrap_err().code(), 1001);
/// ```
pub fn json_deserialize<'a>(raw: impl Into<Option<&'a str>>) -> Result<Value, FriendlyError> {
    let raw = match raw.into() {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            return Err(FriendlyError::new(
                StatusCode::BAD_REQUEST,
                codes::MISSING_JSON,
                MISSING_JSON,
            ));
        }
    };

    serde_json::from_str(raw).map_err(|e| {
        FriendlyError::new(StatusCode::BAD_REQUEST, codes::INVALID_JSON, INVALID_JSON)
            .with_debug(e.to_string())
    })
}

/// Like [`json_deserialize`], then converts the value into `T`.
///
/// Well formed JSON of the wrong shape is a [`ValidationError`].
pub fn json_deserialize_as<'a, T>(raw: impl Into<Option<&'a str>>) -> Result<T, WebError>
where
    T: DeserializeOwned,
{
    from_value(json_deserialize(raw)?)
}

pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, WebError> {
    serde_json::from_value(value).map_err(|e| {
        let error = ValidationError::new(json!({ "body": e.to_string() }));
        WebError::from(error.with_debug(e.to_string()))
    })
}
