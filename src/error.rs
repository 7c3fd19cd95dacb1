//! Common error kinds shared between web apps.
//!
//! - [`FriendlyError`]: the message and detail can safely be presented to
//!   external clients, for example a 400 or a 503 when a customer database is
//!   offline.
//! - [`GuardianError`]: the message presented to the caller is always
//!   "Access Denied". Represents an authentication or authorization failure.
//! - [`ValidationError`]: a friendly error detailing the problems with the
//!   caller's input.
//!
//! Handlers return [`WebError`], which also carries the validation library's
//! multi-error and any unexpected failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

use crate::i18n::Catalog;

pub type Result<T> = std::result::Result<T, WebError>;

/// Application error codes owned by this crate.
///
/// Codes are stable across releases so clients can branch on them. Apps
/// should pick their own codes outside these values.
pub mod codes {
    pub const MISSING_JSON: u32 = 1000;
    pub const INVALID_JSON: u32 = 1001;
    pub const BODY_TOO_LARGE: u32 = 1002;
    pub const METHOD_NOT_ALLOWED: u32 = 1003;
    pub const BAD_INPUT: u32 = 4000;
}

/// Message ids. Rendered through the [`Catalog`] at response time.
pub mod messages {
    pub const ACCESS_DENIED: &str = "Access Denied";
    pub const BAD_INPUT: &str = "Bad Input";
    pub const UNEXPECTED_ERROR: &str = "Unexpected Error Occurred";
}

mod sealed {
    pub trait Sealed {}
}

/// Read access shared by every error kind of the taxonomy.
///
/// Sealed: the set of kinds is closed, apps build errors through the
/// constructors of the concrete types.
pub trait HttpError: sealed::Sealed + std::error::Error + Send + Sync {
    /// The status code returned to the caller.
    fn status_code(&self) -> StatusCode;

    /// The application error code returned to the caller.
    fn code(&self) -> u32;

    /// The message id returned to the caller.
    fn message(&self) -> &str;

    /// Structured detail returned to the caller.
    fn detail(&self) -> Option<&Value> {
        None
    }

    /// Text that only shows up in debug mode.
    fn debug(&self) -> Option<&str>;

    /// JSON body for this error.
    fn body(&self, catalog: &Catalog, debug: bool) -> Value {
        let mut body = json!({
            "code": self.code(),
            "message": catalog.gettext(self.message()),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = detail.clone();
        }
        if debug {
            if let Some(text) = self.debug() {
                body["debug"] = Value::String(text.to_string());
            }
        }
        body
    }
}

/// An error that will be displayed to users.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FriendlyError {
    status_code: StatusCode,
    code: u32,
    message: Cow<'static, str>,
    detail: Option<Value>,
    debug: Option<String>,
}

impl FriendlyError {
    pub fn new(status_code: StatusCode, code: u32, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            code,
            message: message.into(),
            detail: None,
            debug: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }
}

impl sealed::Sealed for FriendlyError {}

impl HttpError for FriendlyError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn code(&self) -> u32 {
        self.code
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    fn debug(&self) -> Option<&str> {
        self.debug.as_deref()
    }
}

/// An error whose reason is NOT displayed to users. The caller only sees
/// "Access Denied".
///
/// `iss` and `sub` identify who made the request. They stay server side and
/// only show up in logs.
#[derive(Debug, Clone, Error)]
#[error("Access Denied")]
pub struct GuardianError {
    status_code: StatusCode,
    code: u32,
    iss: Cow<'static, str>,
    sub: Cow<'static, str>,
    debug: Option<String>,
}

impl GuardianError {
    pub const UNKNOWN: &'static str = "Unknown";

    /// Create a 403 with unknown issuer and subject.
    pub fn new(code: u32) -> Self {
        Self {
            status_code: StatusCode::FORBIDDEN,
            code,
            iss: Cow::Borrowed(Self::UNKNOWN),
            sub: Cow::Borrowed(Self::UNKNOWN),
            debug: None,
        }
    }

    /// Use 401 for failed authentication, 403 for failed authorization.
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_issuer(mut self, iss: impl Into<Cow<'static, str>>) -> Self {
        self.iss = iss.into();
        self
    }

    pub fn with_subject(mut self, sub: impl Into<Cow<'static, str>>) -> Self {
        self.sub = sub.into();
        self
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    /// The issuer of the request, if any.
    pub fn iss(&self) -> &str {
        &self.iss
    }

    /// The subject of the request, if any.
    pub fn sub(&self) -> &str {
        &self.sub
    }
}

impl sealed::Sealed for GuardianError {}

impl HttpError for GuardianError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn code(&self) -> u32 {
        self.code
    }

    fn message(&self) -> &str {
        messages::ACCESS_DENIED
    }

    fn debug(&self) -> Option<&str> {
        self.debug.as_deref()
    }
}

/// A friendly error carrying the validation problems with the caller's input.
#[derive(Debug, Clone, Error)]
#[error("Bad Input")]
pub struct ValidationError {
    errors: Value,
    debug: Option<String>,
}

impl ValidationError {
    pub fn new(errors: impl Into<Value>) -> Self {
        Self {
            errors: errors.into(),
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    pub fn errors(&self) -> &Value {
        &self.errors
    }
}

impl sealed::Sealed for ValidationError {}

impl HttpError for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn code(&self) -> u32 {
        codes::BAD_INPUT
    }

    fn message(&self) -> &str {
        messages::BAD_INPUT
    }

    fn detail(&self) -> Option<&Value> {
        Some(&self.errors)
    }

    fn debug(&self) -> Option<&str> {
        self.debug.as_deref()
    }
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Friendly(#[from] FriendlyError),

    #[error(transparent)]
    Guardian(#[from] GuardianError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Several field level violations reported by the validation library.
    #[error(transparent)]
    Invalid(#[from] validator::ValidationErrors),

    /// Anything outside the taxonomy. Never shown to the caller.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl WebError {
    pub fn unexpected<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unexpected(anyhow::Error::new(error))
    }

    /// The taxonomy kind behind this error, if it is one.
    pub fn as_http_error(&self) -> Option<&dyn HttpError> {
        match self {
            WebError::Friendly(e) => Some(e),
            WebError::Guardian(e) => Some(e),
            WebError::Validation(e) => Some(e),
            WebError::Invalid(_) | WebError::Unexpected(_) => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::Invalid(_) => StatusCode::BAD_REQUEST,
            WebError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            other => other
                .as_http_error()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, |e| e.status_code()),
        }
    }
}

// Business logic decodes JSON with serde_json directly. A failure there is a
// bug, not bad client input.
impl From<serde_json::Error> for WebError {
    fn from(error: serde_json::Error) -> Self {
        Self::unexpected(error)
    }
}

/// Body for a validation library multi-error, in the library's own shape.
pub fn multi_error_body(errors: &validator::ValidationErrors) -> Value {
    serde_json::to_value(errors).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize validation errors");
        json!({})
    })
}

/// Generic body returned for unexpected errors outside debug mode.
pub fn unexpected_body(catalog: &Catalog) -> Value {
    json!({ "error": catalog.gettext(messages::UNEXPECTED_ERROR) })
}

/// A [`WebError`] attached to the response built from it.
///
/// [`ExceptionLayer`](crate::exception::ExceptionLayer) takes it back out to
/// run the exception filter with the request context.
#[derive(Debug, Clone)]
pub struct RaisedError(pub Arc<WebError>);

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let catalog = Catalog::default();
        let (status, body) = match &self {
            WebError::Invalid(errors) => (StatusCode::BAD_REQUEST, multi_error_body(errors)),
            WebError::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, unexpected_body(&catalog))
            }
            other => match other.as_http_error() {
                Some(e) => (e.status_code(), e.body(&catalog, false)),
                None => (StatusCode::INTERNAL_SERVER_ERROR, unexpected_body(&catalog)),
            },
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(RaisedError(Arc::new(self)));
        response
    }
}
