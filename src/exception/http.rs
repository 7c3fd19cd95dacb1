use crate::config::Settings;
use crate::error::{HttpError, WebError, multi_error_body, unexpected_body};
use crate::exception::{ExceptionFilter, RequestContext};
use crate::i18n::Catalog;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// The default exception filter.
///
/// - validation library multi-errors become a 400 with the library's body,
/// - taxonomy errors become `{"code", "message", "detail"}` at their status,
/// - anything else is logged, then hidden behind a generic 500 outside debug
///   mode. In debug mode no response is produced.
#[derive(Debug, Clone, Default)]
pub struct HttpExceptionFilter {
    catalog: Catalog,
    debug: bool,
}

impl HttpExceptionFilter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            catalog: Catalog::default(),
            debug: settings.debug,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    fn handle_known(
        &self,
        request: &RequestContext,
        error: &WebError,
        known: &dyn HttpError,
    ) -> Response {
        match error {
            WebError::Guardian(guardian) => tracing::warn!(
                method = %request.method,
                uri = %request.uri,
                status = guardian.status_code().as_u16(),
                code = guardian.code(),
                iss = guardian.iss(),
                sub = guardian.sub(),
                debug = guardian.debug(),
                "access denied"
            ),
            _ => tracing::debug!(
                method = %request.method,
                uri = %request.uri,
                status = known.status_code().as_u16(),
                code = known.code(),
                error = %known,
                "request failed"
            ),
        }

        (known.status_code(), Json(known.body(&self.catalog, self.debug))).into_response()
    }
}

impl ExceptionFilter for HttpExceptionFilter {
    fn process_exception(&self, request: &RequestContext, error: &WebError) -> Option<Response> {
        if let WebError::Invalid(errors) = error {
            return Some((StatusCode::BAD_REQUEST, Json(multi_error_body(errors))).into_response());
        }

        if let Some(known) = error.as_http_error() {
            return Some(self.handle_known(request, error, known));
        }

        tracing::error!(
            method = %request.method,
            uri = %request.uri,
            error = ?error,
            "unhandled exception"
        );

        if self.debug {
            return None;
        }

        Some(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(unexpected_body(&self.catalog)),
            )
                .into_response(),
        )
    }
}
