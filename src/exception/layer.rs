use crate::config::Settings;
use crate::error::{RaisedError, WebError};
use crate::exception::{ExceptionFilter, HttpExceptionFilter, RequestContext};
use axum::{
    http::{Request, header},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer running an [`ExceptionFilter`] over every error a handler returns.
///
/// Responses that do not come from a [`WebError`] pass through untouched.
/// When built from [`Settings`], they are also published to the request
/// extensions so views and extractors apply the configured body limit.
#[derive(Clone)]
pub struct ExceptionLayer {
    filter: Arc<dyn ExceptionFilter>,
    settings: Option<Arc<Settings>>,
}

impl ExceptionLayer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: Some(Arc::new(settings.clone())),
            ..Self::with_filter(HttpExceptionFilter::new(settings))
        }
    }

    pub fn with_filter(filter: impl ExceptionFilter) -> Self {
        Self {
            filter: Arc::new(filter),
            settings: None,
        }
    }
}

impl<S> Layer<S> for ExceptionLayer {
    type Service = ExceptionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: self.filter.clone(),
            settings: self.settings.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
    settings: Option<Arc<Settings>>,
}

impl<S, B> Service<Request<B>> for ExceptionMiddleware<S>
where
    S: Service<Request<B>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if let Some(settings) = &self.settings {
            request.extensions_mut().insert(Settings::clone(settings));
        }
        let context = RequestContext::from_request(&request);
        let filter = self.filter.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            let raised = response.extensions_mut().remove::<RaisedError>();
            let Some(RaisedError(error)) = raised else {
                return Ok(response);
            };

            Ok(filter
                .process_exception(&context, &error)
                .unwrap_or_else(|| technical_response(&error)))
        })
    }
}

/// Default response when the filter declines to handle an error.
///
/// Plain text with everything known about the failure. Only reached in debug
/// mode with the default filter.
pub fn technical_response(error: &WebError) -> Response {
    let text = match error {
        WebError::Unexpected(e) => format!("{e:?}"),
        other => format!("{other}\n\n{other:#?}"),
    };
    (
        error.status_code(),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FriendlyError, GuardianError};
    use axum::{Extension, Json, Router, body::Body, http::StatusCode, routing::get};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn ok() -> Json<Value> {
        Json(json!({ "status": "ok" }))
    }

    async fn teapot() -> (StatusCode, &'static str) {
        (StatusCode::IM_A_TEAPOT, "short and stout")
    }

    async fn friendly() -> Result<Json<Value>, WebError> {
        Err(FriendlyError::new(StatusCode::CONFLICT, 4090, "Order already exists.")
            .with_debug("duplicate key")
            .into())
    }

    async fn denied() -> Result<Json<Value>, WebError> {
        Err(GuardianError::new(4030).with_subject("user-42").into())
    }

    async fn broken() -> Result<Json<Value>, WebError> {
        let amount: u32 = "twelve".parse().map_err(WebError::unexpected)?;
        Ok(Json(json!({ "amount": amount })))
    }

    async fn body_limit(Extension(settings): Extension<Settings>) -> String {
        settings.body_limit.to_string()
    }

    fn app(settings: &Settings) -> Router {
        Router::new()
            .route("/ok", get(ok))
            .route("/teapot", get(teapot))
            .route("/friendly", get(friendly))
            .route("/denied", get(denied))
            .route("/broken", get(broken))
            .route("/body-limit", get(body_limit))
            .layer(ExceptionLayer::new(settings))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_successful_responses_pass_through() {
        let (status, body) = call(app(&Settings::default()), "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "status": "ok" }));

        let (status, body) = call(app(&Settings::default()), "/teapot").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(body, "short and stout");
    }

    #[tokio::test]
    async fn test_settings_reach_handlers() {
        let settings = Settings {
            body_limit: 512,
            ..Settings::default()
        };
        let (status, body) = call(app(&settings), "/body-limit").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "512");
    }

    #[tokio::test]
    async fn test_friendly_error_becomes_json() {
        let (status, body) = call(app(&Settings::default()), "/friendly").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "code": 4090, "message": "Order already exists." })
        );
    }

    #[tokio::test]
    async fn test_debug_mode_adds_debug_text() {
        let (_, body) = call(app(&Settings::default().debug(true)), "/friendly").await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["debug"], "duplicate key");
    }

    #[tokio::test]
    async fn test_guardian_error_is_redacted() {
        let (status, body) = call(app(&Settings::default()), "/denied").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!body.contains("user-42"));
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "code": 4030, "message": "Access Denied" })
        );
    }

    #[tokio::test]
    async fn test_unexpected_error_is_generic_outside_debug() {
        let (status, body) = call(app(&Settings::default()), "/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "error": "Unexpected Error Occurred" })
        );
    }

    #[tokio::test]
    async fn test_unexpected_error_shows_technical_page_in_debug() {
        let (status, body) = call(app(&Settings::default().debug(true)), "/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("invalid digit found in string"));
    }
}
