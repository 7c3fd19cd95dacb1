//! Class style views.
//!
//! A view is registered either as blocking ([`View`], run on the blocking
//! pool) or as async ([`AsyncView`], awaited on the runtime). The choice is
//! made once, at registration, and recorded as a [`HandlerKind`].
//!
//! ```rust,no_run
//! use st1_axum::view::{AsyncView, ViewRequest, ViewResult, as_async_view};
//! use st1_axum::prelude::*;
//!
//! struct OrderView;
//!
//! #[async_trait]
//! impl AsyncView for OrderView {
//!     async fn post(&self, request: ViewRequest) -> ViewResult {
//!         let order = request.json()?;
//!         Ok(Json(order).into_response())
//!     }
//! }
//!
//! let orders = as_async_view(Arc::new(OrderView));
//! let app: Router = Router::new().route("/orders", orders.into_route());
//! ```

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{self, HeaderMap, Method, StatusCode, Uri, request::Parts},
    response::Response,
    routing::{MethodRouter, any},
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use strum::{AsRefStr, Display};

use crate::config::{DEFAULT_BODY_LIMIT, Settings};
use crate::error::{FriendlyError, WebError, codes};

pub mod json;

pub use json::{json_deserialize, json_deserialize_as};

pub type ViewResult = Result<Response, WebError>;

pub const BODY_TOO_LARGE: &str = "Request body too large.";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed.";

/// How the framework dispatches a registered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum HandlerKind {
    Sync,
    Async,
}

/// A request with its body already buffered.
#[derive(Debug)]
pub struct ViewRequest {
    parts: Parts,
    body: Bytes,
}

impl ViewRequest {
    pub fn from_parts(parts: Parts, body: impl Into<Bytes>) -> Self {
        Self {
            parts,
            body: body.into(),
        }
    }

    /// Read the whole body, up to `limit` bytes.
    ///
    /// Going over the limit is a friendly 413. Any other failure of the body
    /// stream is unexpected.
    pub async fn buffer(request: Request, limit: usize) -> Result<Self, WebError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
            if exceeds_limit(&e) {
                FriendlyError::new(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    codes::BODY_TOO_LARGE,
                    BODY_TOO_LARGE,
                )
                .with_debug(e.to_string())
                .into()
            } else {
                WebError::unexpected(e)
            }
        })?;
        Ok(Self { parts, body })
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, `None` when it is not UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// The body through [`json_deserialize`].
    pub fn json(&self) -> Result<Value, FriendlyError> {
        let raw = std::str::from_utf8(&self.body).map_err(|e| {
            FriendlyError::new(StatusCode::BAD_REQUEST, codes::INVALID_JSON, json::INVALID_JSON)
                .with_debug(e.to_string())
        })?;
        json_deserialize(raw)
    }

    /// The body through [`json_deserialize_as`].
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, WebError> {
        json::from_value(self.json()?)
    }
}

fn exceeds_limit(error: &axum::Error) -> bool {
    std::iter::successors(Some(error as &(dyn std::error::Error + 'static)), |e| e.source())
        .any(|e| e.is::<LengthLimitError>())
}

/// Body limit for `request`: the [`Settings`] published by
/// [`ExceptionLayer`](crate::exception::ExceptionLayer), else
/// [`DEFAULT_BODY_LIMIT`].
pub fn request_body_limit<B>(request: &http::Request<B>) -> usize {
    request
        .extensions()
        .get::<Settings>()
        .map_or(DEFAULT_BODY_LIMIT, |settings| settings.body_limit)
}

pub fn method_not_allowed(method: &Method) -> WebError {
    FriendlyError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        codes::METHOD_NOT_ALLOWED,
        METHOD_NOT_ALLOWED,
    )
    .with_detail(json!({ "method": method.as_str() }))
        .into()
}

/// A blocking view. Each method defaults to 405.
pub trait View: Send + Sync + 'static {
    fn get(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    fn post(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    fn put(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    fn patch(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    fn delete(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    /// Route to the method handler; HEAD is served by `get`.
    fn dispatch(&self, request: ViewRequest) -> ViewResult {
        let method = request.method().clone();
        match method {
            Method::GET | Method::HEAD => self.get(request),
            Method::POST => self.post(request),
            Method::PUT => self.put(request),
            Method::PATCH => self.patch(request),
            Method::DELETE => self.delete(request),
            _ => Err(method_not_allowed(&method)),
        }
    }
}

/// An async view. Each method defaults to 405.
#[async_trait]
pub trait AsyncView: Send + Sync + 'static {
    async fn get(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    async fn post(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    async fn put(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    async fn patch(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    async fn delete(&self, request: ViewRequest) -> ViewResult {
        Err(method_not_allowed(request.method()))
    }

    /// Route to the method handler; HEAD is served by `get`.
    async fn dispatch(&self, request: ViewRequest) -> ViewResult {
        let method = request.method().clone();
        match method {
            Method::GET | Method::HEAD => self.get(request).await,
            Method::POST => self.post(request).await,
            Method::PUT => self.put(request).await,
            Method::PATCH => self.patch(request).await,
            Method::DELETE => self.delete(request).await,
            _ => Err(method_not_allowed(&method)),
        }
    }
}

#[derive(Clone)]
enum Dispatch {
    Sync(Arc<dyn View>),
    Async(Arc<dyn AsyncView>),
}

/// A view registered with its [`HandlerKind`].
#[derive(Clone)]
pub struct ViewHandler {
    dispatch: Dispatch,
    body_limit: Option<usize>,
}

/// Register a blocking view.
pub fn as_view<V: View>(view: Arc<V>) -> ViewHandler {
    ViewHandler {
        dispatch: Dispatch::Sync(view),
        body_limit: None,
    }
}

/// Register an async view.
pub fn as_async_view<V: AsyncView>(view: Arc<V>) -> ViewHandler {
    ViewHandler {
        dispatch: Dispatch::Async(view),
        body_limit: None,
    }
}

impl ViewHandler {
    pub fn kind(&self) -> HandlerKind {
        match self.dispatch {
            Dispatch::Sync(_) => HandlerKind::Sync,
            Dispatch::Async(_) => HandlerKind::Async,
        }
    }

    /// Override the limit taken from the request's [`Settings`].
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    pub fn with_settings(self, settings: &Settings) -> Self {
        self.body_limit(settings.body_limit)
    }

    /// Run the view for one request.
    pub async fn call(&self, request: Request) -> ViewResult {
        tracing::trace!(
            kind = %self.kind(),
            method = %request.method(),
            uri = %request.uri(),
            "dispatching view"
        );
        let limit = self
            .body_limit
            .unwrap_or_else(|| request_body_limit(&request));
        let request = ViewRequest::buffer(request, limit).await?;

        match &self.dispatch {
            Dispatch::Sync(view) => {
                let view = Arc::clone(view);
                tokio::task::spawn_blocking(move || view.dispatch(request))
                    .await
                    .map_err(WebError::unexpected)?
            }
            Dispatch::Async(view) => view.dispatch(request).await,
        }
    }

    /// Route accepting every method; the view answers 405 itself.
    pub fn into_route<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        any(move |request: Request<Body>| {
            let handler = self.clone();
            async move { handler.call(request).await }
        })
    }
}
