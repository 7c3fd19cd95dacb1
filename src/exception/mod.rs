use axum::{
    http::{Method, Request, Uri},
    response::Response,
};

use crate::error::WebError;

pub mod http;
pub mod layer;

pub use http::HttpExceptionFilter;
pub use layer::{ExceptionLayer, ExceptionMiddleware};

/// The part of the in-flight request an exception filter gets to see.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
}

impl RequestContext {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
        }
    }
}

/// The ExceptionFilter trait
///
/// Filters handle errors returned during request processing.
/// Returning `None` means no custom response: the default handling proceeds.
pub trait ExceptionFilter: Send + Sync + 'static {
    fn process_exception(&self, request: &RequestContext, error: &WebError) -> Option<Response>;
}
