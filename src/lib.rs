//! # st1-axum
//!
//! Common axum web framework functions shared between apps.
//!
//! ## Features
//!
//! - **Error Taxonomy**: [`FriendlyError`], [`GuardianError`] and [`ValidationError`],
//!   returned from handlers as [`WebError`]
//! - **Exception Middleware**: [`ExceptionLayer`] turns every error into a JSON response
//!   and keeps internal detail away from the caller outside debug mode
//! - **Views**: blocking or async class style views registered with an explicit
//!   [`HandlerKind`](view::HandlerKind)
//! - **Guarded JSON**: [`json_deserialize`] reports bad bodies as friendly 400s
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use st1_axum::prelude::*;
//!
//! async fn create_order(body: String) -> Result<Json<serde_json::Value>, WebError> {
//!     let order = json_deserialize(body.as_str())?;
//!     if order.get("mids").is_none() {
//!         return Err(ValidationError::new(serde_json::json!({ "mids": "required" })).into());
//!     }
//!     Ok(Json(order))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     st1_axum::logging::init(&settings)?;
//!
//!     let app = Router::new()
//!         .route("/orders", axum::routing::post(create_order))
//!         .layer(ExceptionLayer::new(&settings));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod exception;
pub mod guard;
pub mod i18n;
pub mod logging;
pub mod pipe;
pub mod view;

// Re-export core types
pub use config::{ConfigService, Settings};
pub use error::{FriendlyError, GuardianError, HttpError, Result, ValidationError, WebError};
pub use exception::{ExceptionFilter, ExceptionLayer, HttpExceptionFilter};
pub use view::{json_deserialize, json_deserialize_as};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;
pub use validator;

/// Prelude module for convenient imports
///
/// ```
/// use st1_axum::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, Settings};
    pub use crate::error::{FriendlyError, GuardianError, HttpError, ValidationError, WebError};
    pub use crate::exception::{
        ExceptionFilter, ExceptionLayer, HttpExceptionFilter, RequestContext,
    };
    pub use crate::guard::{Guard, GuardLayer, GuardResult};
    pub use crate::i18n::Catalog;
    pub use crate::pipe::{JsonPipe, Pipe, PipeResult, ValidJson, ValidationPipe};
    pub use crate::view::{
        AsyncView, HandlerKind, View, ViewHandler, ViewRequest, ViewResult, as_async_view, as_view,
        json_deserialize, json_deserialize_as,
    };
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
