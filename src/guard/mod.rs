use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::GuardianError;

pub mod layer;

pub use layer::{GuardLayer, GuardMiddleware};

/// Standard Result type for Guard
/// Ok(()) means allowed
/// Err(GuardianError) means denied, the caller only sees "Access Denied"
pub type GuardResult = Result<(), GuardianError>;

/// The Guard trait
/// Implement this to protect routes. Guards see the request head only.
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn can_activate(&self, request: &Parts) -> GuardResult;
}
