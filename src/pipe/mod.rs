use async_trait::async_trait;

use crate::error::WebError;

pub mod builtins;
pub mod extractor;

pub use builtins::{JsonPipe, ValidationPipe};
pub use extractor::ValidJson;

pub type PipeResult<T> = Result<T, WebError>;

/// The Pipe trait for transformation and validation
///
/// A failing pipe returns the error the exception filter renders.
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn transform(&self, input: Self::Input) -> PipeResult<Self::Output>;
}
