use crate::error::{FriendlyError, codes};
use crate::pipe::{Pipe, PipeResult};
use crate::view::json::{INVALID_JSON, json_deserialize_as};
use async_trait::async_trait;
use axum::{body::Bytes, http::StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use validator::Validate;

/// A pipe that parses a request body into `T`
pub struct JsonPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for JsonPipe<T> {
    fn default() -> Self {
        Self { _marker: PhantomData }
    }
}

#[async_trait]
impl<T> Pipe for JsonPipe<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Input = Bytes;
    type Output = T;

    async fn transform(&self, input: Bytes) -> PipeResult<T> {
        let raw = std::str::from_utf8(&input).map_err(|e| {
            FriendlyError::new(StatusCode::BAD_REQUEST, codes::INVALID_JSON, INVALID_JSON)
                .with_debug(e.to_string())
        })?;
        json_deserialize_as(raw)
    }
}

/// A pipe that runs the validation rules declared on `T`
pub struct ValidationPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ValidationPipe<T> {
    fn default() -> Self {
        Self { _marker: PhantomData }
    }
}

#[async_trait]
impl<T> Pipe for ValidationPipe<T>
where
    T: Validate + Send + 'static,
{
    type Input = T;
    type Output = T;

    async fn transform(&self, input: T) -> PipeResult<T> {
        input.validate()?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HttpError, WebError};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Order {
        #[validate(length(min = 1))]
        mids: Vec<u32>,
    }

    #[tokio::test]
    async fn test_json_pipe() {
        let order: Order = JsonPipe::<Order>::default()
            .transform(Bytes::from_static(b"{\"mids\": [3]}"))
            .await
            .unwrap();
        assert_eq!(order.mids, vec![3]);

        let error = JsonPipe::<Order>::default()
            .transform(Bytes::from_static(b"{\"mids\": "))
            .await
            .unwrap_err();
        assert!(matches!(error, WebError::Friendly(ref e) if e.code() == 1001));

        let error = JsonPipe::<Order>::default()
            .transform(Bytes::from_static(&[0xff, 0xfe]))
            .await
            .unwrap_err();
        assert!(matches!(error, WebError::Friendly(ref e) if e.code() == 1001));
    }

    #[tokio::test]
    async fn test_validation_pipe() {
        let pipe = ValidationPipe::default();
        assert!(pipe.transform(Order { mids: vec![1] }).await.is_ok());

        let error = pipe.transform(Order { mids: vec![] }).await.unwrap_err();
        let WebError::Invalid(errors) = error else {
            panic!("expected a multi-error, got {error:?}");
        };
        assert!(errors.field_errors().contains_key("mids"));
    }
}
