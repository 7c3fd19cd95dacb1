use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use std::ops::Deref;
use validator::Validate;

use crate::error::WebError;
use crate::pipe::{JsonPipe, Pipe, ValidationPipe};
use crate::view::{ViewRequest, request_body_limit};

/// Extractor for a JSON body that passed its validation rules.
///
/// Bad JSON is a friendly 400, rule violations are the validation library's
/// multi-error. The body limit comes from the request's
/// [`Settings`](crate::config::Settings), see
/// [`request_body_limit`](crate::view::request_body_limit).
///
/// ```rust,no_run
/// use st1_axum::pipe::ValidJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct SignUp {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn sign_up(ValidJson(form): ValidJson<SignUp>) -> String {
///     form.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T> Deref for ValidJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Rejection = WebError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let limit = request_body_limit(&req);
        let request = ViewRequest::buffer(req, limit).await?;
        let value = JsonPipe::<T>::default().transform(request.body().clone()).await?;
        let value = ValidationPipe::<T>::default().transform(value).await?;
        Ok(ValidJson(value))
    }
}
