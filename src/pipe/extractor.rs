use crate::exception::ValidationFault;
use crate::pipe::{Pipe, Validate, ValidationPipe};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// JSON body extractor that also runs [`Validate`]
///
/// Deserialization and validation failures both reject with a [`ValidationFault`], so
/// the client receives a `web.badRequest` envelope listing every message.
///
/// # Example
/// ```
/// use keystone::common::ApiResponse;
/// use keystone::exception::BindingResult;
/// use keystone::pipe::{ValidJson, Validate};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Rename {
///     name: String,
/// }
///
/// impl Validate for Rename {
///     fn validate(&self, result: &mut BindingResult) {
///         result.reject_if(self.name.is_empty(), "name", "名称不能为空");
///     }
/// }
///
/// async fn rename(ValidJson(body): ValidJson<Rename>) -> ApiResponse<String> {
///     ApiResponse::ok(body.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Rejection = ValidationFault;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        let value = ValidationPipe::new().transform(value).await?;
        Ok(ValidJson(value))
    }
}

/// Query-string extractor that also runs [`Validate`]
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send + 'static,
{
    type Rejection = ValidationFault;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        let value = ValidationPipe::new().transform(value).await?;
        Ok(ValidQuery(value))
    }
}

/// Wraps any axum extractor so its rejection becomes a [`ValidationFault`]
///
/// Without it a malformed path segment or form body is answered by axum itself, with a
/// 4xx status and a plain-text body.
///
/// ```
/// use axum::extract::Path;
/// use keystone::common::ApiResponse;
/// use keystone::pipe::Bound;
///
/// async fn find(Bound(Path(id)): Bound<Path<u64>>) -> ApiResponse<u64> {
///     ApiResponse::ok(id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Bound<E>(pub E);

impl<S, E> FromRequest<S> for Bound<E>
where
    S: Send + Sync,
    E: FromRequest<S>,
    E::Rejection: Into<ValidationFault>,
{
    type Rejection = ValidationFault;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        E::from_request(req, state).await.map(Bound).map_err(Into::into)
    }
}

impl<S, E> FromRequestParts<S> for Bound<E>
where
    S: Send + Sync,
    E: FromRequestParts<S>,
    E::Rejection: Into<ValidationFault>,
{
    type Rejection = ValidationFault;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        E::from_request_parts(parts, state).await.map(Bound).map_err(Into::into)
    }
}

impl<T> std::ops::Deref for ValidJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Deref for ValidQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
