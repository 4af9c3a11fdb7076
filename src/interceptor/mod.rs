use crate::exception::BoxError;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;

mod layer;
mod logging;

pub use layer::{InterceptorMiddleware, SharedInterceptorLayer};
pub use logging::LoggingInterceptor;

/// standard return type for Interceptors
pub type InterceptorResult = Result<Response, InterceptorError>;

/// A type-erased error for interceptors
///
/// Returning a [`Fault`](crate::exception::Fault) (boxed) lets the exception filter layer
/// map it like a fault raised by a handler.
pub type InterceptorError = BoxError;

type NextFn =
    Box<dyn FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>> + Send>;

/// Represents the next handler in the chain
pub struct Next {
    pub(crate) run: NextFn,
}

impl Next {
    /// Create a new Next handler
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>>
            + Send
            + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Execute the next handler
    pub async fn run(self, request: Request<Body>) -> InterceptorResult {
        (self.run)(request).await
    }
}

/// The Interceptor trait
///
/// Interceptors run before routing reaches a handler. They can inspect or rewrite the
/// request, short-circuit it by returning an error, and inspect the response on the way
/// back.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use axum::{body::Body, http::Request};
/// use keystone::exception::Fault;
/// use keystone::interceptor::{Interceptor, InterceptorResult, Next};
///
/// struct TenantInterceptor;
///
/// #[async_trait]
/// impl Interceptor for TenantInterceptor {
///     async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
///         if !request.headers().contains_key("x-tenant") {
///             return Err(Box::new(Fault::business("missing tenant header")));
///         }
///         next.run(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult;
}
