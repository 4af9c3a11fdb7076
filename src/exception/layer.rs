use crate::exception::{ArgumentsHost, BoxError, Exception, ExceptionFilter, WebExceptionHandler};
use axum::{body::Body, http::Request, response::Response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

tokio::task_local! {
    /// Filter and request line of the bridge currently running this task.
    static ACTIVE_FILTER: ActiveFilter;
}

#[derive(Clone)]
struct ActiveFilter {
    filter: Arc<dyn ExceptionFilter>,
    host: ArgumentsHost,
}

/// Map `exception` with the filter of the enclosing bridge, or with the
/// [`WebExceptionHandler`] when no bridge is mounted.
///
/// Handler return values and filter-stage errors both end up here, so a custom filter
/// sees every failure of the request.
pub fn dispatch(exception: Exception) -> Response {
    match ACTIVE_FILTER.try_with(|active| active.clone()) {
        Ok(active) => active.filter.catch(exception, Some(&active.host)),
        Err(_) => WebExceptionHandler.catch(exception, None),
    }
}

/// Tower layer that forwards every error escaping the wrapped filters to an
/// [`ExceptionFilter`].
///
/// Apply it last so that it is the outermost layer and covers the whole filter chain.
/// The wrapped service may fail with any error; the layered service never does, which
/// is what lets guard and interceptor stacks be mounted on an axum `Router`.
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use keystone::exception::ExceptionFilterLayer;
/// use keystone::guard::SharedGuardLayer;
/// use tower::ServiceBuilder;
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "hello" }))
///     .layer(
///         ServiceBuilder::new()
///             .layer(ExceptionFilterLayer::new())
///             .layer(SharedGuardLayer::new(vec![])),
///     );
/// ```
#[derive(Clone)]
pub struct ExceptionFilterLayer {
    filter: Arc<dyn ExceptionFilter>,
}

impl ExceptionFilterLayer {
    /// Forward to the [`WebExceptionHandler`].
    pub fn new() -> Self {
        Self::with_filter(WebExceptionHandler)
    }

    pub fn with_filter(filter: impl ExceptionFilter) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    pub fn from_shared(filter: Arc<dyn ExceptionFilter>) -> Self {
        Self { filter }
    }
}

impl Default for ExceptionFilterLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for ExceptionFilterLayer {
    type Service = ExceptionFilterMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionFilterMiddleware {
            inner,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionFilterMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for ExceptionFilterMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness errors of the inner service surface in `call` through `oneshot`.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = self.filter.clone();
        let inner = self.inner.clone();
        let host = ArgumentsHost::from_request(&request);

        let active = ActiveFilter {
            filter: filter.clone(),
            host: host.clone(),
        };

        Box::pin(async move {
            match ACTIVE_FILTER.scope(active, inner.oneshot(request)).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    let exception = Exception::classify(error.into());
                    Ok(filter.catch(exception, Some(&host)))
                }
            }
        })
    }
}
