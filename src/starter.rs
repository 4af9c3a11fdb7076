//! Router wiring
//!
//! [`WebStarter`] mounts the guard chain, the interceptor chain and the exception filter
//! on an axum [`Router`] in the one order that makes every failure come back as an
//! [`ApiResponse`](crate::common::ApiResponse) envelope.

use crate::config::{ConfigService, WebProperties};
use crate::error::Result;
use crate::exception::{
    ExceptionFilter, ExceptionFilterLayer, WebExceptionHandler, set_internal_view_message,
};
use crate::guard::{Guard, SharedGuardLayer};
use crate::interceptor::{Interceptor, SharedInterceptorLayer};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

/// Builder for the request pipeline of a keystone application
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use keystone::common::ApiResponse;
/// use keystone::interceptor::LoggingInterceptor;
/// use keystone::starter::WebStarter;
///
/// async fn ping() -> ApiResponse<&'static str> {
///     ApiResponse::ok("pong")
/// }
///
/// let app: Router = WebStarter::new()
///     .interceptor(LoggingInterceptor)
///     .apply(Router::new().route("/ping", get(ping)));
/// ```
pub struct WebStarter {
    properties: WebProperties,
    interceptors: Vec<Box<dyn Interceptor>>,
    guards: Vec<Box<dyn Guard>>,
    filter: Arc<dyn ExceptionFilter>,
}

impl Default for WebStarter {
    fn default() -> Self {
        Self::new()
    }
}

impl WebStarter {
    pub fn new() -> Self {
        Self {
            properties: WebProperties::default(),
            interceptors: Vec::new(),
            guards: Vec::new(),
            filter: Arc::new(WebExceptionHandler),
        }
    }

    /// Start from the `keystone.web.*` entries of `config`.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self::new().properties(WebProperties::from_config(config)?))
    }

    pub fn properties(mut self, properties: WebProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Append an interceptor; the first one registered runs outermost.
    pub fn interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    /// Append a guard; guards run in registration order before any interceptor.
    pub fn guard(mut self, guard: impl Guard) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Replace the [`WebExceptionHandler`] with a custom filter.
    ///
    /// The filter maps faults returned by handlers as well as those raised by guards and
    /// interceptors.
    pub fn exception_filter(mut self, filter: impl ExceptionFilter) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Layer `router` with exception filter, guards and interceptors, outermost first.
    ///
    /// With `keystone.web.enabled=false` the router is returned untouched.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if !set_internal_view_message(self.properties.internal_view_message) {
            tracing::debug!("internal view message policy already installed");
        }

        if !self.properties.enabled {
            if !self.guards.is_empty() || !self.interceptors.is_empty() {
                tracing::warn!(
                    guards = self.guards.len(),
                    interceptors = self.interceptors.len(),
                    "web exception handling disabled; guards and interceptors are not mounted"
                );
            }
            return router;
        }

        tracing::info!(
            guards = self.guards.len(),
            interceptors = self.interceptors.len(),
            "mounting web exception handling"
        );

        router.layer(
            ServiceBuilder::new()
                .layer(ExceptionFilterLayer::from_shared(self.filter))
                .layer(SharedGuardLayer::new(self.guards))
                .layer(SharedInterceptorLayer::new(self.interceptors)),
        )
    }
}
