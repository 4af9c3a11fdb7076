use crate::exception::BoxError;
use crate::interceptor::{Interceptor, Next};
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for invoking a chain of Interceptors
///
/// The first interceptor in the list is the outermost one.
#[derive(Clone)]
pub struct SharedInterceptorLayer {
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
}

impl SharedInterceptorLayer {
    pub fn new(interceptors: Vec<Box<dyn Interceptor>>) -> Self {
        Self {
            interceptors: Arc::new(interceptors),
        }
    }
}

impl<S> Layer<S> for SharedInterceptorLayer {
    type Service = InterceptorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorMiddleware {
            inner,
            interceptors: self.interceptors.clone(),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorMiddleware<S> {
    inner: S,
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
}

impl<S> Service<Request<Body>> for InterceptorMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let interceptors = self.interceptors.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            // Innermost link: the wrapped service.
            let mut chain = Next::new(move |req| {
                Box::pin(async move { inner.call(req).await.map_err(Into::into) })
            });

            // Wrap from the back so interceptors[0] runs first.
            for i in (0..interceptors.len()).rev() {
                let interceptors = interceptors.clone();
                let next = chain;

                chain = Next::new(move |req| {
                    Box::pin(async move { interceptors[i].intercept(req, next).await })
                });
            }

            chain.run(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::Fault;
    use crate::interceptor::InterceptorResult;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::sync::Mutex;
    use tower::{ServiceExt, service_fn};

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Interceptor for Recorder {
        async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
            self.seen.lock().unwrap().push(self.name);
            next.run(request).await
        }
    }

    struct Reject;

    #[async_trait]
    impl Interceptor for Reject {
        async fn intercept(&self, _request: Request<Body>, _next: Next) -> InterceptorResult {
            Err(Box::new(Fault::business("rejected early")))
        }
    }

    /// Succeeds only when this very instance was polled ready first.
    #[derive(Default)]
    struct ReadyTracked {
        ready: bool,
    }

    impl Clone for ReadyTracked {
        fn clone(&self) -> Self {
            Self::default()
        }
    }

    impl Service<Request<Body>> for ReadyTracked {
        type Response = Response;
        type Error = BoxError;
        type Future = std::future::Ready<Result<Response, BoxError>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            self.ready = true;
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: Request<Body>) -> Self::Future {
            std::future::ready(if std::mem::take(&mut self.ready) {
                Ok(Response::new(Body::empty()))
            } else {
                Err("called before poll_ready".into())
            })
        }
    }

    async fn echo_header(req: Request<Body>) -> Result<Response, BoxError> {
        let mut response = Response::new(Body::empty());
        if let Some(value) = req.headers().get("x-trace") {
            response.headers_mut().insert("x-trace", value.clone());
        }
        Ok(response)
    }

    struct Stamp;

    #[async_trait]
    impl Interceptor for Stamp {
        async fn intercept(&self, mut request: Request<Body>, next: Next) -> InterceptorResult {
            request
                .headers_mut()
                .insert("x-trace", HeaderValue::from_static("abc"));
            next.run(request).await
        }
    }

    #[tokio::test]
    async fn test_runs_in_declaration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let layer = SharedInterceptorLayer::new(vec![
            Box::new(Recorder { name: "first", seen: seen.clone() }) as Box<dyn Interceptor>,
            Box::new(Recorder { name: "second", seen: seen.clone() }),
            Box::new(Stamp),
        ]);

        let response = layer
            .layer(service_fn(echo_header))
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(response.headers()["x-trace"], "abc");
    }

    #[tokio::test]
    async fn test_short_circuit_error_escapes_chain() {
        let layer = SharedInterceptorLayer::new(vec![Box::new(Reject) as Box<dyn Interceptor>]);
        let err = layer
            .layer(service_fn(echo_header))
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Fault>().unwrap().message(), "rejected early");
    }

    #[tokio::test]
    async fn test_calls_the_instance_polled_ready() {
        let layer = SharedInterceptorLayer::new(vec![]);
        let response = layer
            .layer(ReadyTracked::default())
            .oneshot(Request::builder().body(Body::empty()).unwrap())
            .await;
        assert!(response.is_ok());
    }
}
