//! Route identity layer.
//!
//! Attach to a route to name its endpoint `"<controller>.<action>"`:
//!
//! ```ignore
//! Router::new().route("/users/{id}", get(show).layer(endpoint("users.show")))
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::timing::RequestContext;

pub fn endpoint(name: &str) -> EndpointLayer {
    EndpointLayer::new(name)
}

/// Layer that records the endpoint name in the request context.
#[derive(Debug, Clone)]
pub struct EndpointLayer {
    endpoint: Arc<str>,
}

impl EndpointLayer {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: Arc::from(endpoint),
        }
    }
}

impl<S> Layer<S> for EndpointLayer {
    type Service = EndpointService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EndpointService {
            inner,
            endpoint: self.endpoint.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointService<S> {
    inner: S,
    endpoint: Arc<str>,
}

impl<S, B> Service<Request<B>> for EndpointService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if let Some(ctx) = req.extensions().get::<RequestContext>() {
            ctx.set_endpoint(&*self.endpoint);
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    #[tokio::test]
    async fn sets_endpoint_on_context() {
        let ctx = RequestContext::new();
        let svc = endpoint("users.index")
            .layer(service_fn(|_req: Request<Body>| async { Ok::<_, Infallible>(()) }));

        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ctx.clone());
        svc.oneshot(req).await.unwrap();

        assert_eq!(ctx.endpoint().as_deref(), Some("users.index"));
    }

    #[tokio::test]
    async fn without_context_passes_through() {
        let svc = endpoint("users.index")
            .layer(service_fn(|_req: Request<Body>| async { Ok::<_, Infallible>(7) }));
        assert_eq!(svc.oneshot(Request::new(Body::empty())).await.unwrap(), 7);
    }
}
