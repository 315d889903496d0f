//! Debug instrumentation around a transport.
//!
//! [`debug_wrappers`] is applied by the public entry points to every
//! transport they return. With the `tracing` feature each request runs in a
//! `http_request` span and its outcome is logged at debug level. Header
//! values and bodies are never logged. Without the feature the wrapper
//! forwards requests unchanged.

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::{Layer, ServiceExt};
use tower_service::Service;

use crate::{RequestBody, Transport, TransportError};

/// Wrap `transport` in request-level debug logging.
pub fn debug_wrappers(transport: Transport) -> Instrumented<Transport> {
    DebugLayer.layer(transport)
}

/// Layer producing [`Instrumented`] services.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugLayer;

impl<S> Layer<S> for DebugLayer {
    type Service = Instrumented<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Instrumented { inner }
    }
}

/// A service that logs each request it forwards.
#[derive(Clone, Debug)]
pub struct Instrumented<S> {
    inner: S,
}

impl<S> Instrumented<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B> Instrumented<S>
where
    S: Service<http::Request<RequestBody>, Response = http::Response<B>, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    B: 'static,
{
    /// Send an HTTP request through the wrapped service.
    pub async fn request(
        &self,
        request: http::Request<RequestBody>,
    ) -> Result<http::Response<B>, TransportError> {
        self.clone().oneshot(request).await
    }
}

impl<S, B> Service<http::Request<RequestBody>> for Instrumented<S>
where
    S: Service<http::Request<RequestBody>, Response = http::Response<B>, Error = TransportError>,
    S::Future: Send + 'static,
    B: 'static,
{
    type Response = http::Response<B>;
    type Error = TransportError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<RequestBody>) -> Self::Future {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri(),
        );
        #[cfg(feature = "tracing")]
        let started = std::time::Instant::now();

        let response: BoxFuture<'static, Result<Self::Response, Self::Error>> =
            Box::pin(self.inner.call(req));
        let fut = async move {
            let result = response.await;
            #[cfg(feature = "tracing")]
            match &result {
                Ok(response) => tracing::debug!(
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "response received"
                ),
                Err(e) => tracing::debug!(
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request failed"
                ),
            }
            result
        };

        #[cfg(feature = "tracing")]
        let fut = tracing::Instrument::instrument(fut, span);

        Box::pin(fut)
    }
}
