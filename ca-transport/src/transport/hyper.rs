//! Hyper-based HTTP transport.
//!
//! [`Transport`] wraps hyper_util's legacy client together with the TLS
//! policy it was built with.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;
use tower_service::Service;

use super::body::RequestBody;
use super::connector::{build_https_connector, default_tls_config};
use super::settings::TransportSettings;
use crate::TransportError;
use crate::tls::TlsPolicy;

/// Type alias for the hyper client with HTTPS connector.
type HyperClient = Client<HttpsConnector<HttpConnector>, RequestBody>;

static PLATFORM_DEFAULT: OnceLock<Transport> = OnceLock::new();

/// An HTTP/1.1 and HTTP/2 client connection layer with TLS and pooling.
///
/// A transport either carries a [`TlsPolicy`] built from caller-supplied
/// certificate material, or none, in which case it verifies servers against
/// the platform roots and presents no client certificate.
///
/// Clones share the connection pool.
#[derive(Clone)]
pub struct Transport {
    client: HyperClient,
    tls: Option<Arc<TlsPolicy>>,
    settings: TransportSettings,
    platform_default: bool,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("tls", &self.tls)
            .field("settings", &self.settings)
            .field("platform_default", &self.platform_default)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// The process-wide default transport.
    ///
    /// Built on first use from [`TransportSettings::default`]; every call
    /// returns a handle to the same connection pool.
    ///
    /// Pooled connections are driven by the tokio runtime that dialed them.
    /// A connection opened on a runtime that has since shut down (a
    /// `#[tokio::test]` runtime, for example) stays in the pool until it
    /// fails; callers that create short-lived runtimes should build their
    /// own transport with [`Transport::uncustomized`] instead.
    pub fn platform_default() -> Result<Self, TransportError> {
        if let Some(transport) = PLATFORM_DEFAULT.get() {
            return Ok(transport.clone());
        }

        let mut transport = Self::uncustomized(TransportSettings::default())?;
        transport.platform_default = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("built platform default transport");

        Ok(PLATFORM_DEFAULT.get_or_init(|| transport).clone())
    }

    /// A fresh transport with default TLS and the given settings.
    pub fn uncustomized(settings: TransportSettings) -> Result<Self, TransportError> {
        let client = build_client(&settings, default_tls_config()?, "")?;
        Ok(Self {
            client,
            tls: None,
            settings,
            platform_default: false,
        })
    }

    /// A fresh transport enforcing `policy`.
    pub(crate) fn with_policy(
        settings: TransportSettings,
        policy: TlsPolicy,
    ) -> Result<Self, TransportError> {
        let config = ClientConfig::clone(policy.client_config());
        let client = build_client(&settings, config, policy.server_name())?;
        Ok(Self {
            client,
            tls: Some(Arc::new(policy)),
            settings,
            platform_default: false,
        })
    }

    /// True when no custom TLS material was applied.
    pub fn is_default(&self) -> bool {
        self.tls.is_none()
    }

    /// True for handles of [`Transport::platform_default`].
    pub fn is_platform_default(&self) -> bool {
        self.platform_default
    }

    /// The TLS policy of a customized transport.
    pub fn tls_policy(&self) -> Option<&TlsPolicy> {
        self.tls.as_deref()
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Send an HTTP request and receive a response.
    pub async fn request(
        &self,
        request: http::Request<RequestBody>,
    ) -> Result<http::Response<Incoming>, TransportError> {
        self.client
            .request(request)
            .await
            .map_err(|e| TransportError::Request(format!("{e:?}")))
    }
}

fn build_client(
    settings: &TransportSettings,
    tls_config: ClientConfig,
    server_name: &str,
) -> Result<HyperClient, TransportError> {
    let https_connector = build_https_connector(tls_config, server_name, settings)?;

    let mut builder = Client::builder(TokioExecutor::new());

    // Configure connection pool timer (required for pool_idle_timeout to work)
    builder.pool_timer(TokioTimer::new());
    builder.pool_idle_timeout(settings.get_pool_idle_timeout());
    builder.pool_max_idle_per_host(settings.get_pool_max_idle_per_host());

    if settings.is_http2_only() {
        builder.http2_only(true);
    }

    Ok(builder.build(https_connector))
}

impl Service<http::Request<RequestBody>> for Transport {
    type Response = http::Response<Incoming>;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // hyper_util legacy::Client is always ready
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<RequestBody>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move {
            client
                .request(req)
                .await
                .map_err(|e| TransportError::Request(format!("{e:?}")))
        })
    }
}

#[cfg(all(
    test,
    any(feature = "tls-ring", feature = "tls-aws-lc"),
    any(feature = "tls-native-roots", feature = "tls-webpki-roots")
))]
mod tests {
    use super::*;

    #[test]
    fn test_platform_default_is_shared() {
        let first = Transport::platform_default().unwrap();
        let second = Transport::platform_default().unwrap();
        assert!(first.is_default());
        assert!(first.is_platform_default());
        assert!(second.is_platform_default());
        assert!(first.tls_policy().is_none());
        assert_eq!(first.settings(), &TransportSettings::default());
    }

    #[test]
    fn test_uncustomized_transport_keeps_settings() {
        let settings = TransportSettings::new().http2_only(true);
        let transport = Transport::uncustomized(settings.clone()).unwrap();
        assert!(transport.is_default());
        assert!(!transport.is_platform_default());
        assert_eq!(transport.settings(), &settings);
    }

    #[tokio::test]
    async fn test_request_to_closed_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = Transport::uncustomized(TransportSettings::default()).unwrap();
        let request = http::Request::get(format!("http://{addr}/"))
            .body(crate::empty_body())
            .unwrap();
        let err = transport.request(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
