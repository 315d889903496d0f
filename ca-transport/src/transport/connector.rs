//! TLS connector setup for the hyper client.
//!
//! # Feature Flags
//!
//! A transport needs a crypto provider, and root certificates for the cases
//! where no CA bundle is supplied:
//!
//! - **Crypto providers** (choose one):
//!   - `tls-ring` - Use ring crypto (default with `tls` feature)
//!   - `tls-aws-lc` - Use AWS LC crypto
//!
//! - **Root certificates** (choose one):
//!   - `tls-native-roots` - Use system root certificates (default with `tls` feature)
//!   - `tls-webpki-roots` - Use bundled Mozilla root certificates
//!
//! Without a provider feature the process-wide default installed through
//! `CryptoProvider::install_default()` is used.

use std::sync::{Arc, OnceLock};

use hyper_rustls::{FixedServerNameResolver, HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};

use super::TransportSettings;
use crate::TransportError;
use crate::tls::{ClientIdentity, TrustBundle};

/// Returned when a server name override is not a valid DNS name or IP address.
pub const SERVER_NAME_ERROR: &str = "invalid server name override";

/// Check if TLS features are properly configured.
///
/// Returns true if both a crypto provider AND root certificates are available.
#[inline]
pub const fn has_tls_support() -> bool {
    cfg!(any(feature = "tls-ring", feature = "tls-aws-lc"))
        && cfg!(any(
            feature = "tls-native-roots",
            feature = "tls-webpki-roots"
        ))
}

/// The crypto provider used for every transport.
///
/// Priority:
/// 1. Feature-gated provider (tls-ring or tls-aws-lc)
/// 2. User-installed global default provider
pub fn crypto_provider() -> Result<Arc<CryptoProvider>, TransportError> {
    #[cfg(feature = "tls-ring")]
    return Ok(Arc::new(rustls::crypto::ring::default_provider()));

    #[cfg(all(feature = "tls-aws-lc", not(feature = "tls-ring")))]
    return Ok(Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    #[cfg(not(any(feature = "tls-ring", feature = "tls-aws-lc")))]
    {
        CryptoProvider::get_default().cloned().ok_or_else(|| {
            TransportError::Tls(
                "no crypto provider: enable `tls-ring` or `tls-aws-lc`, \
                 or install one with `CryptoProvider::install_default()`"
                    .into(),
            )
        })
    }
}

/// Platform root certificates, loaded once per process.
pub fn default_root_store() -> Result<Arc<RootCertStore>, TransportError> {
    static ROOTS: OnceLock<Arc<RootCertStore>> = OnceLock::new();

    if let Some(roots) = ROOTS.get() {
        return Ok(Arc::clone(roots));
    }
    let roots = Arc::new(load_root_store()?);
    Ok(Arc::clone(ROOTS.get_or_init(|| roots)))
}

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
fn load_root_store() -> Result<RootCertStore, TransportError> {
    let mut roots = RootCertStore::empty();

    // Prefer native over webpki if both are enabled
    #[cfg(feature = "tls-native-roots")]
    {
        let native_certs = rustls_native_certs::load_native_certs();
        if !native_certs.errors.is_empty() {
            // Some certs may still have loaded
            #[cfg(feature = "tracing")]
            tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
        }
        roots.add_parsable_certificates(native_certs.certs);
    }

    #[cfg(all(feature = "tls-webpki-roots", not(feature = "tls-native-roots")))]
    {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    Ok(roots)
}

#[cfg(not(any(feature = "tls-native-roots", feature = "tls-webpki-roots")))]
fn load_root_store() -> Result<RootCertStore, TransportError> {
    Err(TransportError::Tls(
        "no root certificates: enable `tls-native-roots` or `tls-webpki-roots`, \
         or supply ca data"
            .into(),
    ))
}

/// Build a rustls client configuration.
///
/// `trust_bundle` replaces the platform roots when present; it is never
/// merged with them.
pub(crate) fn build_tls_config(
    provider: &Arc<CryptoProvider>,
    trust_bundle: Option<&TrustBundle>,
    identity: Option<&ClientIdentity>,
) -> Result<ClientConfig, TransportError> {
    let roots = match trust_bundle {
        Some(bundle) => bundle.shared_store(),
        None => default_root_store()?,
    };

    let builder = ClientConfig::builder_with_provider(Arc::clone(provider))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots);

    let config = match identity {
        Some(identity) => builder
            .with_client_auth_cert(identity.cert_chain().to_vec(), identity.private_key().clone_key())?,
        None => builder.with_no_client_auth(),
    };

    Ok(config)
}

/// The TLS configuration of an uncustomized transport.
pub fn default_tls_config() -> Result<ClientConfig, TransportError> {
    build_tls_config(&crypto_provider()?, None, None)
}

/// Build the plain TCP connector from transport settings.
pub(crate) fn build_http_connector(settings: &TransportSettings) -> HttpConnector {
    let mut connector = HttpConnector::new();
    connector.enforce_http(false);
    connector.set_nodelay(true);
    connector.set_connect_timeout(settings.get_connect_timeout());
    connector.set_keepalive(settings.get_tcp_keepalive());
    connector.set_happy_eyeballs_timeout(settings.get_happy_eyeballs_timeout());
    connector
}

/// Build an HTTPS connector with the given TLS configuration.
///
/// A non-empty `server_name` is used for SNI and certificate verification on
/// every connection, whatever host the request URI names.
pub(crate) fn build_https_connector(
    tls_config: ClientConfig,
    server_name: &str,
    settings: &TransportSettings,
) -> Result<HttpsConnector<HttpConnector>, TransportError> {
    let mut builder = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http();

    if !server_name.is_empty() {
        let name = ServerName::try_from(server_name)
            .map_err(|_| TransportError::InvalidInput(SERVER_NAME_ERROR))?
            .to_owned();
        builder = builder.with_server_name_resolver(FixedServerNameResolver::new(name));
    }

    Ok(builder
        .enable_all_versions()
        .wrap_connector(build_http_connector(settings)))
}
