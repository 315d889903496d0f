//! HTTPS transports built from certificate material known only at runtime.
//!
//! This crate turns raw PEM bytes - a CA bundle, a client certificate and its
//! key - into a ready-to-use HTTP transport with the matching TLS policy. The
//! bytes usually come from external configuration, for example a secret store
//! or a named configuration resource.
//!
//! ## Features
//!
//! - Custom trust roots that replace the platform roots
//! - Mutual TLS with a client certificate
//! - Server name override for SNI and certificate verification
//! - CA bundles looked up from named configuration resources
//! - The platform default transport when no material is supplied
//!
//! ## Example
//!
//! ```ignore
//! use ca_transport::{empty_body, transport_for};
//!
//! let transport = transport_for(
//!     "api.internal",
//!     &std::fs::read("ca.pem")?,
//!     &std::fs::read("client.pem")?,
//!     &std::fs::read("client-key.pem")?,
//! )?;
//!
//! let request = http::Request::get("https://10.0.0.12:8443/healthz").body(empty_body())?;
//! let response = transport.request(request).await?;
//! ```
//!
//! ## CA from a configuration resource
//!
//! ```ignore
//! use ca_transport::{JsonDirSource, transport_for_named_ca};
//!
//! // reads /etc/config/openshift-config/trusted-ca.json
//! let source = JsonDirSource::new("/etc/config");
//! let transport = transport_for_named_ca(&source, "trusted-ca", "ca-bundle.crt")?;
//! ```
//!
//! An empty resource name selects the default transport.
//!
//! ## Errors
//!
//! Malformed material is reported as [`TransportError::InvalidInput`] with a
//! fixed message. Certificate and key contents never appear in errors or
//! logs.

mod builder;
mod error;
pub mod instrument;
mod resolver;
pub mod source;
pub mod tls;
pub mod transport;

pub use builder::{
    CERT_KEY_PAIRING_ERROR, CertificateMaterial, build_transport, build_transport_with,
};
pub use error::TransportError;
pub use instrument::{DebugLayer, Instrumented, debug_wrappers};
pub use resolver::{CONFIG_NAMESPACE, resolve_ca_from_named_resource};
pub use source::{ConfigResource, ConfigSource, InMemorySource, JsonDirSource, SourceError};
pub use tls::{ClientIdentity, TlsPolicy, TrustBundle};
pub use transport::{
    RequestBody, Transport, TransportSettings, empty_body, full_body, streaming_body,
};

/// Build an instrumented transport for the given CA and client certificate
/// data, any of which may be empty.
///
/// This is [`build_transport`] followed by [`debug_wrappers`].
pub fn transport_for(
    server_name: &str,
    ca: &[u8],
    cert: &[u8],
    key: &[u8],
) -> Result<Instrumented<Transport>, TransportError> {
    let transport = build_transport(server_name, ca, cert, key)?;
    Ok(debug_wrappers(transport))
}

/// Build an instrumented transport trusting the CA data stored at `key` in
/// the configuration resource `resource_name`.
///
/// An empty `resource_name` yields the same transport as
/// `transport_for("", &[], &[], &[])`. No client certificate or server name
/// override is ever applied.
pub fn transport_for_named_ca<S>(
    source: &S,
    resource_name: &str,
    key: &str,
) -> Result<Instrumented<Transport>, TransportError>
where
    S: ConfigSource + ?Sized,
{
    if resource_name.is_empty() {
        return transport_for("", &[], &[], &[]);
    }

    let ca = resolve_ca_from_named_resource(source, resource_name, key)?;
    transport_for("", &ca, &[], &[])
}
