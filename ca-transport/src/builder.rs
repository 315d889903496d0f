//! Turning raw certificate material into a transport.

use crate::tls::{ClientIdentity, TlsPolicy, TrustBundle};
use crate::transport::{Transport, TransportSettings, build_tls_config, crypto_provider};
use crate::TransportError;

/// Returned when only one half of a client identity is supplied.
pub const CERT_KEY_PAIRING_ERROR: &str = "cert and key data must be specified together";

/// Raw inputs of [`build_transport`]. Every field may be empty.
#[derive(Clone, Copy, Default)]
pub struct CertificateMaterial<'a> {
    /// Name for SNI and server verification, independent of the dialed address.
    pub server_name: &'a str,
    /// PEM bundle of trusted CAs.
    pub ca: &'a [u8],
    /// PEM client certificate chain, leaf first.
    pub cert: &'a [u8],
    /// PEM private key of the client certificate.
    pub key: &'a [u8],
}

impl<'a> CertificateMaterial<'a> {
    pub fn new(server_name: &'a str, ca: &'a [u8], cert: &'a [u8], key: &'a [u8]) -> Self {
        Self {
            server_name,
            ca,
            cert,
            key,
        }
    }

    /// True when no CA, certificate or key data is present.
    ///
    /// The server name alone does not count as material.
    pub fn is_empty(&self) -> bool {
        self.ca.is_empty() && self.cert.is_empty() && self.key.is_empty()
    }

    fn check_pairing(&self) -> Result<(), TransportError> {
        if self.cert.is_empty() != self.key.is_empty() {
            return Err(TransportError::InvalidInput(CERT_KEY_PAIRING_ERROR));
        }
        Ok(())
    }
}

// Lengths only; the material may be secret.
impl std::fmt::Debug for CertificateMaterial<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("server_name", &self.server_name)
            .field("ca_len", &self.ca.len())
            .field("cert_len", &self.cert.len())
            .field("key_len", &self.key.len())
            .finish()
    }
}

/// Build a transport from raw certificate material with default settings.
///
/// See [`build_transport_with`].
pub fn build_transport(
    server_name: &str,
    ca: &[u8],
    cert: &[u8],
    key: &[u8],
) -> Result<Transport, TransportError> {
    build_transport_with(
        &TransportSettings::default(),
        &CertificateMaterial::new(server_name, ca, cert, key),
    )
}

/// Build a transport from raw certificate material.
///
/// - No CA, certificate or key data: the uncustomized transport is returned.
///   With default settings that is [`Transport::platform_default`] itself.
/// - Certificate without key or key without certificate: `InvalidInput`.
/// - CA data replaces the platform roots and must hold at least one usable
///   certificate.
/// - Certificate and key must form a matched pair; it becomes the only
///   client certificate.
/// - A non-empty server name overrides the request host for SNI and
///   certificate verification. It must be a DNS name or an IP address,
///   otherwise `InvalidInput` is returned. It is ignored when no CA,
///   certificate or key data is given.
///
/// Nothing falls back to defaults once material was supplied: any failure
/// returns an error and no transport.
pub fn build_transport_with(
    settings: &TransportSettings,
    material: &CertificateMaterial<'_>,
) -> Result<Transport, TransportError> {
    if material.is_empty() {
        if *settings == TransportSettings::default() {
            return Transport::platform_default();
        }
        return Transport::uncustomized(settings.clone());
    }

    material.check_pairing()?;

    let provider = crypto_provider()?;

    let trust_bundle = if material.ca.is_empty() {
        None
    } else {
        Some(TrustBundle::from_pem(material.ca)?)
    };

    let identity = if material.cert.is_empty() {
        None
    } else {
        Some(ClientIdentity::from_pem(material.cert, material.key, &provider)?)
    };

    let config = build_tls_config(&provider, trust_bundle.as_ref(), identity.as_ref())?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        server_name = material.server_name,
        has_ca = trust_bundle.is_some(),
        has_client_cert = identity.is_some(),
        "building transport with custom tls material"
    );

    let policy = TlsPolicy::new(
        material.server_name.to_owned(),
        trust_bundle,
        identity.into_iter().collect(),
        config,
    );
    Transport::with_policy(settings.clone(), policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_is_empty_ignores_server_name() {
        assert!(CertificateMaterial::new("example.internal", b"", b"", b"").is_empty());
        assert!(!CertificateMaterial::new("", b"ca", b"", b"").is_empty());
        assert!(!CertificateMaterial::new("", b"", b"", b"key").is_empty());
    }

    #[test]
    fn test_material_debug_prints_lengths_only() {
        let material = CertificateMaterial::new("", b"", b"CERT-BYTES", b"SECRET-KEY");
        let printed = format!("{material:?}");
        assert!(printed.contains("cert_len: 10"));
        assert!(!printed.contains("SECRET"));
    }

    #[test]
    fn test_cert_without_key_is_rejected() {
        let err = build_transport("", b"", b"cert", b"").unwrap_err();
        assert_eq!(err.to_string(), CERT_KEY_PAIRING_ERROR);
    }

    #[test]
    fn test_key_without_cert_is_rejected() {
        let err = build_transport("", b"", b"", b"key").unwrap_err();
        assert_eq!(err.to_string(), CERT_KEY_PAIRING_ERROR);
    }

    #[test]
    fn test_pairing_is_checked_before_ca_data() {
        let err = build_transport("", b"not pem", b"cert", b"").unwrap_err();
        assert_eq!(err.to_string(), CERT_KEY_PAIRING_ERROR);
    }

    #[cfg(any(feature = "tls-ring", feature = "tls-aws-lc"))]
    #[test]
    fn test_unparseable_ca_is_rejected() {
        let err = build_transport("", b"not pem", b"", b"").unwrap_err();
        assert_eq!(err.to_string(), crate::tls::CA_DATA_ERROR);
    }

    #[cfg(any(feature = "tls-ring", feature = "tls-aws-lc"))]
    #[test]
    fn test_server_name_must_be_dns_name_or_ip() {
        let rcgen::CertifiedKey { cert, .. } =
            rcgen::generate_simple_self_signed(vec!["ca.internal".to_string()]).unwrap();
        let ca = cert.pem();

        let err = build_transport("not a hostname", ca.as_bytes(), b"", b"").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), crate::transport::SERVER_NAME_ERROR);

        for name in ["ca.internal", "192.0.2.10"] {
            let transport = build_transport(name, ca.as_bytes(), b"", b"").unwrap();
            assert_eq!(transport.tls_policy().unwrap().server_name(), name);
        }
    }

    #[cfg(all(
        any(feature = "tls-ring", feature = "tls-aws-lc"),
        any(feature = "tls-native-roots", feature = "tls-webpki-roots")
    ))]
    #[test]
    fn test_all_empty_returns_platform_default() {
        let transport = build_transport("", b"", b"", b"").unwrap();
        assert!(transport.is_default());
        assert!(transport.is_platform_default());

        // server name alone customizes nothing
        let transport = build_transport("example.internal", b"", b"", b"").unwrap();
        assert!(transport.is_platform_default());
    }

    #[cfg(all(
        any(feature = "tls-ring", feature = "tls-aws-lc"),
        any(feature = "tls-native-roots", feature = "tls-webpki-roots")
    ))]
    #[test]
    fn test_all_empty_with_custom_settings_is_uncustomized() {
        let settings = TransportSettings::new().pool_max_idle_per_host(1);
        let transport = build_transport_with(&settings, &CertificateMaterial::default()).unwrap();
        assert!(transport.is_default());
        assert!(!transport.is_platform_default());
        assert_eq!(transport.settings(), &settings);
    }
}
