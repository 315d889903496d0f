//! TLS material parsed from runtime-supplied PEM bytes.
//!
//! - [`TrustBundle`]: the CAs a transport trusts instead of the platform roots
//! - [`ClientIdentity`]: the certificate and key presented for mutual TLS
//! - [`TlsPolicy`]: what a customized [`Transport`](crate::Transport) was built with
//!
//! Parse failures map to fixed [`TransportError::InvalidInput`] messages so
//! that nothing read from the input ends up in an error or a log line.

use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, RootCertStore};

use crate::TransportError;

/// Returned when a CA bundle yields no usable certificate.
pub const CA_DATA_ERROR: &str = "error loading cert pool from ca data";

/// Returned when a certificate and key do not form a usable pair.
pub const KEY_PAIR_ERROR: &str = "error loading x509 keypair from cert and key data";

/// An immutable set of trusted certificate authorities.
#[derive(Clone)]
pub struct TrustBundle {
    store: Arc<RootCertStore>,
}

impl TrustBundle {
    /// Parse a PEM bundle.
    ///
    /// Non-certificate PEM sections are skipped, as are malformed sections
    /// and certificates that cannot be used as trust anchors. At least one
    /// usable certificate is required.
    pub fn from_pem(pem: &[u8]) -> Result<Self, TransportError> {
        let mut certs = Vec::new();
        for item in rustls_pemfile::certs(&mut &pem[..]) {
            match item {
                Ok(cert) => certs.push(cert),
                // the reader is already past the bad section
                Err(_) => continue,
            }
        }

        let mut store = RootCertStore::empty();
        let (added, ignored) = store.add_parsable_certificates(certs);
        if added == 0 {
            return Err(TransportError::InvalidInput(CA_DATA_ERROR));
        }

        #[cfg(feature = "tracing")]
        if ignored > 0 {
            tracing::debug!(added, ignored, "ignored unusable certificates in ca data");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = ignored;

        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Number of trust anchors in the bundle.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn root_store(&self) -> &RootCertStore {
        &self.store
    }

    pub(crate) fn shared_store(&self) -> Arc<RootCertStore> {
        Arc::clone(&self.store)
    }
}

impl std::fmt::Debug for TrustBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustBundle")
            .field("anchors", &self.store.len())
            .finish()
    }
}

/// A certificate chain and the private key matching its leaf.
pub struct ClientIdentity {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    /// Parse a PEM certificate chain (leaf first) and a PEM private key.
    ///
    /// The key is loaded through `provider` and must match the public key of
    /// the leaf certificate.
    pub fn from_pem(
        cert_pem: &[u8],
        key_pem: &[u8],
        provider: &CryptoProvider,
    ) -> Result<Self, TransportError> {
        let invalid = || TransportError::InvalidInput(KEY_PAIR_ERROR);

        let cert_chain = rustls_pemfile::certs(&mut &cert_pem[..])
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        if cert_chain.is_empty() {
            return Err(invalid());
        }

        let key = rustls_pemfile::private_key(&mut &key_pem[..])
            .map_err(|_| invalid())?
            .ok_or_else(invalid)?;

        let signing_key = provider
            .key_provider
            .load_private_key(key.clone_key())
            .map_err(|_| invalid())?;

        // Unknown means the provider cannot expose the public key; the
        // handshake still fails later if the pair is inconsistent.
        match CertifiedKey::new(cert_chain.clone(), signing_key).keys_match() {
            Ok(()) | Err(rustls::Error::InconsistentKeys(rustls::InconsistentKeys::Unknown)) => {}
            Err(_) => return Err(invalid()),
        }

        Ok(Self { cert_chain, key })
    }

    /// The leaf certificate.
    pub fn certificate(&self) -> &CertificateDer<'static> {
        &self.cert_chain[0]
    }

    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            cert_chain: self.cert_chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}

/// TLS client policy attached to a customized transport.
#[derive(Clone)]
pub struct TlsPolicy {
    server_name: String,
    trust_bundle: Option<TrustBundle>,
    client_certificates: Vec<ClientIdentity>,
    config: Arc<ClientConfig>,
}

impl TlsPolicy {
    pub(crate) fn new(
        server_name: String,
        trust_bundle: Option<TrustBundle>,
        client_certificates: Vec<ClientIdentity>,
        config: ClientConfig,
    ) -> Self {
        Self {
            server_name,
            trust_bundle,
            client_certificates,
            config: Arc::new(config),
        }
    }

    /// Name used for SNI and server certificate verification.
    ///
    /// Empty means the host of each request URI is used.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Trusted roots replacing the platform defaults, if any were supplied.
    pub fn trust_bundle(&self) -> Option<&TrustBundle> {
        self.trust_bundle.as_ref()
    }

    /// Identities presented when the server requests a client certificate.
    pub fn client_certificates(&self) -> &[ClientIdentity] {
        &self.client_certificates
    }

    /// The rustls configuration the transport's connector was built with.
    pub fn client_config(&self) -> &Arc<ClientConfig> {
        &self.config
    }
}

impl std::fmt::Debug for TlsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsPolicy")
            .field("server_name", &self.server_name)
            .field("trust_bundle", &self.trust_bundle)
            .field("client_certificates", &self.client_certificates.len())
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, any(feature = "tls-ring", feature = "tls-aws-lc")))]
mod tests {
    use super::*;
    use crate::transport::crypto_provider;

    struct Pair {
        cert: rcgen::Certificate,
        signing_key: rcgen::KeyPair,
    }

    fn self_signed(name: &str) -> Pair {
        let rcgen::CertifiedKey { cert, signing_key } =
            rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap();
        Pair { cert, signing_key }
    }

    #[test]
    fn test_trust_bundle_counts_every_certificate() {
        let a = self_signed("a.internal");
        let b = self_signed("b.internal");
        let pem = format!("{}{}", a.cert.pem(), b.cert.pem());

        let bundle = TrustBundle::from_pem(pem.as_bytes()).unwrap();
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_trust_bundle_skips_non_certificate_sections() {
        let ca = self_signed("ca.internal");
        let pem = format!("{}{}", ca.signing_key.serialize_pem(), ca.cert.pem());

        let bundle = TrustBundle::from_pem(pem.as_bytes()).unwrap();
        assert_eq!(bundle.len(), 1);
    }

    #[test]
    fn test_trust_bundle_accepts_partially_usable_bundle() {
        let ca = self_signed("ca.internal");
        let garbage = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";
        let pem = format!("{garbage}{}", ca.cert.pem());

        let bundle = TrustBundle::from_pem(pem.as_bytes()).unwrap();
        assert_eq!(bundle.len(), 1);
    }

    const UNDECODABLE: &str =
        "-----BEGIN CERTIFICATE-----\n!!!not base64!!!\n-----END CERTIFICATE-----\n";

    #[test]
    fn test_trust_bundle_ignores_malformed_section_in_any_position() {
        let ca = self_signed("ca.internal");
        let before = format!("{UNDECODABLE}{}", ca.cert.pem());
        let after = format!("{}{UNDECODABLE}", ca.cert.pem());

        for pem in [before, after] {
            let bundle = TrustBundle::from_pem(pem.as_bytes()).unwrap();
            assert_eq!(bundle.len(), 1);
        }
    }

    #[test]
    fn test_trust_bundle_keeps_certificates_on_both_sides_of_malformed_section() {
        let a = self_signed("a.internal");
        let b = self_signed("b.internal");
        let pem = format!("{}{UNDECODABLE}{}", a.cert.pem(), b.cert.pem());

        let bundle = TrustBundle::from_pem(pem.as_bytes()).unwrap();
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_trust_bundle_rejects_unusable_input() {
        let garbage = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";
        for input in [
            &b"not pem at all"[..],
            garbage.as_bytes(),
            UNDECODABLE.as_bytes(),
            &b""[..],
        ] {
            let err = TrustBundle::from_pem(input).unwrap_err();
            assert_eq!(err.to_string(), CA_DATA_ERROR);
        }
    }

    #[test]
    fn test_client_identity_from_matching_pair() {
        let provider = crypto_provider().unwrap();
        let pair = self_signed("client.internal");

        let identity = ClientIdentity::from_pem(
            pair.cert.pem().as_bytes(),
            pair.signing_key.serialize_pem().as_bytes(),
            &provider,
        )
        .unwrap();

        assert_eq!(identity.cert_chain().len(), 1);
        assert_eq!(identity.certificate().as_ref(), pair.cert.der().as_ref());
        assert_eq!(
            identity.private_key().secret_der(),
            pair.signing_key.serialize_der().as_slice()
        );
    }

    #[test]
    fn test_client_identity_rejects_mismatched_key() {
        let provider = crypto_provider().unwrap();
        let pair = self_signed("client.internal");
        let other = self_signed("other.internal");

        let err = ClientIdentity::from_pem(
            pair.cert.pem().as_bytes(),
            other.signing_key.serialize_pem().as_bytes(),
            &provider,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), KEY_PAIR_ERROR);
    }

    #[test]
    fn test_client_identity_rejects_malformed_pem() {
        let provider = crypto_provider().unwrap();
        let pair = self_signed("client.internal");
        let key_pem = pair.signing_key.serialize_pem();

        // certificate where the key should be, and vice versa
        let swapped =
            ClientIdentity::from_pem(key_pem.as_bytes(), pair.cert.pem().as_bytes(), &provider);
        assert!(swapped.unwrap_err().is_invalid_input());

        let truncated = &key_pem.as_bytes()[..key_pem.len() / 2];
        let err =
            ClientIdentity::from_pem(pair.cert.pem().as_bytes(), truncated, &provider).unwrap_err();
        assert_eq!(err.to_string(), KEY_PAIR_ERROR);
    }

    #[test]
    fn test_debug_output_hides_key_material() {
        let provider = crypto_provider().unwrap();
        let pair = self_signed("client.internal");
        let identity = ClientIdentity::from_pem(
            pair.cert.pem().as_bytes(),
            pair.signing_key.serialize_pem().as_bytes(),
            &provider,
        )
        .unwrap();

        let printed = format!("{identity:?}");
        assert!(printed.contains("chain_len: 1"));
        assert!(!printed.contains("PRIVATE"));
    }
}
