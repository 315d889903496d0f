//! Error types for transport construction and use.
//!
//! None of the variants ever carry certificate or key bytes. Messages for
//! malformed material are fixed strings so that a failing call can be logged
//! without leaking secrets.

use crate::source::SourceError;

/// Failure to build a transport or to issue a request through one.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Caller-supplied material is malformed or inconsistent.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The configuration source could not produce the named resource.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The resource exists but holds no data at the requested key.
    #[error("config map {namespace}/{name} has no ca data at key {key}")]
    MissingKey {
        namespace: String,
        name: String,
        key: String,
    },

    /// The TLS stack could not produce a client configuration.
    #[error("tls error: {0}")]
    Tls(String),

    /// An HTTP request issued through the transport failed.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Returns true for malformed or inconsistent caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TransportError::InvalidInput(_))
    }

    /// Returns true when the named resource does not exist.
    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, TransportError::Source(SourceError::NotFound { .. }))
    }

    /// Returns true when the resource exists but lacks the requested key.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, TransportError::MissingKey { .. })
    }
}

impl From<rustls::Error> for TransportError {
    fn from(err: rustls::Error) -> Self {
        TransportError::Tls(err.to_string())
    }
}
