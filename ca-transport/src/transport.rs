//! HTTP transport layer.
//!
//! This module provides the [`Transport`] type, which handles HTTP communication
//! using hyper_util's legacy client. It supports:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls, including custom roots and client certificates
//! - Connection pooling
//! - Tower service integration for middleware
//!
//! # Feature Flags
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Roots used when no CA data is supplied

mod body;
mod connector;
mod hyper;
mod settings;

pub use body::{BoxError, RequestBody, empty_body, full_body, streaming_body};
pub use connector::{
    SERVER_NAME_ERROR, crypto_provider, default_root_store, default_tls_config, has_tls_support,
};
pub use self::hyper::Transport;
pub use settings::{TransportSettings, defaults};

pub(crate) use connector::build_tls_config;

// Re-export rustls types that users might need for TLS inspection
pub use rustls::ClientConfig as TlsClientConfig;
