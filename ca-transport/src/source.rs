//! Named configuration resources.
//!
//! A [`ConfigSource`] looks up a resource by namespace and name. The resource
//! carries two key-value mappings, one textual and one binary, in the shape of
//! a Kubernetes ConfigMap:
//!
//! ```json
//! {
//!   "data": { "ca.crt": "-----BEGIN CERTIFICATE-----\n..." },
//!   "binaryData": { "ca.der": "MIIB..." }
//! }
//! ```
//!
//! Two sources ship with the crate:
//!
//! - [`InMemorySource`] - resources held in a map
//! - [`JsonDirSource`] - one JSON file per resource under a root directory

mod dir;
mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use dir::JsonDirSource;
pub use memory::InMemorySource;

/// Lookup of a named configuration resource.
///
/// Implementations may block; the caller imposes no deadline.
pub trait ConfigSource {
    /// Fetch the resource `name` in `namespace`.
    fn get(&self, namespace: &str, name: &str) -> Result<ConfigResource, SourceError>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for &S {
    fn get(&self, namespace: &str, name: &str) -> Result<ConfigResource, SourceError> {
        (**self).get(namespace, name)
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn get(&self, namespace: &str, name: &str) -> Result<ConfigResource, SourceError> {
        (**self).get(namespace, name)
    }
}

/// A resource with a textual and a binary key-value mapping.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResource {
    /// UTF-8 values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    /// Arbitrary bytes, base64 encoded on the wire.
    #[serde(
        rename = "binaryData",
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "base64_map"
    )]
    pub binary_data: BTreeMap<String, Vec<u8>>,
}

impl ConfigResource {
    /// Create an empty resource.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a textual entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Add a binary entry.
    pub fn with_binary_data(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.binary_data.insert(key.into(), value.into());
        self
    }

    /// Textual value at `key`, as bytes. Empty when absent.
    pub fn text_bytes(&self, key: &str) -> &[u8] {
        self.data.get(key).map(|v| v.as_bytes()).unwrap_or_default()
    }

    /// Binary value at `key`. Empty when absent.
    pub fn binary_bytes(&self, key: &str) -> &[u8] {
        self.binary_data.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

// Values may be secrets; only the keys are printed.
impl std::fmt::Debug for ConfigResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResource")
            .field("data", &self.data.keys().collect::<Vec<_>>())
            .field("binary_data", &self.binary_data.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Failure to fetch a resource from a [`ConfigSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No resource with this name exists in the namespace.
    #[error("config map {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    /// The namespace or name cannot address a resource.
    #[error("invalid config map reference {namespace}/{name}")]
    InvalidName { namespace: String, name: String },

    /// The backing store could not be read.
    #[error("reading config map {namespace}/{name}: {source}")]
    Io {
        namespace: String,
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored resource is not a valid config map document.
    #[error("decoding config map {namespace}/{name}: {source}")]
    Decode {
        namespace: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

mod base64_map {
    use std::collections::BTreeMap;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(map: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(k, v)| (k, STANDARD.encode(v))))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(k, v)| {
                STANDARD
                    .decode(v.as_bytes())
                    .map(|bytes| (k.clone(), bytes))
                    .map_err(|e| D::Error::custom(format!("binaryData key {k}: {e}")))
            })
            .collect()
    }
}
