//! CA data stored in a named configuration resource.

use crate::TransportError;
use crate::source::ConfigSource;

/// Namespace holding the configuration resources that CA references point at.
pub const CONFIG_NAMESPACE: &str = "openshift-config";

/// Fetch the CA bytes stored at `key` in the resource `resource_name`.
///
/// The resource is looked up in [`CONFIG_NAMESPACE`]. The textual mapping is
/// tried first and the binary mapping second. Lookup errors are returned
/// unchanged; a key that is absent or empty in both mappings is a
/// [`TransportError::MissingKey`].
pub fn resolve_ca_from_named_resource<S>(
    source: &S,
    resource_name: &str,
    key: &str,
) -> Result<Vec<u8>, TransportError>
where
    S: ConfigSource + ?Sized,
{
    let resource = source.get(CONFIG_NAMESPACE, resource_name)?;

    let mut ca = resource.text_bytes(key);
    if ca.is_empty() {
        ca = resource.binary_bytes(key);
    }
    if ca.is_empty() {
        return Err(TransportError::MissingKey {
            namespace: CONFIG_NAMESPACE.to_owned(),
            name: resource_name.to_owned(),
            key: key.to_owned(),
        });
    }

    Ok(ca.to_vec())
}
