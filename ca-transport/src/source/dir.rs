use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ConfigResource, ConfigSource, SourceError};

/// Resources stored as `<root>/<namespace>/<name>.json` in ConfigMap JSON shape.
///
/// Each lookup reads the file again, so edits are picked up without a reload.
#[derive(Clone, Debug)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str, name: &str) -> Result<PathBuf, SourceError> {
        if !is_plain_segment(namespace) || !is_plain_segment(name) {
            return Err(SourceError::InvalidName {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            });
        }
        Ok(self.root.join(namespace).join(format!("{name}.json")))
    }
}

// A single path component that cannot escape the root.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

impl ConfigSource for JsonDirSource {
    fn get(&self, namespace: &str, name: &str) -> Result<ConfigResource, SourceError> {
        let path = self.path_for(namespace, name)?;
        let contents = std::fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => SourceError::NotFound {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            },
            _ => SourceError::Io {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                source,
            },
        })?;

        serde_json::from_slice(&contents).map_err(|source| SourceError::Decode {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            source,
        })
    }
}
