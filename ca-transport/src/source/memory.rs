use std::collections::HashMap;

use super::{ConfigResource, ConfigSource, SourceError};

/// Resources held in memory, keyed by namespace and name.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    resources: HashMap<(String, String), ConfigResource>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `resource` under `namespace/name`, replacing any previous one.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        resource: ConfigResource,
    ) -> Option<ConfigResource> {
        self.resources.insert((namespace.into(), name.into()), resource)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_resource(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        resource: ConfigResource,
    ) -> Self {
        self.insert(namespace, name, resource);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ConfigSource for InMemorySource {
    fn get(&self, namespace: &str, name: &str) -> Result<ConfigResource, SourceError> {
        self.resources
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            })
    }
}
