use ahash::AHashMap;

use crate::{error::SchemaError, node::NodeId};

/// Schema resources keyed by their absolute base URI.
///
/// Filled while documents are loaded and read-only during validation.
#[derive(Debug, Default, Clone)]
pub(crate) struct Registry {
    resources: AHashMap<String, NodeId>,
}

impl Registry {
    /// Register a resource.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateResource`] when `uri` is already taken.
    pub(crate) fn insert(&mut self, uri: String, id: NodeId) -> Result<(), SchemaError> {
        if self.resources.contains_key(&uri) {
            tracing::debug!(uri, "Duplicate schema resource");
            return Err(SchemaError::DuplicateResource { uri });
        }
        tracing::trace!(uri, "Registered schema resource");
        self.resources.insert(uri, id);
        Ok(())
    }

    pub(crate) fn get(&self, uri: &str) -> Option<NodeId> {
        self.resources.get(uri).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.resources.len()
    }

    /// Merge another document's resources into this registry.
    ///
    /// Nothing is merged when any URI collides.
    pub(crate) fn merge(&mut self, other: Registry) -> Result<(), SchemaError> {
        if let Some(uri) = other
            .resources
            .keys()
            .find(|uri| self.resources.contains_key(*uri))
        {
            tracing::debug!(uri, "Colliding schema resource across documents");
            return Err(SchemaError::DuplicateResource { uri: uri.clone() });
        }
        self.resources.extend(other.resources);
        Ok(())
    }
}
