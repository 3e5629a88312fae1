//! Per-collection read contracts and the registry serving them.

pub mod builtin;
pub mod spec;

use std::sync::Arc;

pub use spec::{
    CollectionSpec, CollectionSpecBuilder, DetailKey, MediaRule, MediaTarget, ModeSpec,
    SearchKind, SearchParam, SizePolicy,
};

#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: Vec<Arc<CollectionSpec>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants, publications, news, and collaborators.
    pub fn builtin() -> Self {
        Self::new()
            .with(builtin::grants())
            .with(builtin::publications())
            .with(builtin::news())
            .with(builtin::collaborators())
    }

    pub fn with(mut self, spec: CollectionSpec) -> Self {
        self.collections.push(Arc::new(spec));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<CollectionSpec>> {
        self.collections
            .iter()
            .find(|spec| spec.name == name)
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CollectionSpec>> {
        self.collections.iter()
    }
}
