//! Source provider registry

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::services::SourceProvider;
use crate::domain::value_objects::SourceKind;

/// Resolves a source kind to the provider that gates it
#[derive(Default, Clone)]
pub struct SourceProviderRegistry {
    providers: HashMap<SourceKind, Arc<dyn SourceProvider>>,
}

impl SourceProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own kind, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn SourceProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn SourceProvider>> {
        self.providers.get(&kind).cloned()
    }
}
