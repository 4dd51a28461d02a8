//! Provider binding lookup by catalog provider name

use std::collections::HashMap;
use std::sync::Arc;

use super::LlmProvider;

/// Maps provider names from the model catalog to provider implementations.
///
/// Unknown names fall back to the default provider.
#[derive(Clone)]
pub struct ProviderRouter {
    default: Arc<dyn LlmProvider>,
    bindings: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderRouter {
    pub fn new(default: Arc<dyn LlmProvider>) -> Self {
        Self {
            default,
            bindings: HashMap::new(),
        }
    }

    /// Bind `provider` to the catalog name `name`
    pub fn with_binding(mut self, name: impl Into<String>, provider: Arc<dyn LlmProvider>) -> Self {
        self.bindings.insert(name.into(), provider);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn LlmProvider>) {
        self.bindings.insert(name.into(), provider);
    }

    pub fn resolve(&self, name: &str) -> Arc<dyn LlmProvider> {
        match self.bindings.get(name) {
            Some(provider) => Arc::clone(provider),
            None => {
                tracing::debug!(provider = %name, "No binding, using default provider");
                Arc::clone(&self.default)
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.bindings.keys().map(|k| k.as_str()).collect()
    }
}
