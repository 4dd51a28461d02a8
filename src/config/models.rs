//! Model catalog and capability lookups

use serde::{Deserialize, Serialize};

/// Context limit used when a model is unknown or has no explicit limit
pub const DEFAULT_CONTEXT_LIMIT_TOKENS: usize = 6000;

/// Provider binding used when a model does not name one
pub const DEFAULT_PROVIDER: &str = "default";

/// One `[[models]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,

    /// Provider binding that serves this model
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Token budget for one request
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,

    /// Accepts image parts
    #[serde(default)]
    pub multimodal: bool,

    /// Preferred for web-search generations
    #[serde(default)]
    pub web_search: bool,

    /// Preferred for screen-vision generations
    #[serde(default)]
    pub vision: bool,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_context_limit() -> usize {
    DEFAULT_CONTEXT_LIMIT_TOKENS
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: default_provider(),
            context_limit: DEFAULT_CONTEXT_LIMIT_TOKENS,
            multimodal: false,
            web_search: false,
            vision: false,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    pub fn multimodal(mut self) -> Self {
        self.multimodal = true;
        self
    }

    pub fn web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    /// Dedicated vision model (implies multimodal)
    pub fn vision(mut self) -> Self {
        self.vision = true;
        self.multimodal = true;
        self
    }
}

/// Cached model capability lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn get(&self, name: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Token budget for `name`, falling back to the default limit
    pub fn context_limit(&self, name: &str) -> usize {
        match self.get(name) {
            Some(model) => model.context_limit,
            None => {
                tracing::warn!(model = %name, "Model not in catalog, using default context limit");
                DEFAULT_CONTEXT_LIMIT_TOKENS
            }
        }
    }

    pub fn is_multimodal(&self, name: &str) -> bool {
        self.get(name).is_some_and(|m| m.multimodal)
    }

    /// Provider binding for `name`, or the default provider for unknown models
    pub fn provider_for(&self, name: &str) -> &str {
        self.get(name)
            .map(|m| m.provider.as_str())
            .unwrap_or(DEFAULT_PROVIDER)
    }

    /// Pick a model for web-search generations.
    ///
    /// Order: the current model if it is web-capable, the first web-capable
    /// model, the current model, then any model.
    pub fn select_web_model(&self, current: &str) -> Option<String> {
        if self.get(current).is_some_and(|m| m.web_search) {
            return Some(current.to_string());
        }
        if let Some(model) = self.models.iter().find(|m| m.web_search) {
            tracing::info!(model = %model.name, current = %current, "Auto-selecting web search model");
            return Some(model.name.clone());
        }
        if self.contains(current) {
            tracing::warn!(model = %current, "No dedicated web search model, using current model");
            return Some(current.to_string());
        }
        self.models.first().map(|m| m.name.clone())
    }

    /// Pick a model for screen-vision generations.
    ///
    /// Order: the current model if it is a vision model, the current model if it
    /// is multimodal, the first vision model, the first multimodal model, then
    /// any model.
    pub fn select_vision_model(&self, current: &str) -> Option<String> {
        if let Some(model) = self.get(current) {
            if model.vision || model.multimodal {
                return Some(current.to_string());
            }
        }
        if let Some(model) = self.models.iter().find(|m| m.vision) {
            tracing::info!(model = %model.name, current = %current, "Auto-selecting vision model");
            return Some(model.name.clone());
        }
        if let Some(model) = self.models.iter().find(|m| m.multimodal) {
            return Some(model.name.clone());
        }
        self.models.first().map(|m| m.name.clone())
    }
}

/// Models shipped in a fresh config
pub fn default_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("llama-3.3-70b-versatile").with_provider("groq"),
        ModelInfo::new("meta-llama/llama-4-scout-17b-16e-instruct")
            .with_provider("groq")
            .with_context_limit(30000)
            .vision(),
        ModelInfo::new("compound-beta")
            .with_provider("groq")
            .with_context_limit(70000)
            .web_search(),
    ]
}
