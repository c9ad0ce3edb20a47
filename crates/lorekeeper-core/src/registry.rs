//! Category registry: validated API sources and their keyword tables.
//!
//! A registry is built once from configuration and grows only by whole,
//! validated sources. Nothing is ever removed or edited in place.

use indexmap::IndexMap;
use tracing::info;

use crate::config::ApiSourceConfig;
use crate::error::{LorekeeperError, Result};
use crate::types::DetailLayout;

/// A validated API source.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSource {
    name: String,
    label: String,
    base_url: String,
    endpoints: IndexMap<String, String>,
    keywords: IndexMap<String, String>,
    layouts: IndexMap<String, DetailLayout>,
}

impl ApiSource {
    /// Validate a source configuration.
    ///
    /// Keywords are lowercased. Every keyword and layout must target a
    /// declared endpoint.
    pub fn from_config(config: ApiSourceConfig) -> Result<Self> {
        let name = config.name.trim().to_string();
        if name.is_empty() {
            return Err(LorekeeperError::Registry("source name is empty".to_string()));
        }

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LorekeeperError::Registry(format!(
                "source '{}' has invalid base URL '{}'",
                name, config.base_url
            )));
        }

        if config.endpoints.is_empty() {
            return Err(LorekeeperError::Registry(format!(
                "source '{}' declares no endpoints",
                name
            )));
        }
        for (category, path) in &config.endpoints {
            if category.trim().is_empty() {
                return Err(LorekeeperError::Registry(format!(
                    "source '{}' has an endpoint with an empty category name",
                    name
                )));
            }
            if !path.starts_with('/') {
                return Err(LorekeeperError::Registry(format!(
                    "endpoint '{}' of source '{}' must start with '/': '{}'",
                    category, name, path
                )));
            }
        }

        let label = config.label().to_string();

        let mut keywords = IndexMap::with_capacity(config.keywords.len());
        for (keyword, category) in config.keywords {
            let keyword = keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(LorekeeperError::Registry(format!(
                    "source '{}' has an empty keyword",
                    name
                )));
            }
            if !config.endpoints.contains_key(&category) {
                return Err(LorekeeperError::Registry(format!(
                    "keyword '{}' of source '{}' targets unknown category '{}'",
                    keyword, name, category
                )));
            }
            // First declaration wins if two spellings collapse to the same keyword.
            keywords.entry(keyword).or_insert(category);
        }

        for category in config.layouts.keys() {
            if !config.endpoints.contains_key(category) {
                return Err(LorekeeperError::Registry(format!(
                    "layout for unknown category '{}' in source '{}'",
                    category, name
                )));
            }
        }

        Ok(Self {
            name,
            label,
            base_url,
            endpoints: config.endpoints,
            keywords,
            layouts: config.layouts,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable name for bot messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Category names in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(|k| k.as_str())
    }

    /// Keyword -> category pairs in declaration order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keywords.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL of a category's collection endpoint.
    pub fn collection_url(&self, category: &str) -> Option<String> {
        self.endpoints
            .get(category)
            .map(|path| format!("{}{}", self.base_url, path))
    }

    /// URL of a single item in a category.
    pub fn item_url(&self, category: &str, index: &str) -> Option<String> {
        self.collection_url(category)
            .map(|url| format!("{}/{}", url, index))
    }

    pub fn layout(&self, category: &str) -> DetailLayout {
        self.layouts
            .get(category)
            .copied()
            .unwrap_or_else(|| DetailLayout::infer(category))
    }
}

/// Ordered set of registered API sources.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    sources: Vec<ApiSource>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from source configs, in order.
    pub fn from_configs(configs: impl IntoIterator<Item = ApiSourceConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// Validate and append a source. Source names must be unique.
    pub fn register(&mut self, config: ApiSourceConfig) -> Result<&ApiSource> {
        let source = ApiSource::from_config(config)?;
        if self.get(source.name()).is_some() {
            return Err(LorekeeperError::Registry(format!(
                "source '{}' is already registered",
                source.name()
            )));
        }
        info!(
            source = source.name(),
            categories = source.endpoints.len(),
            keywords = source.keywords.len(),
            "API source registered"
        );
        self.sources.push(source);
        Ok(&self.sources[self.sources.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&ApiSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    pub fn sources(&self) -> &[ApiSource] {
        &self.sources
    }

    /// Every registered category, sources and categories in registration order.
    pub fn categories(&self) -> Vec<String> {
        self.sources
            .iter()
            .flat_map(|s| s.categories().map(str::to_string))
            .collect()
    }

    /// The keyword table: `(source, keyword, category)` in match order.
    pub fn keyword_table(&self) -> impl Iterator<Item = (&ApiSource, &str, &str)> {
        self.sources
            .iter()
            .flat_map(|s| s.keywords().map(move |(k, c)| (s, k, c)))
    }
}
