//! Keyword query dispatcher.
//!
//! Maps free-text input to an [`Intent`]: which category to query, what to
//! search for, and whether the user asked for a single item's details.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use lorekeeper_core::config::ApiSourceConfig;
use lorekeeper_core::registry::{ApiSource, CategoryRegistry};
use lorekeeper_core::types::Intent;

use crate::error::ChatError;

// =============================================================================
// Detail markers
// =============================================================================

/// Phrases that turn a list search into a detail lookup.
pub static DETAIL_MARKERS: &[&str] = &["tell me about", "details about", "info about", "describe"];

static DETAIL_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alts: Vec<String> = DETAIL_MARKERS.iter().map(|m| regex::escape(m)).collect();
    Regex::new(&format!("(?i){}", alts.join("|"))).unwrap()
});

/// Query sent by the ability shortcut. The trailing keyword makes the
/// `ability` entry match before the short score abbreviations.
pub fn ability_query(name: &str) -> String {
    format!("tell me about {} ability", name.trim())
}

// =============================================================================
// QueryDispatcher
// =============================================================================

/// A keyword with its removal pattern, compiled once at registration.
#[derive(Debug, Clone)]
struct KeywordRule {
    source: String,
    keyword: String,
    category: String,
    /// Keyword plus an optional plural `s`, case-insensitive.
    strip: Regex,
}

impl KeywordRule {
    fn compile(source: &ApiSource, keyword: &str, category: &str) -> Result<Self, ChatError> {
        let strip = Regex::new(&format!("(?i){}s?", regex::escape(keyword)))
            .map_err(|e| ChatError::Registry(format!("bad keyword '{}': {}", keyword, e)))?;
        Ok(Self {
            source: source.name().to_string(),
            keyword: keyword.to_string(),
            category: category.to_string(),
            strip,
        })
    }
}

/// First-match keyword dispatcher over a [`CategoryRegistry`].
///
/// Keywords are tried in registration order and the first one found as a
/// substring of the lowercased input wins. Two keywords present in the same
/// input never compete on length or position.
#[derive(Debug, Clone)]
pub struct QueryDispatcher {
    registry: CategoryRegistry,
    rules: Vec<KeywordRule>,
}

impl QueryDispatcher {
    /// Build a dispatcher over an already validated registry.
    pub fn new(registry: CategoryRegistry) -> Result<Self, ChatError> {
        let rules = registry
            .keyword_table()
            .map(|(source, keyword, category)| KeywordRule::compile(source, keyword, category))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { registry, rules })
    }

    /// Build a dispatcher straight from source configs.
    pub fn from_configs(
        configs: impl IntoIterator<Item = ApiSourceConfig>,
    ) -> Result<Self, ChatError> {
        Self::new(CategoryRegistry::from_configs(configs)?)
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Register another API source. Its keywords rank after every existing one.
    pub fn register_source(&mut self, config: ApiSourceConfig) -> Result<(), ChatError> {
        let source = self.registry.register(config)?;
        let rules = source
            .keywords()
            .map(|(keyword, category)| KeywordRule::compile(source, keyword, category))
            .collect::<Result<Vec<_>, _>>()?;
        self.rules.extend(rules);
        Ok(())
    }

    /// Decide what to do with a piece of user input. Pure; never fails.
    pub fn interpret(&self, raw_text: &str) -> Intent {
        let lower = raw_text.to_lowercase();
        let wants_details = DETAIL_MARKERS.iter().any(|m| lower.contains(m));

        let Some(rule) = self.rules.iter().find(|r| lower.contains(&r.keyword)) else {
            debug!(input = raw_text, "No keyword matched");
            return Intent::Fallback {
                categories: self.registry.categories(),
            };
        };

        let without_keyword = rule.strip.replace(raw_text, "");
        let search_term = DETAIL_MARKER_RE
            .replace_all(without_keyword.trim(), "")
            .trim()
            .to_string();

        debug!(
            keyword = %rule.keyword,
            category = %rule.category,
            search_term = %search_term,
            wants_details,
            "Keyword matched"
        );

        if wants_details && !search_term.is_empty() {
            Intent::DetailFetch {
                source: rule.source.clone(),
                category: rule.category.clone(),
                search_term,
            }
        } else {
            Intent::ListSearch {
                source: rule.source.clone(),
                category: rule.category.clone(),
                search_term,
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
