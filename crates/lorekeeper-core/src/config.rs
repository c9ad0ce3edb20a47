use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::DetailLayout;

/// Top-level configuration for Lorekeeper.
///
/// Loaded from `~/.lorekeeper/config.toml` by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LorekeeperConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Reference API sources, scanned in declaration order.
    #[serde(default = "default_sources")]
    pub sources: Vec<ApiSourceConfig>,
}

impl Default for LorekeeperConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            chat: ChatConfig::default(),
            http: HttpConfig::default(),
            sources: default_sources(),
        }
    }
}

impl LorekeeperConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LorekeeperConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the history database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.lorekeeper/data".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Names listed per search before the "...and N more." summary.
    pub list_limit: usize,
    /// Key of the persisted history blob.
    pub history_key: String,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            list_limit: 5,
            history_key: "dnd_chat_history".to_string(),
            max_message_length: 2000,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. `0` disables the timeout.
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 0,
            user_agent: format!("lorekeeper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A named reference API: base address, path per category, keyword per category.
///
/// Keyword and endpoint order is significant: keywords are matched in the
/// order they are declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSourceConfig {
    pub name: String,
    /// Human-readable name used in bot messages ("D&D 5e").
    #[serde(default)]
    pub display_name: String,
    pub base_url: String,
    /// Category name -> path suffix (e.g. `spells = "/spells"`).
    pub endpoints: IndexMap<String, String>,
    /// Keyword -> category name.
    #[serde(default)]
    pub keywords: IndexMap<String, String>,
    /// Category name -> detail layout. Missing entries are inferred from the category name.
    #[serde(default)]
    pub layouts: IndexMap<String, DetailLayout>,
}

impl ApiSourceConfig {
    /// Name shown to the user, falling back to the source name.
    pub fn label(&self) -> &str {
        let display = self.display_name.trim();
        if display.is_empty() {
            self.name.trim()
        } else {
            display
        }
    }

    /// The D&D 5e SRD API source.
    pub fn dnd5e() -> Self {
        let endpoints = [
            ("spells", "/spells"),
            ("monsters", "/monsters"),
            ("classes", "/classes"),
            ("races", "/races"),
            ("equipment", "/equipment"),
            ("magic-items", "/magic-items"),
            ("skills", "/skills"),
            ("features", "/features"),
            ("traits", "/traits"),
            ("conditions", "/conditions"),
            ("damage-types", "/damage-types"),
            ("magic-schools", "/magic-schools"),
            ("rules", "/rules"),
            ("ability-scores", "/ability-scores"),
        ];
        let keywords = [
            ("spell", "spells"),
            ("monster", "monsters"),
            ("creature", "monsters"),
            ("class", "classes"),
            ("race", "races"),
            ("equipment", "equipment"),
            ("item", "equipment"),
            ("magic", "magic-items"),
            ("skill", "skills"),
            ("feature", "features"),
            ("trait", "traits"),
            ("condition", "conditions"),
            ("damage", "damage-types"),
            ("school", "magic-schools"),
            ("rule", "rules"),
            ("ability", "ability-scores"),
            ("str", "ability-scores"),
            ("dex", "ability-scores"),
            ("con", "ability-scores"),
            ("int", "ability-scores"),
            ("wis", "ability-scores"),
            ("cha", "ability-scores"),
        ];

        Self {
            name: "dnd5e".to_string(),
            display_name: "D&D 5e".to_string(),
            base_url: "https://www.dnd5eapi.co/api".to_string(),
            endpoints: endpoints
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            keywords: keywords
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            layouts: IndexMap::new(),
        }
    }
}

fn default_sources() -> Vec<ApiSourceConfig> {
    vec![ApiSourceConfig::dnd5e()]
}
