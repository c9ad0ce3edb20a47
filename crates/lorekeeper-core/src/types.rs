use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Author of a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Typed by the person at the terminal.
    User,
    /// Produced by the assistant.
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Which category-specific fields a detail record is rendered with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLayout {
    /// Full name, first description paragraph, associated skills.
    Ability,
    /// Level, school, joined description.
    Spell,
    /// Type, hit points, first armor class value.
    Creature,
    /// Joined description when present, otherwise just the name.
    #[default]
    Generic,
}

impl DetailLayout {
    /// Layout used when a source does not declare one for `category`.
    pub fn infer(category: &str) -> Self {
        match category {
            "ability-scores" => DetailLayout::Ability,
            "spells" => DetailLayout::Spell,
            "monsters" => DetailLayout::Creature,
            _ => DetailLayout::Generic,
        }
    }
}

// =============================================================================
// Chat history
// =============================================================================

/// One message in the chat history.
///
/// Immutable once created. The serialized shape is
/// `{"sender": "user", "text": "...", "timestamp": "<ISO-8601>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
    pub timestamp: String,
}

impl ChatTurn {
    /// Create a turn stamped with the current UTC time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

// =============================================================================
// API data
// =============================================================================

/// One entry of a collection endpoint's `results` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Display name.
    pub name: String,
    /// Identifier slug used for the item-by-identifier endpoint.
    #[serde(default)]
    pub index: Option<String>,
}

/// Body of a collection endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CollectionResponse {
    pub results: Vec<ListItem>,
}

// =============================================================================
// Intent
// =============================================================================

/// What the dispatcher decided to do with a piece of user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// No keyword matched; carries every registered category for a help message.
    Fallback { categories: Vec<String> },
    /// Fetch a collection and filter it client-side. An empty term means "show a sample".
    ListSearch {
        source: String,
        category: String,
        search_term: String,
    },
    /// Resolve an exact item in a collection, then fetch it by identifier.
    DetailFetch {
        source: String,
        category: String,
        search_term: String,
    },
}

impl Intent {
    /// Category targeted by this intent, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            Intent::Fallback { .. } => None,
            Intent::ListSearch { category, .. } | Intent::DetailFetch { category, .. } => {
                Some(category)
            }
        }
    }
}
