//! Bot message formatting.
//!
//! Every function here is pure and returns the bot messages for one outcome,
//! one string per chat turn, in display order.

use serde_json::Value;

use lorekeeper_core::types::{DetailLayout, ListItem};

/// Reply to any query made before the startup connection succeeded.
pub const STILL_LOADING: &str = "Still loading API data, please wait...";

/// Closing line of every detail answer.
pub const DETAIL_TIP: &str = "💡 Tip: You can ask about other items too!";

const DETAIL_EXAMPLE: &str = "tell me about strength ability";

// =============================================================================
// ResponseFormatter
// =============================================================================

/// Formats list-search and detail-fetch results.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    /// Names shown before the "...and N more." summary.
    pub list_limit: usize,
}

impl ResponseFormatter {
    pub fn new(list_limit: usize) -> Self {
        Self { list_limit }
    }

    /// Messages for a collection fetched for `search_term`.
    ///
    /// A non-empty term filters names by case-insensitive substring. An empty
    /// term lists a sample of the collection.
    pub fn list_results(&self, category: &str, search_term: &str, items: &[ListItem]) -> Vec<String> {
        if search_term.is_empty() {
            let sample: Vec<&str> = items
                .iter()
                .take(self.list_limit)
                .map(|i| i.name.as_str())
                .collect();
            return vec![format!("Here are some {}: {}...", category, sample.join(", "))];
        }

        let needle = search_term.to_lowercase();
        let matches: Vec<&ListItem> = items
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .collect();

        if matches.is_empty() {
            return vec![format!(
                "No results found for \"{}\" in {}.",
                search_term, category
            )];
        }

        let mut messages = Vec::with_capacity(matches.len().min(self.list_limit) + 2);
        messages.push(format!("Found {} result(s) in {}:", matches.len(), category));
        for item in matches.iter().take(self.list_limit) {
            messages.push(format!("• {} - Ask \"tell me about {}\"", item.name, item.name));
        }
        if matches.len() > self.list_limit {
            messages.push(format!("...and {} more.", matches.len() - self.list_limit));
        }
        messages
    }

    /// Messages for one detail record.
    ///
    /// `search_term` titles the answer only when the record has neither
    /// `name` nor `full_name`.
    pub fn detail(&self, layout: DetailLayout, search_term: &str, details: &Value) -> Vec<String> {
        let title = text_or_none(details.get("name"))
            .or_else(|| text_or_none(details.get("full_name")))
            .unwrap_or_else(|| search_term.to_string());

        let mut messages = vec![format!("📋 {}", title)];

        match layout {
            DetailLayout::Ability => {
                messages.push(format!(
                    "Full Name: {}",
                    text_or_none(details.get("full_name")).unwrap_or_else(|| "N/A".to_string())
                ));
                messages.push(format!(
                    "Description: {}",
                    text_or_none(details.get("desc").and_then(|d| d.get(0)))
                        .unwrap_or_else(|| "No description available".to_string())
                ));
                if let Some(skills) = details.get("skills").and_then(Value::as_array) {
                    let names: Vec<String> = skills
                        .iter()
                        .filter_map(|s| text_or_none(s.get("name")))
                        .collect();
                    messages.push(format!("Skills: {}", names.join(", ")));
                }
            }
            DetailLayout::Spell => {
                messages.push(format!(
                    "Level: {}",
                    scalar_text(details.get("level")).unwrap_or_else(|| "N/A".to_string())
                ));
                messages.push(format!(
                    "School: {}",
                    text_or_none(details.get("school").and_then(|s| s.get("name")))
                        .unwrap_or_else(|| "N/A".to_string())
                ));
                if let Some(desc) = description(details) {
                    messages.push(format!("Description: {}", desc));
                }
            }
            DetailLayout::Creature => {
                messages.push(format!(
                    "Type: {}",
                    text_or_none(details.get("type")).unwrap_or_else(|| "N/A".to_string())
                ));
                messages.push(format!(
                    "HP: {}",
                    text_or_none(details.get("hit_points")).unwrap_or_else(|| "N/A".to_string())
                ));
                let ac = details
                    .get("armor_class")
                    .and_then(|ac| ac.get(0))
                    .and_then(|first| first.get("value"));
                messages.push(format!(
                    "AC: {}",
                    text_or_none(ac).unwrap_or_else(|| "N/A".to_string())
                ));
            }
            DetailLayout::Generic => {
                if let Some(desc) = description(details) {
                    messages.push(format!("Description: {}", desc));
                }
            }
        }

        messages.push(DETAIL_TIP.to_string());
        messages
    }
}

// =============================================================================
// Fixed messages
// =============================================================================

pub fn greeting(label: &str, categories: &[String]) -> String {
    format!(
        "Hello! I can help you explore {} content. Try asking about: {}. You can also ask for details like \"{}\".",
        label,
        categories.join(", "),
        DETAIL_EXAMPLE
    )
}

pub fn fallback(categories: &[String]) -> String {
    format!(
        "I can help you search for: {}. Try asking \"search for fireball spell\" or \"tell me about dragons\".",
        categories.join(", ")
    )
}

pub fn history_cleared(label: &str) -> String {
    format!("Chat history cleared! How can I help you with {} content?", label)
}

pub fn connect_failed(label: &str) -> String {
    format!("Sorry, I had trouble connecting to the {} API.", label)
}

pub fn search_failed(label: &str) -> String {
    format!("Sorry, I encountered an error searching the {} API.", label)
}

pub fn detail_failed(search_term: &str, category: &str) -> String {
    format!(
        "Sorry, I couldn't find detailed information for \"{}\" in {}.",
        search_term, category
    )
}

// =============================================================================
// Value helpers
// =============================================================================

/// Render a scalar as text. Null, arrays and objects have no text form.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`scalar_text`], but empty strings, zero and `false` count as missing.
fn text_or_none(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Bool(false) => None,
        v => scalar_text(Some(v)),
    }
}

/// The `desc` field: string array joined with spaces, or a plain string.
fn description(details: &Value) -> Option<String> {
    match details.get("desc")? {
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|p| scalar_text(Some(p)))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn formatter() -> ResponseFormatter {
        ResponseFormatter::new(5)
    }

    fn items(names: &[&str]) -> Vec<ListItem> {
        names
            .iter()
            .map(|n| ListItem {
                name: n.to_string(),
                index: Some(n.to_lowercase().replace(' ', "-")),
            })
            .collect()
    }

    // ---- List search ----

    #[test]
    fn test_found_results() {
        let msgs = formatter().list_results(
            "spells",
            "fire",
            &items(&["Fireball", "Fire Bolt", "Shield"]),
        );
        assert_eq!(
            msgs,
            vec![
                "Found 2 result(s) in spells:",
                "• Fireball - Ask \"tell me about Fireball\"",
                "• Fire Bolt - Ask \"tell me about Fire Bolt\"",
            ]
        );
    }

    #[test]
    fn test_more_than_limit_summarized() {
        let names: Vec<String> = (0..8).map(|i| format!("Goblin {}", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let msgs = formatter().list_results("monsters", "GOBLIN", &items(&refs));
        assert_eq!(msgs.len(), 7);
        assert_eq!(msgs[0], "Found 8 result(s) in monsters:");
        assert_eq!(msgs[5], "• Goblin 4 - Ask \"tell me about Goblin 4\"");
        assert_eq!(msgs[6], "...and 3 more.");
    }

    #[test]
    fn test_exactly_limit_has_no_summary() {
        let msgs = formatter().list_results("races", "f", &items(&["Elf", "Dwarf", "Half-Elf", "Half-Orc", "Fey", "X"]));
        assert_eq!(msgs.len(), 6);
        assert!(!msgs.last().unwrap().starts_with("...and"));
    }

    #[test]
    fn test_custom_limit() {
        let msgs = ResponseFormatter::new(2).list_results("spells", "a", &items(&["Aid", "Alarm", "Bane"]));
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[3], "...and 1 more.");
    }

    #[test]
    fn test_no_results() {
        let msgs = formatter().list_results("spells", "xyz", &items(&["Fireball"]));
        assert_eq!(msgs, vec!["No results found for \"xyz\" in spells."]);
    }

    #[test]
    fn test_empty_term_lists_sample() {
        let msgs = formatter().list_results(
            "classes",
            "",
            &items(&["Barbarian", "Bard", "Cleric", "Druid", "Fighter", "Monk", "Paladin"]),
        );
        assert_eq!(
            msgs,
            vec!["Here are some classes: Barbarian, Bard, Cleric, Druid, Fighter..."]
        );
    }

    #[test]
    fn test_empty_term_on_empty_collection() {
        let msgs = formatter().list_results("rules", "", &[]);
        assert_eq!(msgs, vec!["Here are some rules: ..."]);
    }

    // ---- Detail ----

    #[test]
    fn test_ability_layout() {
        let details = json!({
            "index": "str",
            "name": "STR",
            "full_name": "Strength",
            "desc": ["Strength measures bodily power.", "Second paragraph."],
            "skills": [{"name": "Athletics", "index": "athletics"}]
        });
        let msgs = formatter().detail(DetailLayout::Ability, "strength", &details);
        assert_eq!(
            msgs,
            vec![
                "📋 STR",
                "Full Name: Strength",
                "Description: Strength measures bodily power.",
                "Skills: Athletics",
                DETAIL_TIP,
            ]
        );
    }

    #[test]
    fn test_ability_layout_without_desc_or_skills() {
        let msgs = formatter().detail(DetailLayout::Ability, "x", &json!({"full_name": "Charisma"}));
        assert_eq!(
            msgs,
            vec![
                "📋 Charisma",
                "Full Name: Charisma",
                "Description: No description available",
                DETAIL_TIP,
            ]
        );
    }

    #[test]
    fn test_spell_layout() {
        let details = json!({
            "name": "Fireball",
            "level": 3,
            "school": {"name": "Evocation"},
            "desc": ["A bright streak flashes.", "It explodes."]
        });
        let msgs = formatter().detail(DetailLayout::Spell, "fireball", &details);
        assert_eq!(
            msgs,
            vec![
                "📋 Fireball",
                "Level: 3",
                "School: Evocation",
                "Description: A bright streak flashes. It explodes.",
                DETAIL_TIP,
            ]
        );
    }

    #[test]
    fn test_cantrip_level_zero_is_shown() {
        let msgs = formatter().detail(DetailLayout::Spell, "x", &json!({"name": "Light", "level": 0}));
        assert_eq!(msgs[1], "Level: 0");
        assert_eq!(msgs[2], "School: N/A");
        assert_eq!(msgs.len(), 4);
    }

    #[test]
    fn test_creature_layout() {
        let details = json!({
            "name": "Goblin",
            "type": "humanoid",
            "hit_points": 7,
            "armor_class": [{"type": "armor", "value": 15}]
        });
        let msgs = formatter().detail(DetailLayout::Creature, "goblin", &details);
        assert_eq!(
            msgs,
            vec!["📋 Goblin", "Type: humanoid", "HP: 7", "AC: 15", DETAIL_TIP]
        );
    }

    #[test]
    fn test_creature_layout_missing_fields() {
        let msgs = formatter().detail(DetailLayout::Creature, "blob", &json!({"name": "Blob"}));
        assert_eq!(
            msgs,
            vec!["📋 Blob", "Type: N/A", "HP: N/A", "AC: N/A", DETAIL_TIP]
        );
    }

    #[test]
    fn test_generic_layout_string_and_array_desc() {
        let f = formatter();
        let msgs = f.detail(DetailLayout::Generic, "x", &json!({"name": "Blinded", "desc": ["- Can't see.", "- Fails checks."]}));
        assert_eq!(msgs[1], "Description: - Can't see. - Fails checks.");

        let msgs = f.detail(DetailLayout::Generic, "x", &json!({"name": "Acid", "desc": "Corrosive."}));
        assert_eq!(msgs[1], "Description: Corrosive.");
    }

    #[test]
    fn test_generic_layout_without_desc() {
        let msgs = formatter().detail(DetailLayout::Generic, "x", &json!({"name": "Adventuring"}));
        assert_eq!(msgs, vec!["📋 Adventuring", DETAIL_TIP]);
    }

    #[test]
    fn test_empty_desc_string_is_skipped() {
        let msgs = formatter().detail(DetailLayout::Generic, "x", &json!({"name": "A", "desc": ""}));
        assert_eq!(msgs, vec!["📋 A", DETAIL_TIP]);
    }

    #[test]
    fn test_title_falls_back_to_search_term() {
        let msgs = formatter().detail(DetailLayout::Generic, "mystery", &json!({}));
        assert_eq!(msgs[0], "📋 mystery");
    }

    // ---- Fixed messages ----

    #[test]
    fn test_fixed_messages() {
        let cats = vec!["spells".to_string(), "monsters".to_string()];
        assert_eq!(
            fallback(&cats),
            "I can help you search for: spells, monsters. Try asking \"search for fireball spell\" or \"tell me about dragons\"."
        );
        assert_eq!(
            greeting("D&D 5e", &cats),
            "Hello! I can help you explore D&D 5e content. Try asking about: spells, monsters. You can also ask for details like \"tell me about strength ability\"."
        );
        assert_eq!(
            history_cleared("D&D 5e"),
            "Chat history cleared! How can I help you with D&D 5e content?"
        );
        assert_eq!(
            connect_failed("D&D 5e"),
            "Sorry, I had trouble connecting to the D&D 5e API."
        );
        assert_eq!(
            search_failed("D&D 5e"),
            "Sorry, I encountered an error searching the D&D 5e API."
        );
        assert_eq!(
            detail_failed("fire", "spells"),
            "Sorry, I couldn't find detailed information for \"fire\" in spells."
        );
    }
}
