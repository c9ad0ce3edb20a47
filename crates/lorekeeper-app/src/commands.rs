//! Slash commands for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the stored history after confirmation.
    Clear,
    /// Collapse or expand the transcript.
    Toggle,
    /// Ask for details about an ability score.
    Ability(String),
    /// List registered API sources.
    Sources,
    /// Retry the startup connection.
    Reconnect,
    /// Exit the chat session.
    Quit,
    /// Unknown command or missing argument.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" => Some(ChatCommand::Clear),
        "/toggle" => Some(ChatCommand::Toggle),
        "/sources" => Some(ChatCommand::Sources),
        "/reconnect" => Some(ChatCommand::Reconnect),
        "/quit" | "/exit" | "/q" => Some(ChatCommand::Quit),
        "/ability" => match arg {
            Some(name) if !name.is_empty() => Some(ChatCommand::Ability(name)),
            _ => Some(ChatCommand::Unknown(
                "/ability requires a name, e.g. /ability strength".to_string(),
            )),
        },
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Whether an answer to a yes/no prompt means yes.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    let rows = [
        ("/help", "Show this help"),
        ("/clear", "Clear the chat history"),
        ("/toggle", "Collapse or expand the transcript"),
        ("/ability <name>", "Details about an ability score"),
        ("/sources", "List API sources and their categories"),
        ("/reconnect", "Retry connecting to the API"),
        ("/quit", "Exit"),
    ];
    for (cmd, desc) in rows {
        println!("    {:<18} {}", style(cmd).cyan(), style(desc).dim());
    }
    println!();
    println!(
        "  {}",
        style("Try \"search for fireball spell\" or \"tell me about goblin monster\". Ctrl+D to exit.")
            .dim()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("fireball spell"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("  /CLEAR "), Some(ChatCommand::Clear));
        assert_eq!(parse("/toggle"), Some(ChatCommand::Toggle));
        assert_eq!(parse("/sources"), Some(ChatCommand::Sources));
        assert_eq!(parse("/reconnect"), Some(ChatCommand::Reconnect));
        assert_eq!(parse("/exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn test_parse_ability() {
        assert_eq!(
            parse("/ability  dexterity "),
            Some(ChatCommand::Ability("dexterity".to_string()))
        );
        assert!(matches!(parse("/ability"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/ability   "), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/dance"),
            Some(ChatCommand::Unknown("/dance".to_string()))
        );
    }

    #[test]
    fn test_confirmation() {
        assert!(is_confirmation("y"));
        assert!(is_confirmation(" YES "));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation("yep"));
    }
}
