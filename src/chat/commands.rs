//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the model.

use crate::Temperature;

/// The sigil that marks a line as a command.
pub const COMMAND_SIGIL: char = '/';

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Clear the conversation history.
    Clear,

    /// List the installed models.
    Models,

    /// Switch models.  The argument, if given inline, is a model name or its
    /// 1-based index in the catalog; otherwise the user is prompted.
    Switch(Option<String>),

    /// Change the sampling temperature, inline or by prompting.
    Temperature(Option<String>),

    /// Exit the chat application.
    Quit,

    /// A command that is not recognized.  Carries the lowercased name.
    Unknown(String),
}

/// A classified line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank input; nothing happens.
    Empty,

    /// A message for the model, exactly as typed.
    Chat(String),

    /// A slash command.
    Command(ChatCommand),
}

/// Classifies one line of input.
///
/// A line is a command iff it is non-empty after trimming and starts with
/// the sigil.
pub fn classify(line: &str) -> Input {
    if line.trim().is_empty() {
        return Input::Empty;
    }
    match parse_command(line) {
        Some(command) => Input::Command(command),
        None => Input::Chat(line.to_string()),
    }
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use ollama_chat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
/// assert_eq!(
///     parse_command("/switch llama3.2:3b"),
///     Some(ChatCommand::Switch(Some("llama3.2:3b".to_string())))
/// );
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix(COMMAND_SIGIL)?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from);

    let result = match command.as_str() {
        "help" | "?" => ChatCommand::Help,
        "clear" => ChatCommand::Clear,
        "models" => ChatCommand::Models,
        "switch" => ChatCommand::Switch(argument),
        "temp" | "temperature" => ChatCommand::Temperature(argument),
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Unknown(command),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /help              Show this help message
  /clear             Clear chat history
  /models            List available models
  /switch [model]    Switch to a different model (name or number)
  /temp [value]      Change temperature setting (0.0-1.0)
  /quit              Exit the chatbot (also /exit, /q)

Shortcuts:
  Ctrl+C             Cancel the current line or response
  Ctrl+D             Exit the chatbot"#
}

/// Returns the banner shown when the terminal client starts.
pub fn welcome_text(model: &str, temperature: Temperature) -> String {
    format!(
        "LLM Terminal Chatbot\n\n\
         Model:       {model}\n\
         Temperature: {temperature}\n\n\
         Type your message and press Enter to chat.\n\
         Type /help for available commands.\n\
         Type /quit or press Ctrl+D to exit."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /Exit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear_and_help() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/models"), Some(ChatCommand::Models));
    }

    #[test]
    fn parse_switch() {
        assert_eq!(parse_command("/switch"), Some(ChatCommand::Switch(None)));
        assert_eq!(
            parse_command("/switch 2"),
            Some(ChatCommand::Switch(Some("2".to_string())))
        );
        assert_eq!(
            parse_command("/SWITCH   Llama3.2:3B  "),
            Some(ChatCommand::Switch(Some("Llama3.2:3B".to_string())))
        );
    }

    #[test]
    fn parse_temperature() {
        assert_eq!(
            parse_command("/temp"),
            Some(ChatCommand::Temperature(None))
        );
        assert_eq!(
            parse_command("/temp 0.3"),
            Some(ChatCommand::Temperature(Some("0.3".to_string())))
        );
        assert_eq!(
            parse_command("/temperature\t1.5"),
            Some(ChatCommand::Temperature(Some("1.5".to_string())))
        );
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse_command("/Frobnicate now"),
            Some(ChatCommand::Unknown("frobnicate".to_string()))
        );
        assert_eq!(
            parse_command("/"),
            Some(ChatCommand::Unknown(String::new()))
        );
    }

    #[test]
    fn parse_non_commands() {
        assert!(parse_command("Hello").is_none());
        assert!(parse_command("path/to/file").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify(""), Input::Empty);
        assert_eq!(classify("   \t "), Input::Empty);
        assert_eq!(classify("  /q"), Input::Command(ChatCommand::Quit));
        assert_eq!(
            classify("  hello there "),
            Input::Chat("  hello there ".to_string())
        );
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for command in ["/help", "/clear", "/models", "/switch", "/temp", "/quit"] {
            assert!(help.contains(command), "help is missing {command}");
        }
    }

    #[test]
    fn welcome_mentions_model_and_temperature() {
        let text = welcome_text("gemma3:270m", Temperature::default());
        assert!(text.contains("gemma3:270m"));
        assert!(text.contains("0.7"));
    }
}
