//! Slash command parsing for the chat application.
//!
//! Lines that start with `/` drive the side panel, the suggestions and the
//! session itself; every other line is a prompt.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation and the prompt history.
    Clear,

    /// Go back to the welcome view without deleting anything.
    NewChat,

    /// Show the side panel with the prompt history.
    History,

    /// Send the numbered history entry again (1-based).
    Replay(usize),

    /// Expand or collapse the side panel.
    Sidebar,

    /// List suggestions, or send the numbered one (1-based).
    Suggest(Option<usize>),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a prompt.
///
/// # Examples
///
/// ```
/// # use gemchat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/replay 2"), Some(ChatCommand::Replay(2)));
/// assert!(parse_command("What is React?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "new" => ChatCommand::NewChat,
        "history" | "recent" => ChatCommand::History,
        "replay" | "r" => match argument {
            Some(arg) => match parse_entry_number(arg) {
                Some(number) => ChatCommand::Replay(number),
                None => ChatCommand::Invalid(
                    "/replay expects a history entry number".to_string(),
                ),
            },
            None => ChatCommand::Invalid("/replay requires an entry number".to_string()),
        },
        "sidebar" | "menu" => ChatCommand::Sidebar,
        "suggest" => match argument {
            Some(arg) => match parse_entry_number(arg) {
                Some(number) => ChatCommand::Suggest(Some(number)),
                None => ChatCommand::Invalid("/suggest expects a suggestion number".to_string()),
            },
            None => ChatCommand::Suggest(None),
        },
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_entry_number(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|number| *number > 0)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /history               Show recent prompts
  /replay <n>            Send recent prompt <n> again
  /sidebar               Expand or collapse the recent prompts panel
  /suggest [n]           List suggestions, or send suggestion <n>
  /new                   Back to the welcome screen
  /clear                 Clear the conversation and recent prompts
  /help                  Show this help message
  /quit                  Exit the chat
Anything else is sent as a prompt. Ctrl+C skips the reveal animation."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear_and_new() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/CLEAR"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/new"), Some(ChatCommand::NewChat));
    }

    #[test]
    fn parse_replay() {
        assert_eq!(parse_command("/replay 3"), Some(ChatCommand::Replay(3)));
        assert_eq!(parse_command("/r   1 "), Some(ChatCommand::Replay(1)));
        assert!(matches!(
            parse_command("/replay"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
        assert!(matches!(
            parse_command("/replay 0"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
        assert!(matches!(
            parse_command("/replay two"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_panel_commands() {
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/recent"), Some(ChatCommand::History));
        assert_eq!(parse_command("/sidebar"), Some(ChatCommand::Sidebar));
        assert_eq!(parse_command("/menu"), Some(ChatCommand::Sidebar));
    }

    #[test]
    fn parse_suggest() {
        assert_eq!(parse_command("/suggest"), Some(ChatCommand::Suggest(None)));
        assert_eq!(
            parse_command("/suggest 4"),
            Some(ChatCommand::Suggest(Some(4)))
        );
        assert!(matches!(
            parse_command("/suggest x"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid("Unknown command: /frobnicate".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello, Gemini!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/clear"));
        assert!(help.contains("/replay"));
        assert!(help.contains("/suggest"));
    }
}
