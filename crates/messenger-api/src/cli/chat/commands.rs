//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat loop.
    Exit,
    /// Show recent messages with the current contact.
    History,
    /// List contacts.
    Contacts,
    /// Open another contact's conversation.
    Switch(String),
    /// Log out and leave the chat.
    Logout,
    /// Unknown command, or a known one used wrongly.
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

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/contacts" | "/ls" => Some(ChatCommand::Contacts),
        "/switch" | "/open" => {
            if arg.is_empty() {
                Some(ChatCommand::Unknown("/switch requires a contact".to_string()))
            } else {
                Some(ChatCommand::Switch(arg.to_string()))
            }
        }
        "/logout" => Some(ChatCommand::Logout),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}              Show this help message", style("/help").cyan());
    println!("  {}             Clear the screen", style("/clear").cyan());
    println!("  {}           Show recent messages", style("/history").cyan());
    println!("  {}          List your contacts", style("/contacts").cyan());
    println!("  {} Talk to someone else", style("/switch <contact>").cyan());
    println!("  {}            Log out and leave", style("/logout").cyan());
    println!("  {}              End the chat", style("/exit").cyan());
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
