//! Header printed when a conversation opens.

use console::style;

use messenger_types::contact::Contact;

use crate::cli::display::{preview, type_badge};

/// Print the conversation header: initials, name, type, persona and model.
///
/// `model` is only shown for AI contacts.
pub fn print_welcome_banner(contact: &Contact, model: &str, ai_enabled: bool, message_count: usize) {
    println!();
    println!(
        "  {} {}  {}",
        style(format!("[{}]", contact.initials())).bold(),
        style(&contact.name).cyan().bold(),
        type_badge(contact)
    );

    if contact.is_ai() {
        if let Some(instruction) = &contact.system_instruction {
            println!("  {}", style(preview(instruction, 72)).dim());
        }
        println!();
        println!("  {}  {}", style("Model:").bold(), style(model).dim());
        if !ai_enabled {
            println!(
                "  {}  {}",
                style("Note:").bold(),
                style("no API key configured, replies will fail").yellow()
            );
        }
    } else {
        println!(
            "  {}",
            style("Human contact: messages are saved, nobody answers here.").dim()
        );
    }

    println!(
        "  {}  {}",
        style("Messages:").bold(),
        style(message_count).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
