//! Main chat loop orchestration.
//!
//! Resolves the contact, prints the banner and recent messages, then reads
//! lines until the user exits. Each line is either a slash command or a
//! message handed to the conversation orchestrator.

use std::time::Instant;

use anyhow::Result;
use console::style;
use crossterm::style::Color;
use dialoguer::Select;

use messenger_core::chat::orchestrator::SendOutcome;
use messenger_types::contact::Contact;
use messenger_types::user::User;

use crate::cli::auth::require_user;
use crate::cli::contact::deliver;
use crate::cli::display::{print_message, type_badge};
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Messages replayed when a conversation opens.
const RECENT_ON_OPEN: usize = 6;
const HISTORY_PAGE: usize = 20;

/// Ask which contact to open.
async fn pick_contact(state: &AppState, user: &User) -> Result<Option<Contact>> {
    let contacts = state.contact_service.list_contacts(user).await?;
    if contacts.is_empty() {
        println!();
        println!(
            "  {} No contacts yet. Add one with: {}",
            style("i").blue().bold(),
            style("gmsg contacts add").yellow()
        );
        println!();
        return Ok(None);
    }

    let items: Vec<String> = contacts
        .iter()
        .map(|c| format!("{} ({})", c.name, if c.is_ai() { "AI" } else { "human" }))
        .collect();
    let choice = Select::new()
        .with_prompt("Open conversation with")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(contacts.into_iter().nth(choice))
}

async fn print_recent(state: &AppState, user: &User, contact: &Contact, limit: usize) -> Result<()> {
    let messages = state.transcripts.messages(user, &contact.id).await?;
    let skip = messages.len().saturating_sub(limit);
    if skip > 0 {
        println!("  {}", style(format!("... {skip} earlier")).dim());
    }
    for message in &messages[skip..] {
        print_message(message, &contact.name);
    }
    if !messages.is_empty() {
        println!();
    }
    Ok(())
}

async fn open_conversation(state: &AppState, user: &User, contact: &Contact) -> Result<()> {
    let count = state.transcripts.messages(user, &contact.id).await?.len();
    print_welcome_banner(contact, &state.config.model, state.ai_enabled(), count);
    print_recent(state, user, contact, RECENT_ON_OPEN).await
}

async fn print_contacts(state: &AppState, user: &User, current: &Contact) -> Result<()> {
    let contacts = state.contact_service.list_contacts(user).await?;
    println!();
    for c in &contacts {
        let marker = if c.id == current.id { "›" } else { " " };
        println!(
            "  {} {:<24} {}",
            style(marker).cyan().bold(),
            c.name,
            type_badge(c)
        );
    }
    println!();
    Ok(())
}

/// Run the interactive chat loop, starting with `selector` if given.
pub async fn run_chat_loop(state: &AppState, selector: Option<String>) -> Result<()> {
    let user = require_user(state).await?;

    let mut contact = match selector {
        Some(selector) => state.contact_service.find_contact(&user, &selector).await?,
        None => match pick_contact(state, &user).await? {
            Some(contact) => contact,
            None => return Ok(()),
        },
    };

    open_conversation(state, &user, &contact).await?;

    let renderer = ChatRenderer::new(Some(Color::Magenta));
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Chat ended.").dim());
                    break;
                }
                ChatCommand::History => {
                    println!();
                    print_recent(state, &user, &contact, HISTORY_PAGE).await?;
                }
                ChatCommand::Contacts => print_contacts(state, &user, &contact).await?,
                ChatCommand::Switch(selector) => {
                    match state.contact_service.find_contact(&user, &selector).await {
                        Ok(next) => {
                            contact = next;
                            open_conversation(state, &user, &contact).await?;
                        }
                        Err(e) => println!("\n  {} {e}\n", style("?").yellow().bold()),
                    }
                }
                ChatCommand::Logout => {
                    state.auth_service.log_out().await?;
                    println!(
                        "\n  {} Logged out {}.",
                        style("✓").green().bold(),
                        user.email
                    );
                    break;
                }
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        let start_time = Instant::now();
        let outcome = match deliver(state, &user, &contact, &text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("\n  {} {e}\n", style("!").red().bold());
                continue;
            }
        };

        match outcome {
            SendOutcome::Delivered { .. } => {
                println!("  {}", style("✓ sent").dim());
            }
            SendOutcome::Replied { reply, usage, .. } => {
                println!();
                println!("  {}", style(&contact.name).cyan().bold());
                println!("  {}", renderer.render_final(&reply.text).trim());
                renderer.print_stats_footer(
                    usage.output_tokens,
                    start_time.elapsed().as_millis() as u64,
                    &state.config.model,
                );
                println!();
            }
            SendOutcome::Apologized { reply, reason, .. } => {
                println!();
                print_message(&reply, &contact.name);
                println!("  {}", style(format!("({reason})")).dim());
                println!();
            }
        }
    }

    chat_input.flush();
    Ok(())
}
