//! Contact CLI commands: list, add, delete, personas, send, history.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input, Select};

use messenger_core::chat::orchestrator::SendOutcome;
use messenger_types::contact::{Contact, ContactType, NewContact};
use messenger_types::persona::{PERSONAS, find_persona};
use messenger_types::user::User;

use super::auth::require_user;
use super::display::{format_relative_time, preview, print_message, spinner, type_badge};
use crate::state::AppState;

/// List the user's contacts in a table with message counts.
pub async fn list_contacts(state: &AppState, json: bool) -> Result<()> {
    let user = require_user(state).await?;
    let contacts = state.contact_service.list_contacts(&user).await?;
    let counts = state.transcripts.counts(&user).await?;

    if json {
        let rows: Vec<_> = contacts
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id.to_string(),
                    "name": c.name,
                    "type": c.contact_type.to_string(),
                    "systemInstruction": c.system_instruction,
                    "messages": counts.get(&c.id.to_string()).copied().unwrap_or(0),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if contacts.is_empty() {
        println!();
        println!(
            "  {} No contacts yet. Add one with: {}",
            style("i").blue().bold(),
            style("gmsg contacts add").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Persona").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for contact in &contacts {
        let type_cell = if contact.is_ai() {
            Cell::new("✦ AI").fg(Color::Magenta)
        } else {
            Cell::new("● Human").fg(Color::Green)
        };
        let persona = contact
            .system_instruction
            .as_deref()
            .map(|s| preview(s, 40))
            .unwrap_or_else(|| {
                if contact.is_ai() {
                    "(default)".to_string()
                } else {
                    "-".to_string()
                }
            });
        let id = contact.id.to_string();

        table.add_row(vec![
            Cell::new(format!("{}  {}", contact.initials(), contact.name)),
            type_cell,
            Cell::new(counts.get(&id).copied().unwrap_or(0)),
            Cell::new(persona).fg(Color::DarkGrey),
            Cell::new(&id[..8.min(id.len())]).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} contact{}",
        contacts.len(),
        if contacts.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// System instruction for an AI contact from `--persona` or `--instruction`.
fn instruction_from_flags(
    persona: Option<&str>,
    instruction: Option<String>,
) -> Result<Option<String>> {
    match (persona, instruction) {
        (Some(_), Some(_)) => anyhow::bail!("use either --persona or --instruction, not both"),
        (Some(query), None) => find_persona(query)
            .map(|p| Some(p.prompt.to_string()))
            .ok_or_else(|| {
                anyhow::anyhow!("unknown persona '{query}'. Run `gmsg personas` to see the presets.")
            }),
        (None, instruction) => Ok(instruction),
    }
}

/// The `--name` flag, or `None` when the name should be prompted for.
///
/// JSON output never prompts, so the name is mandatory there.
fn name_from_flags(name: Option<String>, json: bool) -> Result<Option<String>> {
    match name {
        None if json => anyhow::bail!("--name is required with --json"),
        name => Ok(name),
    }
}

/// Ask for a persona preset or a custom prompt.
fn pick_instruction() -> Result<Option<String>> {
    let mut items: Vec<String> = PERSONAS.iter().map(|p| p.name.to_string()).collect();
    items.push("Custom prompt...".to_string());

    let choice = Select::new()
        .with_prompt("Personality")
        .items(&items)
        .default(0)
        .interact()?;

    match PERSONAS.get(choice) {
        Some(persona) => Ok(Some(persona.prompt.to_string())),
        None => {
            let custom = Input::<String>::new()
                .with_prompt("System instruction")
                .allow_empty(true)
                .interact_text()?;
            Ok(Some(custom))
        }
    }
}

/// Add a contact via interactive wizard or one-shot flags.
///
/// # Examples
///
/// ```bash
/// # Interactive wizard
/// gmsg contacts add
///
/// # One-shot with flags
/// gmsg contacts add --name "Gem" --ai --persona witty-friend
/// ```
pub async fn add_contact(
    state: &AppState,
    name: Option<String>,
    ai: bool,
    persona: Option<String>,
    instruction: Option<String>,
    json: bool,
) -> Result<()> {
    let user = require_user(state).await?;
    let name = name_from_flags(name, json)?;
    let interactive = name.is_none();

    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Contact name")
            .interact_text()?,
    };

    let flagged_ai = ai || persona.is_some() || instruction.is_some();
    let contact_type = if flagged_ai {
        ContactType::Ai
    } else if interactive {
        let choice = Select::new()
            .with_prompt("Contact type")
            .items(&["Human", "AI (Gemini)"])
            .default(0)
            .interact()?;
        if choice == 1 {
            ContactType::Ai
        } else {
            ContactType::Human
        }
    } else {
        ContactType::Human
    };

    let system_instruction = if !contact_type.is_ai() {
        None
    } else if persona.is_none() && instruction.is_none() && interactive {
        pick_instruction()?
    } else {
        instruction_from_flags(persona.as_deref(), instruction)?
    };

    let contact = state
        .contact_service
        .add_contact(
            &user,
            NewContact {
                name,
                contact_type,
                system_instruction,
            },
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&contact)?);
        return Ok(());
    }

    println!();
    println!("  {} Contact added!", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&contact.name).cyan());
    println!("  {}  {}", style("Type:").bold(), type_badge(&contact));
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(contact.id.to_string()).dim()
    );
    if contact.is_ai() && !state.ai_enabled() {
        println!();
        println!(
            "  {} No Gemini API key found; set {} to get replies.",
            style("!").yellow().bold(),
            style(state.config.api_key_env.join(" or ")).yellow()
        );
    }
    println!();
    println!(
        "  Start chatting: {}",
        style(format!("gmsg chat \"{}\"", contact.name)).yellow()
    );
    println!();

    Ok(())
}

/// Delete a contact, its conversation and its AI session.
pub async fn delete_contact(
    state: &AppState,
    selector: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let user = require_user(state).await?;
    let contact = state.contact_service.find_contact(&user, selector).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete {}? This action cannot be undone.",
                style(&contact.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.orchestrator.delete_contact(&user, &contact.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": removed, "id": contact.id.to_string()})
        );
    } else if removed {
        println!(
            "  {} Contact '{}' deleted.",
            style("✓").red().bold(),
            contact.name
        );
    } else {
        println!("  {} '{}' was already gone.", style("i").blue().bold(), contact.name);
    }

    Ok(())
}

pub fn list_personas(json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = PERSONAS
            .iter()
            .map(|p| serde_json::json!({ "name": p.name, "slug": p.slug(), "prompt": p.prompt }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    for persona in PERSONAS {
        println!(
            "  {} {}",
            style(persona.name).cyan().bold(),
            style(format!("({})", persona.slug())).dim()
        );
        println!("    {}", persona.prompt);
        println!();
    }
    println!(
        "  Use one with: {}",
        style("gmsg contacts add --ai --persona <slug>").yellow()
    );
    println!();
    Ok(())
}

/// Run one send through the orchestrator, with a typing spinner for AI contacts.
pub async fn deliver(
    state: &AppState,
    user: &User,
    contact: &Contact,
    text: &str,
) -> Result<SendOutcome> {
    let typing = contact
        .is_ai()
        .then(|| spinner(format!("{} is typing...", contact.name)));
    let outcome = state.orchestrator.send(user, &contact.id, text).await;
    if let Some(typing) = typing {
        typing.finish_and_clear();
    }
    Ok(outcome?)
}

/// Send a single message and print the reply, if any.
pub async fn send(state: &AppState, selector: &str, text: &str, json: bool) -> Result<()> {
    let user = require_user(state).await?;
    let contact = state.contact_service.find_contact(&user, selector).await?;
    let outcome = deliver(state, &user, &contact, text).await?;

    if json {
        let mut out = serde_json::json!({
            "message": outcome.message(),
            "reply": outcome.reply(),
        });
        if let SendOutcome::Apologized { reason, .. } = &outcome {
            out["error"] = serde_json::Value::String(reason.clone());
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &outcome {
        SendOutcome::Delivered { .. } => {
            println!(
                "  {} Sent to {}.",
                style("✓").green().bold(),
                style(&contact.name).cyan()
            );
        }
        SendOutcome::Replied { reply, .. } => {
            print_message(reply, &contact.name);
        }
        SendOutcome::Apologized { reply, reason, .. } => {
            print_message(reply, &contact.name);
            println!("  {}", style(format!("({reason})")).dim());
        }
    }

    Ok(())
}

/// Print the transcript with a contact, optionally only the last `limit` messages.
pub async fn history(
    state: &AppState,
    selector: &str,
    limit: Option<u64>,
    json: bool,
) -> Result<()> {
    let user = require_user(state).await?;
    let contact = state.contact_service.find_contact(&user, selector).await?;
    let messages = state.transcripts.messages(&user, &contact.id).await?;
    let skip = limit.map_or(0, |n| {
        messages
            .len()
            .saturating_sub(usize::try_from(n).unwrap_or(usize::MAX))
    });
    let shown = &messages[skip..];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    println!();
    if shown.is_empty() {
        println!(
            "  {} No messages with {} yet.",
            style("i").blue().bold(),
            style(&contact.name).cyan()
        );
        println!();
        return Ok(());
    }

    println!(
        "  {} {}",
        style(&contact.name).cyan().bold(),
        style(format!(
            "· {} message{} · last {}",
            messages.len(),
            if messages.len() == 1 { "" } else { "s" },
            messages
                .last()
                .map(|m| format_relative_time(&m.timestamp))
                .unwrap_or_default()
        ))
        .dim()
    );
    println!();
    for message in shown {
        print_message(message, &contact.name);
    }
    println!();

    Ok(())
}
