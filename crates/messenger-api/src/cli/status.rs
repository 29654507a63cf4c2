//! System status dashboard command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Display the status dashboard.
///
/// Shows the logged-in user, contact counts, whether Gemini is reachable
/// (key present), the configured model and where data lives.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let user = state.auth_service.current_user().await?;
    let contacts = match &user {
        Some(user) => state.contact_service.list_contacts(user).await?,
        None => Vec::new(),
    };
    let ai_contacts = contacts.iter().filter(|c| c.is_ai()).count();
    let total_messages: usize = match &user {
        Some(user) => state.transcripts.counts(user).await?.values().sum(),
        None => 0,
    };

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "user": user.as_ref().map(|u| u.email.as_str()),
            "contacts": {
                "total": contacts.len(),
                "ai": ai_contacts,
                "human": contacts.len() - ai_contacts,
            },
            "messages": total_messages,
            "api_key_configured": state.ai_enabled(),
            "api_key_source": state.api_key_source,
            "model": state.config.model,
            "data_dir": state.data_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Gemini Messenger v{}",
        style("✦").magenta().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Account ──").dim());
    match &user {
        Some(user) => println!("  User:     {}", style(&user.email).cyan()),
        None => println!("  User:     {}", style("not logged in").yellow()),
    }
    println!();

    println!("  {}", style("── Contacts ──").dim());
    println!("  Total:    {}", style(contacts.len()).bold());
    println!("  AI:       {}", style(ai_contacts).magenta());
    println!("  Human:    {}", style(contacts.len() - ai_contacts).green());
    println!("  Messages: {}", total_messages);
    println!();

    println!("  {}", style("── Gemini ──").dim());
    match &state.api_key_source {
        Some(var) if state.ai_enabled() => {
            println!("  API key:  {} (from {var})", style("configured").green())
        }
        _ => println!(
            "  API key:  {} (set {})",
            style("missing").red(),
            state.config.api_key_env.join(" or ")
        ),
    }
    println!("  Model:    {}", style(&state.config.model).dim());
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
