//! Account CLI commands: signup, login, logout, whoami.

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};

use messenger_types::error::AuthError;
use messenger_types::user::User;

use crate::state::AppState;

/// The logged-in user, or an error telling them how to log in.
pub async fn require_user(state: &AppState) -> Result<User> {
    match state.auth_service.require_user().await {
        Ok(user) => Ok(user),
        Err(AuthError::NotLoggedIn) => Err(anyhow::anyhow!(
            "Not logged in. Run `gmsg login` or `gmsg signup` first."
        )),
        Err(e) => Err(e.into()),
    }
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(e) => Ok(e),
        None => Ok(Input::<String>::new()
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()?),
    }
}

/// Create an account and mark it as the current user.
///
/// Missing fields are prompted for; the password twice, hidden.
pub async fn signup(
    state: &AppState,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let email = prompt_email(email)?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match.")
            .allow_empty_password(true)
            .interact()?,
    };

    let user = state.auth_service.sign_up(&email, &password).await?;

    if json {
        println!("{}", serde_json::json!({ "signed_up": true, "email": user.email }));
        return Ok(());
    }

    println!();
    println!(
        "  {} Account created. Logged in as {}",
        style("✓").green().bold(),
        style(&user.email).cyan()
    );
    println!(
        "  Add someone to talk to: {}",
        style("gmsg contacts add").yellow()
    );
    println!();
    Ok(())
}

pub async fn login(
    state: &AppState,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let email = prompt_email(email)?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?,
    };

    let user = state.auth_service.log_in(&email, &password).await?;

    if json {
        println!("{}", serde_json::json!({ "logged_in": true, "email": user.email }));
    } else {
        println!(
            "  {} Logged in as {}",
            style("✓").green().bold(),
            style(&user.email).cyan()
        );
    }
    Ok(())
}

pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    let previous = state.auth_service.log_out().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "logged_out": previous.is_some(),
                "email": previous.as_ref().map(|u| u.email.as_str()),
            })
        );
        return Ok(());
    }

    match previous {
        Some(user) => println!("  {} Logged out {}.", style("✓").green().bold(), user.email),
        None => println!("  {} Nobody was logged in.", style("i").blue().bold()),
    }
    Ok(())
}

pub async fn whoami(state: &AppState, json: bool) -> Result<()> {
    let user = state.auth_service.current_user().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "email": user.as_ref().map(|u| u.email.as_str()) })
        );
        return Ok(());
    }

    match user {
        Some(user) => println!("  {}", style(&user.email).cyan()),
        None => println!(
            "  {} Not logged in. Run {}",
            style("i").blue().bold(),
            style("gmsg login").yellow()
        ),
    }
    Ok(())
}
