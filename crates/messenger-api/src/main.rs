//! Gemini Messenger CLI entry point.
//!
//! Binary name: `gmsg`
//!
//! Parses CLI arguments, sets up tracing, opens the data directory and
//! dispatches to the command handlers.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use cli::{Cli, Commands, ContactsCommand};
use state::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,messenger_core=debug,messenger_infra=debug",
        _ => "trace",
    };
    if let Err(e) =
        messenger_observe::tracing_setup::init_tracing(level, messenger_observe::tracing_setup::otel_requested())
    {
        eprintln!("warning: tracing setup failed: {e}");
    }

    let json = cli.json;
    let result = run(cli).await;
    messenger_observe::tracing_setup::shutdown_tracing();

    if let Err(e) = result {
        if json {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        } else {
            eprintln!("  {} {e}", style("✗").red().bold());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "gmsg", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Personas = &cli.command {
        return cli::contact::list_personas(cli.json);
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Signup { email, password } => {
            cli::auth::signup(&state, email, password, cli.json).await?;
        }
        Commands::Login { email, password } => {
            cli::auth::login(&state, email, password, cli.json).await?;
        }
        Commands::Logout => cli::auth::logout(&state, cli.json).await?,
        Commands::Whoami => cli::auth::whoami(&state, cli.json).await?,

        Commands::Contacts { action } => match action {
            ContactsCommand::List => cli::contact::list_contacts(&state, cli.json).await?,
            ContactsCommand::Add {
                name,
                ai,
                persona,
                instruction,
            } => {
                cli::contact::add_contact(&state, name, ai, persona, instruction, cli.json).await?;
            }
            ContactsCommand::Delete { contact, force } => {
                cli::contact::delete_contact(&state, &contact, force, cli.json).await?;
            }
        },

        Commands::Send { contact, text } => {
            cli::contact::send(&state, &contact, &text.join(" "), cli.json).await?;
        }
        Commands::History { contact, limit } => {
            cli::contact::history(&state, &contact, limit, cli.json).await?;
        }
        Commands::Chat { contact } => cli::chat::loop_runner::run_chat_loop(&state, contact).await?,
        Commands::Status => cli::status::status(&state, cli.json).await?,

        Commands::Personas | Commands::Completions { .. } => {}
    }

    Ok(())
}
