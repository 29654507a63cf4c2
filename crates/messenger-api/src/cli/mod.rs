//! CLI command definitions and dispatch for the `gmsg` binary.
//!
//! Uses clap derive macros for argument parsing. Contact management follows
//! a noun-verb pattern (`gmsg contacts add`); everything else is a single verb.

pub mod auth;
pub mod chat;
pub mod contact;
pub mod display;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with people and AI personas from your terminal.
#[derive(Parser)]
#[command(name = "gmsg", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in.
    #[command(alias = "register")]
    Signup {
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted, hidden, when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in to an existing account.
    Login {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and drop all AI sessions.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Manage contacts (list, add, delete).
    #[command(alias = "contact")]
    Contacts {
        #[command(subcommand)]
        action: ContactsCommand,
    },

    /// List the built-in AI personalities.
    Personas,

    /// Send a single message to a contact.
    Send {
        /// Contact name or id.
        contact: String,

        /// Message text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the conversation with a contact.
    History {
        /// Contact name or id.
        contact: String,

        /// Show only the last N messages (at least 1).
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },

    /// Start an interactive chat session.
    Chat {
        /// Contact name or id (asked for when omitted).
        contact: Option<String>,
    },

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ContactsCommand {
    /// List contacts.
    #[command(alias = "ls")]
    List,

    /// Add a contact (interactive when flags are missing).
    Add {
        /// Display name.
        #[arg(long)]
        name: Option<String>,

        /// Make this an AI contact.
        #[arg(long)]
        ai: bool,

        /// Preset personality for an AI contact (name or slug).
        #[arg(long, conflicts_with = "instruction")]
        persona: Option<String>,

        /// Custom system instruction for an AI contact.
        #[arg(long)]
        instruction: Option<String>,
    },

    /// Delete a contact and its conversation.
    #[command(alias = "rm")]
    Delete {
        /// Contact name or id.
        contact: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_joins_words() {
        let cli = Cli::try_parse_from(["gmsg", "send", "Alice", "hello", "there"]).unwrap();
        match cli.command {
            Commands::Send { contact, text } => {
                assert_eq!(contact, "Alice");
                assert_eq!(text.join(" "), "hello there");
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_parse_send_requires_text() {
        assert!(Cli::try_parse_from(["gmsg", "send", "Alice"]).is_err());
    }

    #[test]
    fn test_parse_contacts_add_ai_with_persona() {
        let cli = Cli::try_parse_from([
            "gmsg",
            "contacts",
            "add",
            "--name",
            "Gem",
            "--ai",
            "--persona",
            "witty-friend",
        ])
        .unwrap();
        match cli.command {
            Commands::Contacts {
                action:
                    ContactsCommand::Add {
                        name,
                        ai,
                        persona,
                        instruction,
                    },
            } => {
                assert_eq!(name.as_deref(), Some("Gem"));
                assert!(ai);
                assert_eq!(persona.as_deref(), Some("witty-friend"));
                assert!(instruction.is_none());
            }
            _ => panic!("expected contacts add"),
        }
    }

    #[test]
    fn test_persona_conflicts_with_instruction() {
        let result = Cli::try_parse_from([
            "gmsg",
            "contacts",
            "add",
            "--ai",
            "--persona",
            "witty-friend",
            "--instruction",
            "Be brief.",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gmsg", "contacts", "rm", "Bob", "-f", "--json", "-vv"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Contacts {
                action: ContactsCommand::Delete { contact, force },
            } => {
                assert_eq!(contact, "Bob");
                assert!(force);
            }
            _ => panic!("expected contacts delete"),
        }
    }

    #[test]
    fn test_history_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["gmsg", "history", "Bob", "-n", "0"]).is_err());

        let cli = Cli::try_parse_from(["gmsg", "history", "Bob", "--limit", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History { limit: Some(3), .. }
        ));
    }

    #[test]
    fn test_chat_contact_is_optional() {
        let cli = Cli::try_parse_from(["gmsg", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { contact: None }));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
