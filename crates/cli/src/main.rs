//! Pivot Journal CLI - account, entry, and export tools.
//!
//! # Usage
//!
//! ```bash
//! # Start a guest session
//! pivot-cli account guest
//!
//! # Create an account / sign in
//! pivot-cli account create -e me@example.com -p hunter22
//! pivot-cli account login -e me@example.com -p hunter22
//!
//! # Write and read entries
//! pivot-cli entry set -d 42 "Today I noticed..."
//! pivot-cli entry show -d 42
//! pivot-cli entry list
//!
//! # Show a day's prompt
//! pivot-cli prompt -d 183
//!
//! # Export the whole journal as plain text
//! pivot-cli export -o journal.txt
//! ```
//!
//! Data lives under `PIVOT_DATA_DIR` (default `data`); without a signed-in
//! session, `entry set` writes to the device-local scratch cache, which is
//! migrated into the account on the next signed-in command.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pivot_journal::JournalConfig;

mod commands;

#[derive(Parser)]
#[command(name = "pivot-cli")]
#[command(author, version, about = "Pivot Year journal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Read and write journal entries
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Show the guided prompt for a day
    Prompt {
        /// Day of the journal year (1-365)
        #[arg(short, long)]
        day: u16,
    },
    /// Export the journal as plain text
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Start an anonymous guest session
    Guest,
    /// Create a new email/password account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Sign in to an existing account
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// End the current session
    Logout,
}

#[derive(Subcommand)]
enum EntryAction {
    /// Write the entry for a day
    Set {
        /// Day of the journal year (1-365)
        #[arg(short, long)]
        day: u16,

        /// Entry text
        text: String,
    },
    /// Show the entry (and prompt) for a day
    Show {
        /// Day of the journal year (1-365)
        #[arg(short, long)]
        day: u16,
    },
    /// List all days with entries
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match JournalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: JournalConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Account { action } => match action {
            AccountAction::Guest => commands::account::guest(&config).await?,
            AccountAction::Create { email, password } => {
                commands::account::create(&config, &email, &password).await?;
            }
            AccountAction::Login { email, password } => {
                commands::account::login(&config, &email, &password).await?;
            }
            AccountAction::Logout => commands::account::logout(&config)?,
        },
        Commands::Entry { action } => match action {
            EntryAction::Set { day, text } => commands::entry::set(&config, day, &text).await?,
            EntryAction::Show { day } => commands::entry::show(&config, day).await?,
            EntryAction::List => commands::entry::list(&config).await?,
        },
        Commands::Prompt { day } => commands::prompt::show(day)?,
        Commands::Export { output } => commands::export::run(&config, output.as_deref()).await?,
    }
    Ok(())
}
