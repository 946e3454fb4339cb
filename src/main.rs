mod client;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use attendance_core::config::PortalConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::client::Client;
use crate::commands::admin::AdminCommand;
use crate::commands::events::EventsCommand;
use crate::commands::profile::ProfileCommand;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "See the events meant for you and manage your attendance portal account")]
struct Cli {
    /// Act as this user id instead of the one in the config file
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events you can see, split into upcoming and finished
    Dashboard {
        /// Keep the dashboard open and refresh statuses every second
        #[arg(short, long)]
        live: bool,
    },
    /// Live countdown for one event
    Watch { event_id: String },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
    /// Create or edit events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Email everyone an event targets
    Notify { event_id: String },
    /// Manage who may create events (administrators only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Show which role an email address gets
    Role { email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::load()?;
    let client = Client::new(&config.client, cli.user);

    match cli.command {
        Commands::Dashboard { live } => commands::dashboard::run(&client, live).await,
        Commands::Watch { event_id } => commands::watch::run(&client, &event_id).await,
        Commands::Profile { command } => {
            commands::profile::run(&client, command.unwrap_or(ProfileCommand::Show)).await
        }
        Commands::Events { command } => commands::events::run(&client, command).await,
        Commands::Notify { event_id } => commands::notify::run(&client, &event_id).await,
        Commands::Admin { command } => commands::admin::run(&client, command).await,
        Commands::Role { email } => commands::role::run(&config.domain, &email),
    }
}
