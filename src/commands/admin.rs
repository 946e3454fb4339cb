use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

use crate::client::Client;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// List every profile, ordered by last name
    List,
    /// Allow a user to create events
    Grant { user_id: String },
    /// Stop a user from creating events
    Revoke { user_id: String },
}

pub async fn run(client: &Client, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::List => list(client).await,
        AdminCommand::Grant { user_id } => set(client, &user_id, true).await,
        AdminCommand::Revoke { user_id } => set(client, &user_id, false).await,
    }
}

async fn list(client: &Client) -> Result<()> {
    let profiles = client.list_profiles().await?;

    if profiles.is_empty() {
        println!("{}", "No profiles found".dimmed());
        return Ok(());
    }

    for profile in profiles {
        let creator = if profile.can_create_events {
            "creator".green().to_string()
        } else {
            "-".dimmed().to_string()
        };
        let unit = profile.unit.map(|u| u.to_string()).unwrap_or_default();
        println!(
            "{:<24} {:<8} {:<7} {:<8} {}",
            profile.display_name(),
            profile.role.as_str(),
            unit,
            creator,
            profile.id.to_string().dimmed()
        );
    }
    Ok(())
}

async fn set(client: &Client, user_id: &str, allowed: bool) -> Result<()> {
    let profile = client.set_can_create(user_id, allowed).await?;

    if allowed {
        println!("{} can now create events", profile.display_name().green());
    } else {
        println!("{} can no longer create events", profile.display_name().yellow());
    }
    Ok(())
}
