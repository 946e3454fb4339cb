use anyhow::Result;
use attendance_core::service::{ProfileForm, ProfileView};
use attendance_core::{Role, Section, Unit, YearLevel};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::render::Render;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your profile (the default)
    Show,
    /// Create or replace your profile
    Set(ProfileArgs),
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// faculty or staff; students and guests get theirs from their email
    #[arg(long)]
    pub role: Option<Role>,
    #[arg(long)]
    pub unit: Option<Unit>,
    /// Year level, 1 to 4 (students)
    #[arg(long)]
    pub year: Option<YearLevel>,
    /// Irregular or A to G (students)
    #[arg(long)]
    pub section: Option<Section>,
    /// Faculty position, e.g. "Instructor I"
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub photo_consent: bool,
    #[arg(long)]
    pub social_media_consent: bool,
}

impl From<ProfileArgs> for ProfileForm {
    fn from(args: ProfileArgs) -> Self {
        ProfileForm {
            username: args.username,
            first_name: args.first_name,
            last_name: args.last_name,
            role: args.role,
            unit: args.unit,
            year: args.year,
            section: args.section,
            position: args.position,
            photo_consent: args.photo_consent,
            social_media_consent: args.social_media_consent,
        }
    }
}

pub async fn run(client: &Client, command: ProfileCommand) -> Result<()> {
    match command {
        ProfileCommand::Show => show(client).await,
        ProfileCommand::Set(args) => {
            let profile = client.save_profile(&args.into()).await?;
            println!("{}", "Profile saved".green());
            println!("{}", profile.render());
            Ok(())
        }
    }
}

async fn show(client: &Client) -> Result<()> {
    match client.profile().await? {
        ProfileView::Existing { profile } => println!("{}", profile.render()),
        ProfileView::FirstTimeSetup { setup } => {
            println!("{}", "No profile yet".yellow());
            match setup.role {
                Some(role) => println!("Your role will be {}.", role.bold()),
                None => {
                    let roles: Vec<String> = setup.allowed_roles.iter().map(|r| r.to_string()).collect();
                    println!("Choose a role with --role: {}", roles.join(" or "));
                }
            }
            println!("\nSet it up with:\n  attendance profile set --username <name>");
        }
    }
    Ok(())
}
