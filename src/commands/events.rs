use anyhow::{Context, Result};
use attendance_core::{EventDraft, EventId, Role, Section, TargetingCriteria, Unit, YearLevel};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::render::render_when;

#[derive(Subcommand)]
pub enum EventsCommand {
    /// Create an event (needs event creation permission)
    Create {
        title: String,

        #[command(flatten)]
        fields: EventFields,
    },
    /// Edit one of your events; fields not given keep their value
    Edit {
        event_id: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: EventFields,
    },
}

#[derive(Args)]
pub struct EventFields {
    #[arg(long)]
    pub description: Option<String>,

    /// Start date/time (e.g., "2025-03-20T15:00", local time, or RFC 3339)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date/time, same formats as --start
    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Only show the event to these roles (repeatable). No roles means everyone.
    #[arg(long = "role")]
    pub roles: Vec<Role>,

    /// Restrict to these units (student, faculty and staff targets; needs --role)
    #[arg(long = "unit", requires = "roles")]
    pub units: Vec<Unit>,

    /// Restrict to these year levels (student targets)
    #[arg(long = "year", requires = "roles")]
    pub years: Vec<YearLevel>,

    /// Restrict to these sections (student targets)
    #[arg(long = "section", requires = "roles")]
    pub sections: Vec<Section>,

    /// Make an edited event visible to everyone again
    #[arg(long, conflicts_with = "roles")]
    pub public: bool,
}

impl EventFields {
    fn targeting(&self) -> Option<TargetingCriteria> {
        if self.public {
            return Some(TargetingCriteria::public());
        }
        if self.roles.is_empty() {
            return None;
        }
        Some(
            TargetingCriteria::default()
                .with_roles(self.roles.iter().copied())
                .with_units(self.units.iter().copied())
                .with_year_levels(self.years.iter().copied())
                .with_sections(self.sections.iter().copied()),
        )
    }

    /// Overwrite the fields of `draft` that were given on the command line.
    fn apply_to(self, draft: &mut EventDraft) -> Result<()> {
        if let Some(targeting) = self.targeting() {
            draft.targeting = targeting;
        }
        if let Some(start) = &self.start {
            draft.start = Some(parse_datetime(start)?);
        }
        if let Some(end) = &self.end {
            draft.end = Some(parse_datetime(end)?);
        }
        if self.description.is_some() {
            draft.description = self.description;
        }
        if self.location.is_some() {
            draft.location = self.location;
        }
        Ok(())
    }
}

pub async fn run(client: &Client, command: EventsCommand) -> Result<()> {
    match command {
        EventsCommand::Create { title, fields } => {
            let mut draft = EventDraft::new(title);
            fields.apply_to(&mut draft)?;

            let event = client.create_event(&draft).await?;
            println!("{} {}", "Created".green(), event.title.bold());
            println!("   {}", render_when(&event).dimmed());
            println!("   {} {}", "for".dimmed(), event.targeting.describe());
            println!("   {}", event.id.to_string().dimmed());
            Ok(())
        }
        EventsCommand::Edit {
            event_id,
            title,
            fields,
        } => {
            let id: EventId = event_id.parse()?;
            let existing = client
                .list_events()
                .await?
                .into_iter()
                .find(|e| e.id == id)
                .with_context(|| format!("Event {id} not found"))?;

            let mut draft = EventDraft {
                title: title.unwrap_or(existing.title),
                description: existing.description,
                start: existing.start,
                end: existing.end,
                location: existing.location,
                targeting: existing.targeting,
            };
            fields.apply_to(&mut draft)?;

            let event = client.update_event(id, &draft).await?;
            println!("{} {}", "Updated".green(), event.title.bold());
            println!("   {}", render_when(&event).dimmed());
            println!("   {} {}", "for".dimmed(), event.targeting.describe());
            Ok(())
        }
    }
}

/// Parse an RFC 3339 timestamp, or a date and time without offset in local time.
fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Local
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("'{input}' is ambiguous or skipped in local time"));
        }
    }

    anyhow::bail!("Invalid date/time '{input}'. Use e.g. 2025-03-20T15:00")
}
