//! TUI rendering traits for portal types.
//!
//! Extension traits that add colored terminal rendering to attendance-core
//! types using owo_colors.

use attendance_core::dashboard::{Dashboard, DashboardEntry, Tab};
use attendance_core::{Event, EventState, StatusReport, UserProfile};
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventState {
    fn render(&self) -> String {
        match self {
            EventState::Upcoming => self.label().blue().to_string(),
            EventState::Ongoing => self.label().green().bold().to_string(),
            EventState::Finished => self.label().dimmed().to_string(),
            EventState::InfoMissing => self.label().yellow().to_string(),
        }
    }
}

impl Render for StatusReport {
    fn render(&self) -> String {
        match self.remaining {
            Some(remaining) => format!("{} {}", self.state.render(), remaining.to_string().green()),
            None => self.state.render(),
        }
    }
}

impl Render for DashboardEntry {
    fn render(&self) -> String {
        let mine = if self.is_mine {
            format!(" {}", "(yours)".cyan())
        } else {
            String::new()
        };

        let mut lines = vec![
            format!("{}{}  {}", self.event.title.bold(), mine, self.status.render()),
            format!("   {}", render_when(&self.event).dimmed()),
        ];
        if let Some(location) = &self.event.location {
            lines.push(format!("   {} {}", "@".dimmed(), location));
        }
        lines.push(format!(
            "   {} {}",
            "for".dimmed(),
            self.event.targeting.describe().dimmed()
        ));
        lines.push(format!("   {}", self.event.id.to_string().dimmed()));
        lines.join("\n")
    }
}

impl Render for UserProfile {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("{} {}", self.display_name().bold(), format!("@{}", self.username).dimmed()),
            format!("   role      {}", self.role),
        ];
        if let Some(unit) = self.unit {
            lines.push(format!("   unit      {unit}"));
        }
        if let Some(year) = self.year {
            lines.push(format!("   year      {year}"));
        }
        if let Some(section) = self.section {
            lines.push(format!("   section   {section}"));
        }
        if let Some(position) = &self.position {
            lines.push(format!("   position  {position}"));
        }
        if self.can_create_events {
            lines.push(format!("   {}", "can create events".green()));
        }
        if self.is_admin {
            lines.push(format!("   {}", "administrator".magenta()));
        }
        lines.join("\n")
    }
}

/// Both tabs, upcoming first.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut lines = Vec::new();

    for (tab, heading) in [(Tab::Upcoming, "Upcoming"), (Tab::Finished, "Finished")] {
        let entries: Vec<&DashboardEntry> = dashboard.tab(tab).collect();
        lines.push(format!("{} {}", heading.bold().underline(), format!("({})", entries.len()).dimmed()));

        if entries.is_empty() {
            lines.push(format!("   {}", "No events".dimmed()));
        }
        for entry in entries {
            lines.push(entry.render());
        }
        lines.push(String::new());
    }

    lines.push(
        format!(
            "Updated {}",
            dashboard
                .refreshed_at()
                .with_timezone(&Local)
                .format("%H:%M:%S")
        )
        .dimmed()
        .to_string(),
    );
    lines.join("\n")
}

/// Start and end in local time, e.g. "Tue Aug 12 09:00 - 12:00".
pub fn render_when(event: &Event) -> String {
    match (event.start, event.end) {
        (Some(start), Some(end)) => {
            let start = local(start);
            let end = local(end);
            if start.date_naive() == end.date_naive() {
                format!("{} - {}", start.format("%a %b %-d %H:%M"), end.format("%H:%M"))
            } else {
                format!("{} - {}", start.format("%a %b %-d %H:%M"), end.format("%a %b %-d %H:%M"))
            }
        }
        (Some(start), None) => format!("{} - ?", local(start).format("%a %b %-d %H:%M")),
        (None, Some(end)) => format!("? - {}", local(end).format("%a %b %-d %H:%M")),
        (None, None) => "Date to be announced".to_string(),
    }
}

fn local(instant: DateTime<Utc>) -> DateTime<Local> {
    instant.with_timezone(&Local)
}
