use anyhow::Result;
use attendance_core::EventId;
use attendance_core::notify::DispatchOutcome;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::utils::tui;

pub async fn run(client: &Client, event_id: &str) -> Result<()> {
    let id: EventId = event_id.parse()?;

    let spinner = tui::create_spinner("Sending notifications...");
    let result = client.notify(id).await;
    spinner.finish_and_clear();
    let response = result?;

    match response.outcome {
        DispatchOutcome::Sent { .. } => println!("{}", response.message.green()),
        DispatchOutcome::PublicEvent | DispatchOutcome::NoRecipients => {
            println!("{}", response.message.yellow())
        }
    }
    Ok(())
}
