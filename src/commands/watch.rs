use std::io::Write;

use anyhow::Result;
use attendance_core::audience;
use attendance_core::clock::{Ticker, TimeSync};
use attendance_core::{EventId, compute_status};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::client::Client;
use crate::commands::load_viewer;
use crate::render::{Render, render_when};
use crate::utils::tui;

/// Count down an event until it finishes or the user quits.
pub async fn run(client: &Client, event_id: &str) -> Result<()> {
    let id: EventId = event_id.parse()?;

    let spinner = tui::create_spinner("Loading event...");
    let loaded = async {
        let (user, profile) = load_viewer(client).await?;
        let events = client.list_events().await?;
        let clock = TimeSync::sync(client).await;
        anyhow::Ok((user, profile, events, clock))
    }
    .await;
    spinner.finish_and_clear();
    let (user, profile, events, clock) = loaded?;

    let Some(event) = audience::visible_events(&user, &profile, &events)
        .into_iter()
        .find(|e| e.id == id)
        .cloned()
    else {
        anyhow::bail!("Event {} not found", id);
    };

    println!("{}", event.title.bold());
    println!("{}", render_when(&event).dimmed());

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let ticker = Ticker::spawn(Ticker::EVERY_SECOND, move || {
        let status = compute_status(event.start, event.end, clock.now());
        print!("\r\x1B[2K{}", status.render());
        let _ = std::io::stdout().flush();

        if status.state.is_finished() {
            let _ = done_tx.send(());
        }
    });

    tokio::select! {
        _ = done_rx.recv() => {}
        result = tokio::signal::ctrl_c() => result?,
    }
    ticker.stop();
    println!();
    Ok(())
}
