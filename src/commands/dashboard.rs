use anyhow::Result;
use attendance_core::clock::{Ticker, TimeSync};
use attendance_core::dashboard::Dashboard;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::commands::load_viewer;
use crate::render::render_dashboard;
use crate::utils::tui;

pub async fn run(client: &Client, live: bool) -> Result<()> {
    let spinner = tui::create_spinner("Loading events...");
    let loaded = async {
        let (user, profile) = load_viewer(client).await?;
        let events = client.list_events().await?;
        let clock = TimeSync::sync(client).await;
        anyhow::Ok((user, profile, events, clock))
    }
    .await;
    spinner.finish_and_clear();
    let (user, profile, events, clock) = loaded?;

    let mut dashboard = Dashboard::build(&user, &profile, events, clock.now());

    if !live {
        println!("{}", render_dashboard(&dashboard));
        return Ok(());
    }

    let ticker = Ticker::spawn(Ticker::EVERY_SECOND, move || {
        dashboard.refresh(clock.now());
        tui::clear_screen();
        println!("{}", render_dashboard(&dashboard));
        println!("{}", "Press Ctrl-C to quit".dimmed());
    });

    tokio::signal::ctrl_c().await?;
    ticker.stop();
    Ok(())
}
