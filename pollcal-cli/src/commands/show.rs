use anyhow::{Result, anyhow};
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;
use pollcal_core::poll::poll_summary;

use crate::render::Render;

pub fn run(config: &PollCalConfig, id: u64) -> Result<()> {
    let event = config
        .open_store()
        .get(id)
        .ok_or_else(|| anyhow!("No event with id {id}"))?;

    println!("{}", event.render());
    println!(
        "   {} {}",
        "Date:".dimmed(),
        event.date.as_deref().unwrap_or("undated")
    );

    if !event.description.is_empty() {
        println!("   {}", event.description);
    }

    if let Some(slots) = event.time_slots() {
        println!("   {}", "Time poll:".dimmed());
        for row in poll_summary(slots, &event.votes.time) {
            println!("     {} {}", format!("[{}]", row.option.id).dimmed(), row.render());
        }
    }

    if let Some(options) = event.location_options() {
        println!("   {}", "Location poll:".dimmed());
        for row in poll_summary(options, &event.votes.location) {
            println!("     {} {}", format!("[{}]", row.option.id).dimmed(), row.render());
        }
    }

    Ok(())
}
