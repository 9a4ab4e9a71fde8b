use anyhow::{Context, Result};
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;

use crate::render::Render;

pub fn run(config: &PollCalConfig, date: &str) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;

    let events = config.open_store().find_by_date(date);
    println!("{}", date.format("%A %-d %B %Y").bold());

    if events.is_empty() {
        println!("{}", "No events".dimmed());
        return Ok(());
    }

    let layout = config.timeline();
    let blocks = layout.layout_day(&events);
    for block in &blocks {
        println!("{}  {}", block.render(), format!("#{}", block.event_id).dimmed());
    }

    let skipped = events.len() - blocks.len();
    if skipped > 0 {
        println!("{}", format!("{skipped} undecided").dimmed());
    }

    Ok(())
}
