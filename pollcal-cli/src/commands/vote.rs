use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;
use pollcal_core::{PollKind, VoteRequest};

pub fn run(config: &PollCalConfig, id: u64, kind: PollKind, option_id: u64) -> Result<()> {
    let store = config.open_store();

    let Some(event) = store.get(id) else {
        bail!("No event with id {id}");
    };
    if !event.has_option(kind, option_id) {
        bail!("Event #{id} has no {kind} option {option_id}");
    }

    let events = store.vote(VoteRequest {
        event_id: id,
        kind,
        option_id,
    });

    let chosen = events.iter().find(|e| e.id == id).and_then(|e| match kind {
        PollKind::Time => e.winning_slot().map(|s| s.to_string()),
        PollKind::Location => e.winning_location().map(|o| o.value.clone()),
    });

    println!("{}", format!("  Voted for {kind} option {option_id}").green());
    if let Some(chosen) = chosen {
        println!("  {} {}", "Leading:".dimmed(), chosen);
    }

    Ok(())
}
