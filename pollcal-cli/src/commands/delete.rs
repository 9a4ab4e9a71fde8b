use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;

pub fn run(config: &PollCalConfig, id: u64) -> Result<()> {
    let store = config.open_store();

    let Some(event) = store.get(id) else {
        bail!("No event with id {id}");
    };

    store.remove_by_id(id);
    println!("{}", format!("  Deleted: {}", event.title).red());

    Ok(())
}
