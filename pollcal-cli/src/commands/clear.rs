use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;

pub fn run(config: &PollCalConfig, yes: bool) -> Result<()> {
    let store = config.open_store();
    let total = store.load().len();

    if total == 0 {
        println!("{}", "Nothing to clear".dimmed());
        return Ok(());
    }

    // Confirm unless --yes
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} {}?",
                total,
                if total == 1 { "event" } else { "events" }
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    store.clear();
    println!("{}", format!("  Cleared {total} events").red());

    Ok(())
}
