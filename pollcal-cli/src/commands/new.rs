use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use dialoguer::Input;
use owo_colors::OwoColorize;
use pollcal_core::config::PollCalConfig;
use pollcal_core::{EventDraft, EventLocation, EventTime};

use crate::render::Render;

pub struct NewArgs {
    pub date: String,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub slots: Vec<String>,
    pub location: Option<String>,
    pub places: Vec<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub fn run(config: &PollCalConfig, args: NewArgs) -> Result<()> {
    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", args.date))?;

    let title = match args.title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .allow_empty(true)
            .interact_text()?,
    };

    let mut draft = EventDraft::new(title, date);

    if let Some(time) = parse_time(args.start, args.end, &args.slots)? {
        draft = draft.with_time(time);
    }
    if let Some(location) = parse_location(args.location, args.places) {
        draft = draft.with_location(location);
    }
    if let Some(description) = args.description {
        draft = draft.with_description(description);
    }
    if let Some(color) = args.color {
        draft = draft.with_color(color);
    }

    let store = config.open_store();
    let before = store.load().len();
    let events = store.add(draft);

    match events.last() {
        Some(event) if events.len() > before => {
            println!("{}", format!("  Created #{}", event.id).green());
            println!("  {}", event.render());
        }
        _ => bail!("Event was not created"),
    }

    Ok(())
}

fn parse_time(
    start: Option<String>,
    end: Option<String>,
    slots: &[String],
) -> Result<Option<EventTime>> {
    if !slots.is_empty() {
        let ranges = slots
            .iter()
            .map(|slot| parse_range(slot))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Some(EventTime::poll(ranges)));
    }

    let Some(start) = start else {
        return Ok(None);
    };
    check_clock(&start)?;
    if let Some(end) = &end {
        check_clock(end)?;
    }
    Ok(Some(EventTime::fixed(start, end)))
}

fn parse_location(location: Option<String>, places: Vec<String>) -> Option<EventLocation> {
    if !places.is_empty() {
        return Some(EventLocation::poll(places));
    }
    location
        .filter(|l| !l.trim().is_empty())
        .map(EventLocation::fixed)
}

/// Split `HH:MM-HH:MM` into its start and end.
fn parse_range(range: &str) -> Result<(String, String)> {
    let Some((start, end)) = range.split_once('-') else {
        bail!("Invalid slot '{range}', expected HH:MM-HH:MM");
    };
    let (start, end) = (start.trim(), end.trim());
    check_clock(start)?;
    check_clock(end)?;
    Ok((start.to_string(), end.to_string()))
}

fn check_clock(time: &str) -> Result<()> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .with_context(|| format!("Invalid time '{time}', expected HH:MM"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_splits_on_dash() {
        assert_eq!(
            parse_range("09:00-10:30").unwrap(),
            ("09:00".to_string(), "10:30".to_string())
        );
        assert_eq!(
            parse_range(" 14:00 - 15:00 ").unwrap(),
            ("14:00".to_string(), "15:00".to_string())
        );
    }

    #[test]
    fn parse_range_rejects_bad_input() {
        assert!(parse_range("09:00").is_err());
        assert!(parse_range("9am-10am").is_err());
        assert!(parse_range("25:00-26:00").is_err());
    }

    #[test]
    fn slots_make_a_poll() {
        let time = parse_time(None, None, &["09:00-10:00".into(), "14:00-15:00".into()])
            .unwrap()
            .unwrap();
        let EventTime::Poll { slots } = time else {
            panic!("expected a time poll");
        };
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].id, 1);
        assert_eq!(slots[1].start, "14:00");
    }

    #[test]
    fn start_alone_is_fixed_without_end() {
        let time = parse_time(Some("08:15".into()), None, &[]).unwrap();
        assert_eq!(time, Some(EventTime::fixed("08:15", None)));
        assert_eq!(parse_time(None, None, &[]).unwrap(), None);
    }

    #[test]
    fn blank_location_is_dropped() {
        assert_eq!(parse_location(Some("  ".into()), vec![]), None);
        assert_eq!(
            parse_location(Some("Lyon".into()), vec![]),
            Some(EventLocation::fixed("Lyon"))
        );
        assert!(matches!(
            parse_location(None, vec!["A".into(), "B".into()]),
            Some(EventLocation::Poll { .. })
        ));
    }
}
