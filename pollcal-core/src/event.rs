//! Event data model.
//!
//! An event lives on one calendar day and carries a time and a location, each
//! of which is either fixed, an open poll among candidate options, or absent.
//! Voters increment per-option counters; the winning option is resolved by
//! [`crate::poll`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COLOR, DEFAULT_TITLE};
use crate::poll::{self, PollOption};
use crate::serde_helpers::lenient_id;

pub type EventId = u64;

/// Identifier of a time slot or location option, unique within its event.
pub type OptionId = u64;

/// Vote counts keyed by slot or option id. Missing keys mean zero votes.
pub type Tally = BTreeMap<OptionId, u64>;

/// Canonical calendar-day identity: year, zero-based month, day of month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    pub y: i32,
    /// Zero-based month (0 = January).
    pub m: u32,
    pub d: u32,
}

impl DayKey {
    /// Build a day key, returning `None` if it does not name a real calendar day.
    pub fn new(y: i32, m: u32, d: u32) -> Option<Self> {
        let key = DayKey { y, m, d };
        key.to_date().map(|_| key)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        DayKey {
            y: date.year(),
            m: date.month0(),
            d: date.day(),
        }
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.y, self.m.checked_add(1)?, self.d)
    }

    /// `YYYY-MM-DD` form stored alongside the key.
    pub fn iso_date(&self) -> Option<String> {
        self.to_date().map(|d| d.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        DayKey::from_date(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.iso_date() {
            Some(iso) => write!(f, "{iso}"),
            None => write!(f, "{}-{}-{}", self.y, self.m.saturating_add(1), self.d),
        }
    }
}

/// A candidate time range in a time poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(deserialize_with = "lenient_id::deserialize")]
    pub id: OptionId,
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// A candidate place in a location poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOption {
    #[serde(deserialize_with = "lenient_id::deserialize")]
    pub id: OptionId,
    pub value: String,
}

impl PollOption for Slot {
    fn option_id(&self) -> OptionId {
        self.id
    }
}

impl PollOption for LocationOption {
    fn option_id(&self) -> OptionId {
        self.id
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.end.is_empty() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}–{}", self.start, self.end)
        }
    }
}

impl fmt::Display for LocationOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// When an event happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventTime {
    Fixed {
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
    Poll { slots: Vec<Slot> },
}

impl EventTime {
    pub fn fixed(start: impl Into<String>, end: Option<String>) -> Self {
        EventTime::Fixed {
            start: start.into(),
            end,
        }
    }

    /// Time poll over `(start, end)` pairs, numbered 1..=n in order.
    pub fn poll<S, I>(ranges: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, S)>,
    {
        let slots = ranges
            .into_iter()
            .zip(1..)
            .map(|((start, end), id)| Slot {
                id,
                start: start.into(),
                end: end.into(),
            })
            .collect();
        EventTime::Poll { slots }
    }
}

/// Where an event happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventLocation {
    Fixed { value: String },
    Poll { options: Vec<LocationOption> },
}

impl EventLocation {
    pub fn fixed(value: impl Into<String>) -> Self {
        EventLocation::Fixed {
            value: value.into(),
        }
    }

    /// Location poll over `values`, numbered 1..=n in order.
    pub fn poll<S, I>(values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let options = values
            .into_iter()
            .zip(1..)
            .map(|(value, id)| LocationOption {
                id,
                value: value.into(),
            })
            .collect();
        EventLocation::Poll { options }
    }
}

/// Optional image payloads. Each is an opaque string (usually a data URL).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default, alias = "pp", skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
}

impl Images {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.presentation.is_none()
    }
}

/// Which poll of an event a vote targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    Time,
    Location,
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PollKind::Time => write!(f, "time"),
            PollKind::Location => write!(f, "location"),
        }
    }
}

impl FromStr for PollKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "time" => Ok(PollKind::Time),
            "location" => Ok(PollKind::Location),
            other => Err(format!(
                "Unknown poll kind '{other}'. Expected 'time' or 'location'"
            )),
        }
    }
}

/// Per-poll vote counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    #[serde(default)]
    pub time: Tally,
    #[serde(default)]
    pub location: Tally,
}

impl Votes {
    pub fn tally(&self, kind: PollKind) -> &Tally {
        match kind {
            PollKind::Time => &self.time,
            PollKind::Location => &self.location,
        }
    }

    pub fn count(&self, kind: PollKind, option_id: OptionId) -> u64 {
        self.tally(kind).get(&option_id).copied().unwrap_or(0)
    }

    /// Add one vote. Counters never decrease.
    pub fn increment(&mut self, kind: PollKind, option_id: OptionId) {
        let tally = match kind {
            PollKind::Time => &mut self.time,
            PollKind::Location => &mut self.location,
        };
        let count = tally.entry(option_id).or_insert(0);
        *count = count.saturating_add(1);
    }
}

/// A calendar event as persisted by [`crate::store::EventStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// ISO date derived from the day key; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Absent only on best-effort legacy records.
    #[serde(flatten)]
    pub day: Option<DayKey>,
    #[serde(default)]
    pub time: Option<EventTime>,
    #[serde(default)]
    pub location: Option<EventLocation>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub description: String,
    pub color: String,
    #[serde(default)]
    pub votes: Votes,
}

impl Event {
    pub fn is_on(&self, day: DayKey) -> bool {
        self.day == Some(day)
    }

    /// Slots of a time poll, or `None` if the time is fixed or absent.
    pub fn time_slots(&self) -> Option<&[Slot]> {
        match &self.time {
            Some(EventTime::Poll { slots }) => Some(slots),
            _ => None,
        }
    }

    /// Options of a location poll, or `None` if the location is fixed or absent.
    pub fn location_options(&self) -> Option<&[LocationOption]> {
        match &self.location {
            Some(EventLocation::Poll { options }) => Some(options),
            _ => None,
        }
    }

    /// Whether `option_id` names an option of this event's `kind` poll.
    pub fn has_option(&self, kind: PollKind, option_id: OptionId) -> bool {
        match kind {
            PollKind::Time => self
                .time_slots()
                .is_some_and(|slots| slots.iter().any(|s| s.id == option_id)),
            PollKind::Location => self
                .location_options()
                .is_some_and(|opts| opts.iter().any(|o| o.id == option_id)),
        }
    }

    /// Currently winning slot of a time poll.
    pub fn winning_slot(&self) -> Option<&Slot> {
        poll::resolve_winner(self.time_slots()?, &self.votes.time)
    }

    /// Currently winning option of a location poll.
    pub fn winning_location(&self) -> Option<&LocationOption> {
        poll::resolve_winner(self.location_options()?, &self.votes.location)
    }

    /// Human-readable time: fixed range, winning slot, or `None` when untimed.
    pub fn display_time(&self) -> Option<String> {
        match &self.time {
            Some(EventTime::Fixed { start, end }) if !start.is_empty() => Some(match end {
                Some(end) if !end.is_empty() => format!("{start}–{end}"),
                _ => start.clone(),
            }),
            Some(EventTime::Poll { .. }) => self.winning_slot().map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Human-readable place: fixed value or winning option.
    pub fn display_location(&self) -> Option<&str> {
        match &self.location {
            Some(EventLocation::Fixed { value }) => Some(value),
            Some(EventLocation::Poll { .. }) => self.winning_location().map(|o| o.value.as_str()),
            None => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Compose payload supplied by the event-creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    pub date: DayKey,
    #[serde(default)]
    pub time: Option<EventTime>,
    #[serde(default)]
    pub location: Option<EventLocation>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        EventDraft {
            title: title.into(),
            date: DayKey::from_date(date),
            time: None,
            location: None,
            images: None,
            description: String::new(),
            color: None,
        }
    }

    pub fn with_time(mut self, time: EventTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_location(mut self, location: EventLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_images(mut self, images: Images) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Defaults filled into records that omit optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefaults {
    pub title: String,
    pub color: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        RecordDefaults {
            title: DEFAULT_TITLE.to_string(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Request from the event viewer to add one vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub event_id: EventId,
    pub kind: PollKind,
    pub option_id: OptionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_event() -> Event {
        Event {
            id: 1,
            title: "Team lunch".to_string(),
            date: Some("2025-03-20".to_string()),
            day: Some(DayKey { y: 2025, m: 2, d: 20 }),
            time: Some(EventTime::poll([("12:00", "13:00"), ("13:00", "14:00")])),
            location: Some(EventLocation::poll(["Cantine", "Parc"])),
            images: None,
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            votes: Votes::default(),
        }
    }

    #[test]
    fn test_day_key_is_zero_based() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let key = DayKey::from_date(date);
        assert_eq!(key, DayKey { y: 2025, m: 0, d: 31 });
        assert_eq!(key.iso_date().as_deref(), Some("2025-01-31"));
        assert_eq!(key.to_date(), Some(date));
    }

    #[test]
    fn test_day_key_rejects_impossible_days() {
        assert!(DayKey::new(2025, 1, 29).is_none());
        assert!(DayKey::new(2025, 12, 1).is_none());
        assert!(DayKey::new(2024, 1, 29).is_some());
    }

    #[test]
    fn test_poll_constructors_number_from_one() {
        let EventTime::Poll { slots } = EventTime::poll([("09:00", "10:00"), ("10:00", "11:00")])
        else {
            panic!("expected a time poll");
        };
        assert_eq!(slots.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);

        let EventLocation::Poll { options } = EventLocation::poll(["A", "B", "C"]) else {
            panic!("expected a location poll");
        };
        assert_eq!(options[2].id, 3);
        assert_eq!(options[2].value, "C");
    }

    #[test]
    fn test_votes_increment_and_count() {
        let mut votes = Votes::default();
        votes.increment(PollKind::Time, 2);
        votes.increment(PollKind::Time, 2);
        votes.increment(PollKind::Location, 1);
        assert_eq!(votes.count(PollKind::Time, 2), 2);
        assert_eq!(votes.count(PollKind::Time, 1), 0);
        assert_eq!(votes.count(PollKind::Location, 1), 1);
    }

    #[test]
    fn test_winning_options_follow_votes() {
        let mut event = make_test_event();
        assert_eq!(event.winning_slot().map(|s| s.id), Some(1));
        assert_eq!(event.display_location(), Some("Cantine"));

        event.votes.increment(PollKind::Time, 2);
        event.votes.increment(PollKind::Location, 2);
        assert_eq!(event.display_time().as_deref(), Some("13:00–14:00"));
        assert_eq!(event.display_location(), Some("Parc"));
    }

    #[test]
    fn test_has_option() {
        let event = make_test_event();
        assert!(event.has_option(PollKind::Time, 2));
        assert!(!event.has_option(PollKind::Time, 3));
        assert!(event.has_option(PollKind::Location, 1));
    }

    #[test]
    fn test_serialized_shape() {
        let event = make_test_event();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["y"], 2025);
        assert_eq!(value["m"], 2);
        assert_eq!(value["d"], 20);
        assert_eq!(value["time"]["type"], "poll");
        assert_eq!(value["time"]["slots"][0]["start"], "12:00");
        assert_eq!(value["location"]["type"], "poll");
        assert!(value["votes"]["time"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_poll_kind_from_str() {
        assert_eq!("time".parse::<PollKind>(), Ok(PollKind::Time));
        assert_eq!("Location".parse::<PollKind>(), Ok(PollKind::Location));
        assert!("place".parse::<PollKind>().is_err());
    }
}
