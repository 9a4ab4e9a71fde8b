//! Record normalization.
//!
//! Persisted records come in several shapes: records written by the current
//! store, bare dates, objects whose date sits under an alternate key, and
//! older objects with no usable date at all. Each raw JSON value is first
//! classified into a [`RawRecord`] variant, then converted into an [`Event`]
//! with every optional field filled in. Values that cannot be converted are
//! dropped by the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{PollCalError, PollCalResult};
use crate::event::{
    DayKey, Event, EventDraft, EventId, EventLocation, EventTime, Images, RecordDefaults, Tally,
    Votes,
};
use crate::serde_helpers::{value_as_integer, value_as_u64};

/// Keys that may carry the date of a record that has no day key, in lookup order.
const DATE_ALIASES: [&str; 3] = ["date", "dt", "start"];

/// Recognized shapes of a raw persisted record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawRecord<'a> {
    /// Object with integral `y`, `m` and `d`.
    Normalized(&'a Map<String, Value>),
    /// Bare string or number holding a date.
    DatePrimitive(&'a Value),
    /// Object with a date under one of [`DATE_ALIASES`].
    DateAliased {
        fields: &'a Map<String, Value>,
        date: &'a Value,
    },
    /// Any other object; kept without a day key.
    Legacy(&'a Map<String, Value>),
    /// `null`, booleans and arrays.
    Rejected,
}

impl<'a> RawRecord<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(_) | Value::Number(_) => RawRecord::DatePrimitive(value),
            Value::Object(fields) => {
                if day_key_fields(fields).is_some() {
                    return RawRecord::Normalized(fields);
                }
                let alias = DATE_ALIASES
                    .iter()
                    .filter_map(|key| fields.get(*key))
                    .find(|date| is_present(date));
                match alias {
                    Some(date) => RawRecord::DateAliased { fields, date },
                    None => RawRecord::Legacy(fields),
                }
            }
            Value::Null | Value::Bool(_) | Value::Array(_) => RawRecord::Rejected,
        }
    }
}

/// Generates event ids that are unique within a list and increase over time.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: EventId,
    used: BTreeSet<EventId>,
}

impl IdGenerator {
    /// Start above every id in `known`.
    pub fn seeded<I: IntoIterator<Item = EventId>>(known: I) -> Self {
        let used: BTreeSet<EventId> = known.into_iter().collect();
        IdGenerator {
            last: used.last().copied().unwrap_or(0),
            used,
        }
    }

    /// Id for a newly created event: the current time in milliseconds, or
    /// one past the last id if that is later.
    pub fn next_id(&mut self) -> EventId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = match self.last.checked_add(1) {
            Some(next) => now.max(next),
            None => self.lowest_free(),
        };
        self.claim(id)
    }

    /// Id for a stored record that has none. Depends only on the ids already
    /// in the list and the record's position, so the same stored list always
    /// yields the same ids.
    pub fn next_sequential(&mut self) -> EventId {
        let id = match self.last.checked_add(1) {
            Some(next) => next,
            None => self.lowest_free(),
        };
        self.claim(id)
    }

    // Ids ran out at the top of the range
    fn lowest_free(&self) -> EventId {
        (1..).find(|id| !self.used.contains(id)).unwrap_or(0)
    }

    fn claim(&mut self, id: EventId) -> EventId {
        self.last = self.last.max(id);
        self.used.insert(id);
        id
    }
}

/// Turns raw values and drafts into events.
pub struct Normalizer<'a> {
    defaults: &'a RecordDefaults,
    ids: &'a mut IdGenerator,
}

impl<'a> Normalizer<'a> {
    pub fn new(defaults: &'a RecordDefaults, ids: &'a mut IdGenerator) -> Self {
        Normalizer { defaults, ids }
    }

    /// Normalize one raw record. `None` means the record is dropped.
    pub fn normalize(&mut self, value: &Value) -> Option<Event> {
        let result = match RawRecord::classify(value) {
            RawRecord::Normalized(fields) => self.from_normalized(fields),
            RawRecord::DatePrimitive(date) => self.from_date_primitive(date),
            RawRecord::DateAliased { fields, date } => self.from_date_aliased(fields, date),
            RawRecord::Legacy(fields) => Ok(self.from_legacy(fields)),
            RawRecord::Rejected => Err(PollCalError::Serialization(format!(
                "unsupported record shape: {value}"
            ))),
        };

        match result {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Dropping record: {e}");
                None
            }
        }
    }

    /// Build a new event from a compose payload.
    pub fn from_draft(&mut self, draft: EventDraft) -> PollCalResult<Event> {
        let day = validated(draft.date)?;
        Ok(Event {
            id: self.ids.next_id(),
            title: non_empty(Some(draft.title)).unwrap_or_else(|| self.defaults.title.clone()),
            date: day.iso_date(),
            day: Some(day),
            time: draft.time,
            location: draft.location,
            images: draft.images.filter(|images| !images.is_empty()),
            description: draft.description,
            color: non_empty(draft.color).unwrap_or_else(|| self.defaults.color.clone()),
            votes: Votes::default(),
        })
    }

    /// Re-run normalization on an event that was modified in memory.
    pub fn renormalize(&mut self, event: &Event) -> Option<Event> {
        match serde_json::to_value(event) {
            Ok(value) => self.normalize(&value),
            Err(e) => {
                tracing::debug!("Could not serialize event {}: {e}", event.id);
                None
            }
        }
    }

    fn from_normalized(&mut self, fields: &Map<String, Value>) -> PollCalResult<Event> {
        let day = day_key_fields(fields)
            .ok_or_else(|| PollCalError::InvalidDate("missing day key".into()))?;
        let day = validated(day)?;
        Ok(self.with_fields(fields, Some(day)))
    }

    fn from_date_primitive(&mut self, date: &Value) -> PollCalResult<Event> {
        let day = DayKey::from_date(parse_date_like(date)?);
        Ok(self.with_fields(&Map::new(), Some(day)))
    }

    fn from_date_aliased(
        &mut self,
        fields: &Map<String, Value>,
        date: &Value,
    ) -> PollCalResult<Event> {
        let day = DayKey::from_date(parse_date_like(date)?);
        Ok(self.with_fields(fields, Some(day)))
    }

    fn from_legacy(&mut self, fields: &Map<String, Value>) -> Event {
        self.with_fields(fields, None)
    }

    /// Fill an event from `fields`, defaulting everything that is missing.
    fn with_fields(&mut self, fields: &Map<String, Value>, day: Option<DayKey>) -> Event {
        let id = fields
            .get("id")
            .and_then(value_as_u64)
            .filter(|id| *id != 0)
            .unwrap_or_else(|| self.ids.next_sequential());

        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

        Event {
            id,
            title: non_empty(text("title")).unwrap_or_else(|| self.defaults.title.clone()),
            date: day.and_then(|d| d.iso_date()),
            day,
            time: fields.get("time").and_then(parse_time),
            location: fields.get("location").and_then(parse_location),
            images: fields.get("images").and_then(parse_images),
            description: text("description").unwrap_or_default(),
            color: non_empty(text("color")).unwrap_or_else(|| self.defaults.color.clone()),
            votes: fields.get("votes").map(parse_votes).unwrap_or_default(),
        }
    }
}

/// Parse a date-like value into a calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times (the date as written, offset
/// ignored), naive `YYYY-MM-DDTHH:MM[:SS]`, epoch milliseconds, and
/// `{y, m, d}` objects with a zero-based month.
pub fn parse_date_like(value: &Value) -> PollCalResult<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(_) => value_as_integer(value)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| PollCalError::InvalidDate(format!("timestamp out of range: {value}"))),
        Value::Object(fields) => day_key_fields(fields)
            .and_then(|day| day.to_date())
            .ok_or_else(|| PollCalError::InvalidDate(format!("invalid day key: {value}"))),
        _ => Err(PollCalError::InvalidDate(format!("not a date: {value}"))),
    }
}

fn parse_date_str(s: &str) -> PollCalResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| PollCalError::InvalidDate(format!("could not parse '{s}'")))
}

/// Integral `y`, `m`, `d` fields, without range checks.
fn day_key_fields(fields: &Map<String, Value>) -> Option<DayKey> {
    let y = fields.get("y").and_then(value_as_integer)?;
    let m = fields.get("m").and_then(value_as_integer)?;
    let d = fields.get("d").and_then(value_as_integer)?;
    Some(DayKey {
        y: i32::try_from(y).ok()?,
        m: u32::try_from(m).ok()?,
        d: u32::try_from(d).ok()?,
    })
}

fn validated(day: DayKey) -> PollCalResult<DayKey> {
    DayKey::new(day.y, day.m, day.d)
        .ok_or_else(|| PollCalError::InvalidDate(format!("no such day: {day}")))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

fn parse_time(value: &Value) -> Option<EventTime> {
    match value {
        // Older forms stored a bare "HH:MM" start time.
        Value::String(start) => {
            non_empty(Some(start.trim().to_string())).map(|start| EventTime::fixed(start, None))
        }
        Value::Object(_) => serde_json::from_value(value.clone())
            .inspect_err(|e| tracing::debug!("Ignoring malformed time {value}: {e}"))
            .ok(),
        _ => None,
    }
}

fn parse_location(value: &Value) -> Option<EventLocation> {
    match value {
        Value::String(place) => non_empty(Some(place.clone())).map(EventLocation::fixed),
        Value::Object(_) => serde_json::from_value(value.clone())
            .inspect_err(|e| tracing::debug!("Ignoring malformed location {value}: {e}"))
            .ok(),
        _ => None,
    }
}

fn parse_images(value: &Value) -> Option<Images> {
    serde_json::from_value::<Images>(value.clone())
        .ok()
        .filter(|images| !images.is_empty())
}

fn parse_votes(value: &Value) -> Votes {
    let Value::Object(fields) = value else {
        return Votes::default();
    };
    Votes {
        time: fields.get("time").map(parse_tally).unwrap_or_default(),
        location: fields.get("location").map(parse_tally).unwrap_or_default(),
    }
}

/// Keep entries with a numeric key and a non-negative integral count.
fn parse_tally(value: &Value) -> Tally {
    let Value::Object(entries) = value else {
        return Tally::new();
    };
    entries
        .iter()
        .filter_map(|(key, count)| Some((key.trim().parse().ok()?, value_as_u64(count)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_COLOR, DEFAULT_TITLE};
    use crate::event::PollKind;
    use serde_json::json;

    fn normalize(value: Value) -> Option<Event> {
        let defaults = RecordDefaults::default();
        let mut ids = IdGenerator::default();
        Normalizer::new(&defaults, &mut ids).normalize(&value)
    }

    #[test]
    fn test_classify_variants() {
        let normalized = json!({ "y": 2025, "m": 2, "d": 20 });
        let primitive = json!("2025-03-20");
        let aliased = json!({ "dt": "2025-03-20" });
        let legacy = json!({ "title": "No date" });

        assert!(matches!(RawRecord::classify(&normalized), RawRecord::Normalized(_)));
        assert!(matches!(RawRecord::classify(&primitive), RawRecord::DatePrimitive(_)));
        assert!(matches!(RawRecord::classify(&aliased), RawRecord::DateAliased { .. }));
        assert!(matches!(RawRecord::classify(&legacy), RawRecord::Legacy(_)));
        assert_eq!(RawRecord::classify(&json!(null)), RawRecord::Rejected);
        assert_eq!(RawRecord::classify(&json!([1, 2])), RawRecord::Rejected);
    }

    #[test]
    fn test_alias_lookup_skips_empty_values() {
        let value = json!({ "date": "", "start": "2025-03-20T10:00" });
        let RawRecord::DateAliased { date, .. } = RawRecord::classify(&value) else {
            panic!("expected an aliased record");
        };
        assert_eq!(date, &json!("2025-03-20T10:00"));
    }

    #[test]
    fn test_normalized_record_fills_defaults() {
        let event = normalize(json!({ "id": 42, "y": 2025, "m": 2, "d": 20 })).unwrap();

        assert_eq!(event.id, 42);
        assert_eq!(event.title, DEFAULT_TITLE);
        assert_eq!(event.color, DEFAULT_COLOR);
        assert_eq!(event.day, Some(DayKey { y: 2025, m: 2, d: 20 }));
        assert_eq!(event.date.as_deref(), Some("2025-03-20"));
        assert_eq!(event.description, "");
        assert_eq!(event.time, None);
        assert_eq!(event.votes, Votes::default());
    }

    #[test]
    fn test_day_key_wins_over_stored_date_string() {
        let event = normalize(json!({
            "id": 1, "y": 2025, "m": 0, "d": 5, "date": "1999-12-31"
        }))
        .unwrap();
        assert_eq!(event.day, Some(DayKey { y: 2025, m: 0, d: 5 }));
        assert_eq!(event.date.as_deref(), Some("2025-01-05"));
    }

    #[test]
    fn test_impossible_day_key_is_dropped() {
        assert!(normalize(json!({ "y": 2025, "m": 1, "d": 30 })).is_none());
        assert!(normalize(json!({ "y": 2025, "m": 12, "d": 1 })).is_none());
    }

    #[test]
    fn test_date_primitive_synthesizes_event() {
        let event = normalize(json!("2025-03-20")).unwrap();
        assert_eq!(event.day, Some(DayKey { y: 2025, m: 2, d: 20 }));
        assert_eq!(event.title, DEFAULT_TITLE);
        assert!(event.id > 0);

        let from_millis = normalize(json!(1_742_428_800_000_i64)).unwrap();
        assert_eq!(from_millis.day, Some(DayKey { y: 2025, m: 2, d: 20 }));
    }

    #[test]
    fn test_unparseable_dates_are_dropped() {
        assert!(normalize(json!("not a date")).is_none());
        assert!(normalize(json!({ "date": "tomorrow-ish", "title": "x" })).is_none());
        assert!(normalize(json!(null)).is_none());
        assert!(normalize(json!(true)).is_none());
    }

    #[test]
    fn test_date_aliased_record_keeps_fields() {
        let event = normalize(json!({
            "id": "17",
            "title": "Standup",
            "dt": "2025-03-20T09:30:00+02:00",
            "color": "#ff0000",
            "description": "daily"
        }))
        .unwrap();

        assert_eq!(event.id, 17);
        assert_eq!(event.title, "Standup");
        assert_eq!(event.day, Some(DayKey { y: 2025, m: 2, d: 20 }));
        assert_eq!(event.color, "#ff0000");
        assert_eq!(event.description, "daily");
    }

    #[test]
    fn test_compose_shaped_date_object() {
        let event = normalize(json!({ "title": "Party", "date": { "y": 2025, "m": 11, "d": 31 } }))
            .unwrap();
        assert_eq!(event.day, Some(DayKey { y: 2025, m: 11, d: 31 }));
    }

    #[test]
    fn test_legacy_record_is_kept_without_day() {
        let event = normalize(json!({ "title": "Someday", "y": "2025" })).unwrap();
        assert_eq!(event.title, "Someday");
        assert_eq!(event.day, None);
        assert_eq!(event.date, None);
    }

    #[test]
    fn test_bare_time_string_becomes_fixed_time() {
        let event = normalize(json!({ "y": 2025, "m": 2, "d": 20, "time": "10:00" })).unwrap();
        assert_eq!(event.time, Some(EventTime::fixed("10:00", None)));

        let empty = normalize(json!({ "y": 2025, "m": 2, "d": 20, "time": "" })).unwrap();
        assert_eq!(empty.time, None);
    }

    #[test]
    fn test_tagged_time_and_location_are_parsed() {
        let event = normalize(json!({
            "y": 2025, "m": 2, "d": 20,
            "time": { "type": "poll", "slots": [
                { "id": 1, "start": "09:00", "end": "10:00" },
                { "id": "2", "start": "14:00", "end": "15:00" }
            ]},
            "location": { "type": "fixed", "value": "Salle B" }
        }))
        .unwrap();

        assert_eq!(event.time_slots().map(|s| s.len()), Some(2));
        assert_eq!(event.time_slots().unwrap()[1].id, 2);
        assert_eq!(event.location, Some(EventLocation::fixed("Salle B")));
    }

    #[test]
    fn test_malformed_time_is_dropped_not_the_record() {
        let event = normalize(json!({
            "y": 2025, "m": 2, "d": 20,
            "time": { "type": "sometimes" }
        }))
        .unwrap();
        assert_eq!(event.time, None);
    }

    #[test]
    fn test_votes_are_parsed_tolerantly() {
        let event = normalize(json!({
            "y": 2025, "m": 2, "d": 20,
            "votes": { "time": { "1": 3, "oops": 4, "2": -1 }, "location": "nope" }
        }))
        .unwrap();

        assert_eq!(event.votes.count(PollKind::Time, 1), 3);
        assert_eq!(event.votes.time.len(), 1);
        assert!(event.votes.location.is_empty());
    }

    #[test]
    fn test_legacy_image_key() {
        let event = normalize(json!({
            "y": 2025, "m": 2, "d": 20,
            "images": { "pp": "data:image/png;base64,AAAA" }
        }))
        .unwrap();
        let images = event.images.unwrap();
        assert_eq!(images.profile.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(images.presentation, None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let defaults = RecordDefaults::default();
        let mut ids = IdGenerator::seeded([5]);
        let mut normalizer = Normalizer::new(&defaults, &mut ids);

        let a = normalizer.normalize(&json!("2025-03-20")).unwrap();
        let b = normalizer.normalize(&json!("2025-03-20")).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id > 5);
    }

    #[test]
    fn test_ids_after_the_largest_possible_id_stay_unique() {
        let mut ids = IdGenerator::seeded([u64::MAX, 1]);

        let first = ids.next_id();
        let second = ids.next_id();
        let third = ids.next_sequential();
        assert_eq!((first, second, third), (2, 3, 4));
    }

    #[test]
    fn test_missing_ids_follow_the_stored_ids() {
        let defaults = RecordDefaults::default();
        let records = [
            json!({ "id": 40, "title": "Kept" }),
            json!("2025-03-20"),
            json!({ "title": "x" }),
        ];

        let ids_for = |records: &[Value]| -> Vec<EventId> {
            let mut ids = IdGenerator::seeded([40]);
            let mut normalizer = Normalizer::new(&defaults, &mut ids);
            records
                .iter()
                .filter_map(|r| normalizer.normalize(r))
                .map(|e| e.id)
                .collect()
        };

        assert_eq!(ids_for(&records), vec![40, 41, 42]);
        assert_eq!(ids_for(&records), ids_for(&records));
    }

    #[test]
    fn test_renormalize_preserves_event() {
        let defaults = RecordDefaults::default();
        let mut ids = IdGenerator::default();
        let mut normalizer = Normalizer::new(&defaults, &mut ids);

        let draft = EventDraft::new("Lunch", NaiveDate::from_ymd_opt(2025, 3, 20).unwrap())
            .with_time(EventTime::poll([("12:00", "13:00")]));
        let mut event = normalizer.from_draft(draft).unwrap();
        event.votes.increment(PollKind::Time, 1);

        assert_eq!(normalizer.renormalize(&event), Some(event));
    }

    #[test]
    fn test_draft_with_invalid_date_is_rejected() {
        let defaults = RecordDefaults::default();
        let mut ids = IdGenerator::default();
        let mut normalizer = Normalizer::new(&defaults, &mut ids);

        let mut draft = EventDraft::new("", NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        draft.date = DayKey { y: 2025, m: 1, d: 31 };
        assert!(normalizer.from_draft(draft).is_err());
    }
}
