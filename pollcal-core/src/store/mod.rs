//! Event storage.
//!
//! [`EventStore`] is the only reader and writer of the persisted event list.
//! Every mutation is a full load, modify, save round trip over a [`Slot`].
//! Nothing here returns an error: unreadable content loads as an empty list,
//! malformed records are dropped, and failed writes are logged while the
//! in-memory result is still returned.

mod slot;
mod update;

pub use slot::{FileSlot, MemorySlot, Slot};
pub use update::{EventPatch, EventUpdate};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{PollCalError, PollCalResult};
use crate::event::{DayKey, Event, EventDraft, EventId, RecordDefaults, VoteRequest};
use crate::normalize::{IdGenerator, Normalizer};
use crate::serde_helpers::value_as_u64;

pub struct EventStore<S: Slot> {
    slot: S,
    defaults: RecordDefaults,
}

impl<S: Slot> EventStore<S> {
    pub fn new(slot: S) -> Self {
        Self::with_defaults(slot, RecordDefaults::default())
    }

    pub fn with_defaults(slot: S, defaults: RecordDefaults) -> Self {
        EventStore { slot, defaults }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// All events, in stored order.
    pub fn load(&self) -> Vec<Event> {
        self.load_with_ids().0
    }

    /// Normalize `draft`, give it a fresh id and append it.
    pub fn add(&self, draft: EventDraft) -> Vec<Event> {
        let (mut events, mut ids) = self.load_with_ids();

        let event = match Normalizer::new(&self.defaults, &mut ids).from_draft(draft) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("Not adding draft: {e}");
                return events;
            }
        };

        tracing::info!("Adding event {} ({}) on {:?}", event.id, event.title, event.date);
        events.push(event);
        self.save(&events);
        events
    }

    pub fn remove_by_id(&self, id: EventId) -> Vec<Event> {
        let mut events = self.load();
        events.retain(|e| e.id != id);

        tracing::info!("Removing event {id}");
        self.save(&events);
        events
    }

    /// Apply `update` to the event with `id`. Unknown ids leave the list as is.
    pub fn update_by_id(&self, id: EventId, update: impl Into<EventUpdate>) -> Vec<Event> {
        let update = update.into();
        self.modify(id, |event, normalizer| update.apply(event, normalizer))
    }

    /// Replace the event with `id` by `transform(event)`. The id cannot change.
    pub fn update_with<F>(&self, id: EventId, transform: F) -> Vec<Event>
    where
        F: FnOnce(Event) -> Event,
    {
        self.modify(id, |event, _| Some(transform(event)))
    }

    pub fn vote(&self, request: VoteRequest) -> Vec<Event> {
        self.update_by_id(
            request.event_id,
            EventUpdate::Vote {
                kind: request.kind,
                option_id: request.option_id,
            },
        )
    }

    /// Erase every event.
    pub fn clear(&self) -> Vec<Event> {
        tracing::info!("Clearing all events");
        self.save(&[]);
        Vec::new()
    }

    pub fn find_by_day(&self, y: i32, m: u32, d: u32) -> Vec<Event> {
        let day = DayKey { y, m, d };
        self.load().into_iter().filter(|e| e.is_on(day)).collect()
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Vec<Event> {
        let day = DayKey::from_date(date);
        self.find_by_day(day.y, day.m, day.d)
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.load().into_iter().find(|e| e.id == id)
    }

    fn modify<F>(&self, id: EventId, change: F) -> Vec<Event>
    where
        F: FnOnce(Event, &mut Normalizer) -> Option<Event>,
    {
        let (mut events, mut ids) = self.load_with_ids();

        let Some(index) = events.iter().position(|e| e.id == id) else {
            tracing::debug!("No event with id {id}, nothing to update");
            return events;
        };

        let mut normalizer = Normalizer::new(&self.defaults, &mut ids);
        let Some(mut changed) = change(events[index].clone(), &mut normalizer) else {
            return events;
        };
        changed.id = id;

        match normalizer.renormalize(&changed) {
            Some(event) => events[index] = event,
            None => {
                tracing::warn!(
                    "Update to event {id} produced an invalid record, keeping the original"
                );
                return events;
            }
        }

        tracing::info!("Updated event {id}");
        self.save(&events);
        events
    }

    fn load_with_ids(&self) -> (Vec<Event>, IdGenerator) {
        let records = match self.read_records() {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!("Treating unreadable event list as empty: {e}");
                Vec::new()
            }
        };

        let mut ids = IdGenerator::seeded(
            records
                .iter()
                .filter_map(|record| record.get("id").and_then(value_as_u64)),
        );

        let mut normalizer = Normalizer::new(&self.defaults, &mut ids);
        let events = records
            .iter()
            .filter_map(|record| normalizer.normalize(record))
            .collect();

        (events, ids)
    }

    fn read_records(&self) -> PollCalResult<Vec<Value>> {
        let Some(content) = self.slot.read()? else {
            return Ok(Vec::new());
        };

        let value: Value = serde_json::from_str(&content)?;
        match value {
            Value::Array(records) => Ok(records),
            other => {
                tracing::debug!("Stored events are not a list ({}), ignoring", kind_of(&other));
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, events: &[Event]) {
        let result = serde_json::to_string(events)
            .map_err(PollCalError::from)
            .and_then(|content| self.slot.write(&content));

        if let Err(e) = result {
            tracing::warn!("Could not persist events, changes may not survive a reload: {e}");
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
