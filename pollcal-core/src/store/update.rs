//! Whitelisted event updates.

use crate::event::{Event, EventDraft, EventLocation, EventTime, Images, OptionId, PollKind};
use crate::normalize::Normalizer;

/// A change to one stored event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventUpdate {
    /// Change some of the editable fields.
    Patch(EventPatch),
    /// Add one vote to a poll option.
    Vote { kind: PollKind, option_id: OptionId },
    /// Replace the whole record, keeping its id. Votes start over.
    Replace(EventDraft),
}

/// Editable fields. `None` leaves a field untouched; for the nullable fields,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub time: Option<Option<EventTime>>,
    pub location: Option<Option<EventLocation>>,
    pub images: Option<Option<Images>>,
}

impl EventPatch {
    pub fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(color) = self.color {
            event.color = color;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(images) = self.images {
            event.images = images;
        }
    }
}

impl From<EventPatch> for EventUpdate {
    fn from(patch: EventPatch) -> Self {
        EventUpdate::Patch(patch)
    }
}

impl EventUpdate {
    /// Apply to `event`. `None` means the update does not apply and nothing
    /// should be written.
    pub(crate) fn apply(self, mut event: Event, normalizer: &mut Normalizer) -> Option<Event> {
        match self {
            EventUpdate::Patch(patch) => {
                patch.apply(&mut event);
                Some(event)
            }
            EventUpdate::Vote { kind, option_id } => {
                if !event.has_option(kind, option_id) {
                    tracing::debug!(
                        "Ignoring {kind} vote for unknown option {option_id} on event {}",
                        event.id
                    );
                    return None;
                }
                event.votes.increment(kind, option_id);
                Some(event)
            }
            EventUpdate::Replace(draft) => match normalizer.from_draft(draft) {
                Ok(mut replacement) => {
                    replacement.id = event.id;
                    Some(replacement)
                }
                Err(e) => {
                    tracing::debug!("Ignoring replacement for event {}: {e}", event.id);
                    None
                }
            },
        }
    }
}
