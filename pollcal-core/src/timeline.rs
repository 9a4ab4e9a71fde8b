//! Day timeline layout.
//!
//! Maps each event of a day to one vertical block on a 24-hour timeline.
//! Only `top` and `height` are computed; blocks may overlap and it is up to
//! the renderer to spread them horizontally.

use serde::Serialize;

use crate::color::{LabelTone, label_tone};
use crate::constants::{DEFAULT_DURATION_MINUTES, DEFAULT_HOUR_HEIGHT_PX, MIN_BLOCK_HEIGHT_PX};
use crate::event::{Event, EventId, EventTime, OptionId};

/// A positioned event on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub event_id: EventId,
    /// Winning slot when the block comes from a time poll.
    pub slot_id: Option<OptionId>,
    pub top: u32,
    pub height: u32,
    pub color: String,
    pub label: String,
    pub sub_label: Option<String>,
    pub tone: LabelTone,
}

/// Effective time range in minutes since midnight, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRange {
    pub start: u32,
    pub end: u32,
}

impl MinuteRange {
    /// Range used for untimed events: a one-hour marker at the top of the day.
    pub const ALL_DAY: MinuteRange = MinuteRange {
        start: 0,
        end: DEFAULT_DURATION_MINUTES,
    };

    /// Build from `HH:MM` strings. A missing end, or one at minute 0, means one hour.
    pub fn from_times(start: &str, end: Option<&str>) -> Self {
        let start = to_minutes(start);
        let end = end
            .map(to_minutes)
            .filter(|end| *end != 0)
            .unwrap_or(start + DEFAULT_DURATION_MINUTES);
        MinuteRange { start, end }
    }
}

/// Pixel geometry of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineLayout {
    pub hour_height_px: u32,
    pub min_block_height_px: u32,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        TimelineLayout {
            hour_height_px: DEFAULT_HOUR_HEIGHT_PX,
            min_block_height_px: MIN_BLOCK_HEIGHT_PX,
        }
    }
}

impl TimelineLayout {
    pub fn new(hour_height_px: u32) -> Self {
        TimelineLayout {
            hour_height_px,
            ..Default::default()
        }
    }

    pub fn with_min_block_height(mut self, min_block_height_px: u32) -> Self {
        self.min_block_height_px = min_block_height_px;
        self
    }

    /// Total height of the 24-hour timeline.
    pub fn day_height(&self) -> u32 {
        self.hour_height_px * 24
    }

    /// Lay out `events` in input order. Poll events without a winner are skipped.
    pub fn layout_day(&self, events: &[Event]) -> Vec<Block> {
        events.iter().filter_map(|event| self.block_for(event)).collect()
    }

    fn block_for(&self, event: &Event) -> Option<Block> {
        let (range, slot_id, sub_label) = match &event.time {
            Some(EventTime::Fixed { start, end }) if !start.is_empty() => {
                let end = end.as_deref().filter(|end| !end.is_empty());
                let sub_label = match end {
                    Some(end) => format!("{start}–{end}"),
                    None => start.clone(),
                };
                (MinuteRange::from_times(start, end), None, Some(sub_label))
            }
            Some(EventTime::Poll { .. }) => {
                let slot = event.winning_slot()?;
                let end = Some(slot.end.as_str()).filter(|end| !end.is_empty());
                (
                    MinuteRange::from_times(&slot.start, end),
                    Some(slot.id),
                    Some(slot.to_string()),
                )
            }
            _ => (MinuteRange::ALL_DAY, None, None),
        };

        let (top, height) = self.geometry(range);
        Some(Block {
            event_id: event.id,
            slot_id,
            top,
            height,
            color: event.color.clone(),
            label: event.title.clone(),
            sub_label,
            tone: label_tone(&event.color),
        })
    }

    /// `(top, height)` in pixels for a minute range.
    pub fn geometry(&self, range: MinuteRange) -> (u32, u32) {
        let px = |minutes: i64| (minutes as f64 / 60.0 * f64::from(self.hour_height_px)).round();

        let top = px(i64::from(range.start)).max(0.0) as u32;
        let raw_height = px(i64::from(range.end) - i64::from(range.start));
        let height = raw_height.max(f64::from(self.min_block_height_px)) as u32;
        (top, height)
    }
}

/// Lay out a day with the default minimum block height.
pub fn layout_day(events: &[Event], hour_height_px: u32) -> Vec<Block> {
    TimelineLayout::new(hour_height_px).layout_day(events)
}

/// Minutes since midnight for `HH:MM`. Unparsable or missing parts count as 0.
pub fn to_minutes(time: &str) -> u32 {
    let mut parts = time.split(':');
    let hours = parts.next().map(leading_number).unwrap_or(0);
    let minutes = parts.next().map(leading_number).unwrap_or(0);
    hours.saturating_mul(60).saturating_add(minutes)
}

fn leading_number(part: &str) -> u32 {
    let digits: String = part
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
