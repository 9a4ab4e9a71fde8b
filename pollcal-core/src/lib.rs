//! Core types for pollcal.
//!
//! This crate holds everything the pollcal front-ends share:
//! - `event`: the event data model, where time and location may be polls
//! - `store`: normalization-on-read persistence of the event list
//! - `poll`: winner resolution (first-listed wins ties)
//! - `grid`: the 6×7 Monday-start month matrix
//! - `timeline`: minute-to-pixel layout of a day's events

pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod grid;
pub mod normalize;
pub mod poll;
pub mod serde_helpers;
pub mod store;
pub mod timeline;

pub use error::{PollCalError, PollCalResult};
pub use event::*;
pub use grid::{MonthMatrix, MonthView, build_month_matrix, day_markers};
pub use poll::resolve_winner;
pub use store::{EventStore, FileSlot, MemorySlot};
pub use timeline::{Block, TimelineLayout, layout_day};
