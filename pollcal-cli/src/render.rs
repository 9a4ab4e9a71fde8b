//! TUI rendering traits for pollcal types.
//!
//! Extension traits that add colored terminal rendering to pollcal-core types
//! using owo_colors.

use chrono::{Datelike, Local};
use owo_colors::OwoColorize;
use pollcal_core::color::{LabelTone, parse_hex};
use pollcal_core::grid::{DayMarkers, GridCell, default_day_markers};
use pollcal_core::poll::PollTally;
use pollcal_core::{Block, Event, MonthMatrix};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Paint `text` in a `#rrggbb` color, or leave it plain if the color is unreadable.
fn paint(text: &str, color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

impl Render for DayMarkers {
    fn render(&self) -> String {
        let mut dots: String = self.colors.iter().map(|c| paint("●", c)).collect();
        if self.overflow > 0 {
            dots.push_str(&format!("+{}", self.overflow).dimmed().to_string());
        }
        dots
    }
}

impl Render for Block {
    fn render(&self) -> String {
        let label = match self.sub_label.as_deref() {
            Some(time) => format!(" {time} {} ", self.label),
            None => format!(" {} ", self.label),
        };

        let label = match (parse_hex(&self.color), self.tone) {
            (Some((r, g, b)), LabelTone::Dark) => label.black().on_truecolor(r, g, b).to_string(),
            (Some((r, g, b)), LabelTone::Light) => label.white().on_truecolor(r, g, b).to_string(),
            (None, _) => label,
        };

        let geometry = format!("{:>5}px +{}", self.top, self.height);
        format!("{} {}", geometry.dimmed(), label)
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!("{} {}", paint("■", &self.color), self.title.bold());
        if let Some(time) = self.display_time() {
            line.push_str(&format!(" {}", time.dimmed()));
        }
        if let Some(place) = self.display_location() {
            line.push_str(&format!(" @ {place}"));
        }
        line
    }
}

impl<T: std::fmt::Display> Render for PollTally<'_, T> {
    fn render(&self) -> String {
        let votes = format!("{} {}", self.count, pluralize("vote", self.count));
        if self.winner {
            format!("{} {} {}", "✓".green(), self.option.to_string().green(), votes.dimmed())
        } else {
            format!("  {} {}", self.option, votes.dimmed())
        }
    }
}

/// Width of one day column in the month grid.
const CELL_WIDTH: usize = 8;

/// Render the month grid: a header row, then six weeks with the day number
/// and event markers in each cell.
pub fn render_month(matrix: &MonthMatrix, events: &[Event]) -> String {
    let today = Local::now().date_naive();
    let mut lines = vec![matrix.view.label().bold().to_string()];

    let header: String = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|day| format!("{day:<width$}", width = CELL_WIDTH))
        .collect();
    lines.push(header.dimmed().to_string());

    for week in &matrix.weeks {
        let row: String = week
            .iter()
            .map(|cell| render_cell(cell, events, cell.date == today))
            .collect();
        lines.push(row);
    }

    lines.join("\n")
}

fn render_cell(cell: &GridCell, events: &[Event], is_today: bool) -> String {
    let markers = default_day_markers(events, cell.date);
    let day = format!("{:>2}", cell.date.day());

    let day = if !cell.in_month {
        day.dimmed().to_string()
    } else if is_today {
        day.reversed().to_string()
    } else {
        day
    };

    // Markers are colored, so pad by visible width rather than byte length
    let visible = 2 + markers.colors.len() + overflow_width(&markers);
    let padding = CELL_WIDTH.saturating_sub(visible + 1);
    format!("{day} {}{}", markers.render(), " ".repeat(padding))
}

fn overflow_width(markers: &DayMarkers) -> usize {
    if markers.overflow > 0 {
        markers.overflow.to_string().len() + 1
    } else {
        0
    }
}

fn pluralize(word: &str, count: u64) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
