//! Month grid.
//!
//! A month is always shown as six Monday-start weeks (42 days), so the grid
//! height does not change from month to month.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::constants::DAY_MARKER_LIMIT;
use crate::error::{PollCalError, PollCalResult};
use crate::event::{DayKey, Event};

pub const WEEKS: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

const GRID_DAYS: u64 = (WEEKS * DAYS_PER_WEEK) as u64;

/// The month being displayed.
///
/// Only months whose whole six-week grid is a representable date range can
/// be built, so navigation and grid construction never leave chrono's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthView {
    first: NaiveDate,
    #[serde(skip)]
    grid_start: NaiveDate,
}

impl MonthView {
    /// `month0` is zero-based (0 = January).
    pub fn new(year: i32, month0: u32) -> PollCalResult<Self> {
        let first = month0
            .checked_add(1)
            .and_then(|month| NaiveDate::from_ymd_opt(year, month, 1))
            .ok_or_else(|| PollCalError::InvalidDate(format!("no such month: {year}/{month0}")))?;
        Self::starting(first)
    }

    pub fn containing(date: NaiveDate) -> PollCalResult<Self> {
        let first = date
            .with_day(1)
            .ok_or_else(|| PollCalError::InvalidDate(format!("no first day for {date}")))?;
        Self::starting(first)
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> PollCalResult<Self> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| {
                PollCalError::InvalidDate(format!("Invalid month '{s}'. Expected YYYY-MM"))
            })
            .and_then(Self::containing)
    }

    fn starting(first: NaiveDate) -> PollCalResult<Self> {
        let shift = Days::new(u64::from(first.weekday().num_days_from_monday()));
        let grid_start = first
            .checked_sub_days(shift)
            .filter(|start| start.checked_add_days(Days::new(GRID_DAYS - 1)).is_some())
            .ok_or_else(|| {
                PollCalError::InvalidDate(format!(
                    "month {}/{} is outside the supported date range",
                    first.year(),
                    first.month0()
                ))
            })?;
        Ok(MonthView { first, grid_start })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Zero-based month (0 = January).
    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// The month before, or `None` at the start of the supported range.
    pub fn prev(&self) -> Option<Self> {
        let first = self.first.checked_sub_months(Months::new(1))?;
        Self::starting(first).ok()
    }

    /// The month after, or `None` at the end of the supported range.
    pub fn next(&self) -> Option<Self> {
        let first = self.first.checked_add_months(Months::new(1))?;
        Self::starting(first).ok()
    }

    /// e.g. "March 2025"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month0() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// Six weeks of seven days, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthMatrix {
    pub view: MonthView,
    pub weeks: [[GridCell; DAYS_PER_WEEK]; WEEKS],
}

impl MonthMatrix {
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.weeks.iter().flatten()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.weeks[0][0].date
    }
}

/// Build the 6×7 grid for `view`.
pub fn build_month_matrix(view: MonthView) -> MonthMatrix {
    let weeks = std::array::from_fn(|week| {
        std::array::from_fn(|day| {
            let offset = (week * DAYS_PER_WEEK + day) as u64;
            // The whole window was checked when the view was built
            let date = view
                .grid_start
                .checked_add_days(Days::new(offset))
                .unwrap_or(NaiveDate::MAX);
            GridCell {
                date,
                in_month: date.year() == view.year() && date.month0() == view.month0(),
            }
        })
    });

    MonthMatrix { view, weeks }
}

/// Colored markers for the events of one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayMarkers {
    /// Colors of the first events of the day, in list order.
    pub colors: Vec<String>,
    /// Events beyond the marker limit.
    pub overflow: usize,
}

impl DayMarkers {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Markers for `date`, showing at most `limit` colors.
pub fn day_markers(events: &[Event], date: NaiveDate, limit: usize) -> DayMarkers {
    let day = DayKey::from_date(date);
    let on_day: Vec<&Event> = events.iter().filter(|e| e.is_on(day)).collect();

    DayMarkers {
        colors: on_day.iter().take(limit).map(|e| e.color.clone()).collect(),
        overflow: on_day.len().saturating_sub(limit),
    }
}

/// Markers with the default limit of three.
pub fn default_day_markers(events: &[Event], date: NaiveDate) -> DayMarkers {
    day_markers(events, date, DAY_MARKER_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_COLOR;
    use crate::event::Votes;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_test_event(id: u64, on: NaiveDate, color: &str) -> Event {
        let day = DayKey::from_date(on);
        Event {
            id,
            title: format!("Event {id}"),
            date: day.iso_date(),
            day: Some(day),
            time: None,
            location: None,
            images: None,
            description: String::new(),
            color: color.to_string(),
            votes: Votes::default(),
        }
    }

    #[test]
    fn test_every_month_is_six_monday_weeks() {
        for year in [2023, 2024, 2025, 2026] {
            for month0 in 0..12 {
                let view = MonthView::new(year, month0).unwrap();
                let matrix = build_month_matrix(view);

                assert_eq!(matrix.cells().count(), 42);
                for week in &matrix.weeks {
                    assert_eq!(week[0].date.weekday(), Weekday::Mon);
                    assert_eq!(week[6].date.weekday(), Weekday::Sun);
                }
                let first = matrix
                    .cells()
                    .find(|c| c.date == view.first_day())
                    .expect("first day of month is in the grid");
                assert!(first.in_month);
                assert!(matrix.first_date() <= view.first_day());
            }
        }
    }

    #[test]
    fn test_cells_are_consecutive_days() {
        let matrix = build_month_matrix(MonthView::new(2025, 2).unwrap());
        let dates: Vec<NaiveDate> = matrix.cells().map(|c| c.date).collect();
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
    }

    #[test]
    fn test_month_starting_on_monday_has_no_leading_days() {
        // September 2025 starts on a Monday
        let matrix = build_month_matrix(MonthView::new(2025, 8).unwrap());
        assert_eq!(matrix.first_date(), date(2025, 9, 1));
        assert!(matrix.weeks[0][0].in_month);
    }

    #[test]
    fn test_month_starting_on_sunday_shifts_six_days() {
        // June 2025 starts on a Sunday
        let matrix = build_month_matrix(MonthView::new(2025, 5).unwrap());
        assert_eq!(matrix.first_date(), date(2025, 5, 26));
        assert!(!matrix.weeks[0][0].in_month);
        assert!(matrix.weeks[0][6].in_month);
        assert_eq!(matrix.weeks[0][6].date, date(2025, 6, 1));
    }

    #[test]
    fn test_trailing_days_are_out_of_month() {
        let matrix = build_month_matrix(MonthView::new(2026, 1).unwrap());
        let in_month = matrix.cells().filter(|c| c.in_month).count();
        assert_eq!(in_month, 28);
        assert!(!matrix.weeks[5][6].in_month);
    }

    #[test]
    fn test_month_navigation() {
        let jan = MonthView::new(2025, 0).unwrap();
        assert_eq!(jan.prev(), MonthView::new(2024, 11).ok());
        assert_eq!(jan.next(), MonthView::new(2025, 1).ok());
        assert_eq!(
            MonthView::new(2025, 11).unwrap().next(),
            MonthView::new(2026, 0).ok()
        );
        assert_eq!(jan.label(), "January 2025");
        assert_eq!(jan.to_string(), "2025-01");
    }

    #[test]
    fn test_month_parse() {
        let march = MonthView::parse("2025-03").unwrap();
        assert_eq!((march.year(), march.month0()), (2025, 2));
        assert!(MonthView::parse("2025-13").is_err());
        assert!(MonthView::new(2025, 12).is_err());
    }

    #[test]
    fn test_views_stop_at_the_end_of_the_date_range() {
        let max_year = NaiveDate::MAX.year();
        assert!(MonthView::new(max_year, 11).is_err());
        assert!(MonthView::containing(NaiveDate::MAX).is_err());

        let november = MonthView::new(max_year, 10).unwrap();
        assert_eq!(november.next(), None);
        let matrix = build_month_matrix(november);
        assert_eq!(matrix.cells().count(), 42);
        assert!(matrix.cells().any(|c| c.date == november.first_day() && c.in_month));
    }

    #[test]
    fn test_views_stop_at_the_start_of_the_date_range() {
        let min_year = NaiveDate::MIN.year();
        let february = MonthView::new(min_year, 1).unwrap();
        assert_eq!(build_month_matrix(february).cells().count(), 42);

        // January of the first year only fits if it starts on a Monday
        let january = february.prev();
        if let Some(january) = january {
            assert_eq!(build_month_matrix(january).first_date(), NaiveDate::MIN);
        }
        assert_eq!(january.and_then(|january| january.prev()), None);
    }

    #[test]
    fn test_day_markers_cap_and_overflow() {
        let day = date(2025, 3, 20);
        let events = vec![
            make_test_event(1, day, "#111111"),
            make_test_event(2, day, "#222222"),
            make_test_event(3, date(2025, 3, 21), "#999999"),
            make_test_event(4, day, "#333333"),
            make_test_event(5, day, DEFAULT_COLOR),
            make_test_event(6, day, "#555555"),
        ];

        let markers = default_day_markers(&events, day);
        assert_eq!(markers.colors, vec!["#111111", "#222222", "#333333"]);
        assert_eq!(markers.overflow, 2);

        let other = day_markers(&events, date(2025, 3, 21), 3);
        assert_eq!(other.colors, vec!["#999999"]);
        assert_eq!(other.overflow, 0);

        assert!(day_markers(&events, date(2025, 3, 22), 3).is_empty());
    }
}
