// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar grid generation for month, week and day views.
//!
//! ## Invariants
//!
//! - A month grid is always 6 full weeks (42 days) starting on a Sunday
//! - A week grid is 7 days starting on the Sunday on/before the anchor
//! - The day lattice has 96 slots at 15-minute resolution (00:00 .. 23:45)
//! - Nothing here reads the current time; identical anchors give identical grids

use crate::error::DomainError;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Width of one slot in minutes.
pub const SLOT_MINUTES: u32 = 15;

/// Number of slots in a day.
pub const SLOTS_PER_DAY: u32 = 24 * 60 / SLOT_MINUTES;

/// Number of days in a month grid.
pub const MONTH_GRID_DAYS: usize = 42;

/// One 15-minute cell of the day lattice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    hour: u32,
    minute: u32,
    label: String,
    display_label: String,
}

impl TimeSlot {
    fn new(hour: u32, minute: u32) -> Self {
        let hour12: u32 = if hour % 12 == 0 { 12 } else { hour % 12 };
        let suffix: &str = if hour < 12 { "AM" } else { "PM" };
        Self {
            hour,
            minute,
            label: format!("{hour:02}:{minute:02}"),
            display_label: format!("{hour12}:{minute:02} {suffix}"),
        }
    }

    /// Returns the slot containing a wall-clock time.
    #[must_use]
    pub fn containing(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute() - time.minute() % SLOT_MINUTES)
    }

    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    /// 24-hour label, e.g. `"14:45"`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 12-hour label, e.g. `"2:45 PM"`.
    #[must_use]
    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Returns the slot's start as a wall-clock time.
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Returns the slot's start on a given day.
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time())
    }
}

/// Returns the Sunday on or before `date`.
#[must_use]
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let back: u64 = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Returns the 42 days of the month grid containing `anchor`.
///
/// The grid starts on the Sunday on/before the first of the month, so it is
/// rectangular regardless of month length or starting weekday.
#[must_use]
pub fn days_for_month(anchor: NaiveDate) -> Vec<NaiveDate> {
    let first: NaiveDate = anchor
        .checked_sub_days(Days::new(u64::from(anchor.day0())))
        .unwrap_or(anchor);
    start_of_week(first)
        .iter_days()
        .take(MONTH_GRID_DAYS)
        .collect()
}

/// Returns the 7 days of the week containing `anchor`, Sunday first.
#[must_use]
pub fn days_for_week(anchor: NaiveDate) -> Vec<NaiveDate> {
    start_of_week(anchor).iter_days().take(7).collect()
}

/// Returns the single day shown by the day view.
#[must_use]
pub fn days_for_day(anchor: NaiveDate) -> Vec<NaiveDate> {
    vec![anchor]
}

/// Returns the 96 slots of a day in ascending order.
#[must_use]
pub fn time_slots() -> Vec<TimeSlot> {
    (0..SLOTS_PER_DAY)
        .map(|i| TimeSlot::new(i * SLOT_MINUTES / 60, i * SLOT_MINUTES % 60))
        .collect()
}

/// Calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    Month,
    Week,
    Day,
}

/// Navigation direction for the previous/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl ViewType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    /// Returns the days this view renders for `anchor`.
    #[must_use]
    pub fn days(&self, anchor: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Self::Month => days_for_month(anchor),
            Self::Week => days_for_week(anchor),
            Self::Day => days_for_day(anchor),
        }
    }

    /// Returns true if the view selects a time as well as a day.
    #[must_use]
    pub const fn has_time_slots(&self) -> bool {
        matches!(self, Self::Week | Self::Day)
    }

    /// Moves the anchor one view-width in `direction`.
    ///
    /// Month steps keep the day of month where possible and clamp to the
    /// last day otherwise (Jan 31 → Feb 28).
    #[must_use]
    pub fn step(&self, anchor: NaiveDate, direction: Direction) -> NaiveDate {
        let moved: Option<NaiveDate> = match (self, direction) {
            (Self::Month, Direction::Next) => anchor.checked_add_months(Months::new(1)),
            (Self::Month, Direction::Previous) => anchor.checked_sub_months(Months::new(1)),
            (Self::Week, Direction::Next) => anchor.checked_add_days(Days::new(7)),
            (Self::Week, Direction::Previous) => anchor.checked_sub_days(Days::new(7)),
            (Self::Day, Direction::Next) => anchor.succ_opt(),
            (Self::Day, Direction::Previous) => anchor.pred_opt(),
        };
        moved.unwrap_or(anchor)
    }

    /// Returns the heading shown above the grid.
    #[must_use]
    pub fn title(&self, anchor: NaiveDate) -> String {
        match self {
            Self::Month => anchor.format("%B %Y").to_string(),
            Self::Week => {
                let range: VisibleRange = VisibleRange::for_view(*self, anchor);
                format!(
                    "{} – {}",
                    range.start().format("%b %-d"),
                    range.end().format("%b %-d, %Y")
                )
            }
            Self::Day => anchor.format("%A, %B %-d, %Y").to_string(),
        }
    }
}

impl FromStr for ViewType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            _ => Err(DomainError::InvalidViewType(s.to_string())),
        }
    }
}

/// The inclusive span of days a view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl VisibleRange {
    /// Returns the range rendered by `view` for `anchor`.
    #[must_use]
    pub fn for_view(view: ViewType, anchor: NaiveDate) -> Self {
        let days: Vec<NaiveDate> = view.days(anchor);
        let start: NaiveDate = days.first().copied().unwrap_or(anchor);
        let end: NaiveDate = days.last().copied().unwrap_or(anchor);
        Self { start, end }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_grid_is_42_consecutive_days_from_sunday() {
        for year in 2020..=2030 {
            for month in 1..=12 {
                let days = days_for_month(date(year, month, 15));
                assert_eq!(days.len(), MONTH_GRID_DAYS);
                assert_eq!(days[0].weekday(), Weekday::Sun);
                for pair in days.windows(2) {
                    assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
                }
                let first = date(year, month, 1);
                assert!(days[0] <= first);
                assert!(first - days[0] < chrono::Duration::days(7));
            }
        }
    }

    #[test]
    fn test_month_grid_starts_on_the_first_when_it_is_a_sunday() {
        // November 1, 2026 is a Sunday
        let days = days_for_month(date(2026, 11, 30));
        assert_eq!(days[0], date(2026, 11, 1));
        assert_eq!(days[41], date(2026, 12, 12));
    }

    #[test]
    fn test_month_grid_covers_the_last_day_of_the_month() {
        // May 2026 starts on a Friday and has 31 days
        let days = days_for_month(date(2026, 5, 1));
        assert_eq!(days[0], date(2026, 4, 26));
        assert!(days.contains(&date(2026, 5, 31)));
        assert_eq!(days[41].weekday(), Weekday::Sat);
    }

    #[test]
    fn test_week_grid_starts_on_sunday() {
        let days = days_for_week(date(2026, 10, 16));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 10, 11));
        assert_eq!(days[0].weekday(), Weekday::Sun);
        assert_eq!(days[6] - days[0], chrono::Duration::days(6));
    }

    #[test]
    fn test_week_grid_for_a_sunday_anchor_starts_on_the_anchor() {
        let days = days_for_week(date(2026, 10, 11));
        assert_eq!(days[0], date(2026, 10, 11));
    }

    #[test]
    fn test_time_slots_cover_the_day() {
        let slots = time_slots();
        assert_eq!(slots.len(), 96);
        assert_eq!(slots[0].label(), "00:00");
        assert_eq!(slots[0].display_label(), "12:00 AM");
        assert_eq!(slots[95].label(), "23:45");
        assert_eq!(slots[95].display_label(), "11:45 PM");
        assert_eq!(slots[48].display_label(), "12:00 PM");
        for pair in slots.windows(2) {
            assert!(pair[0].time() < pair[1].time());
        }
    }

    #[test]
    fn test_slot_containing_floors_to_quarter_hour() {
        let slot = TimeSlot::containing(NaiveTime::from_hms_opt(9, 44, 59).unwrap());
        assert_eq!((slot.hour(), slot.minute()), (9, 30));
    }

    #[test]
    fn test_month_step_clamps_day() {
        let next = ViewType::Month.step(date(2026, 1, 31), Direction::Next);
        assert_eq!(next, date(2026, 2, 28));
        let prev = ViewType::Month.step(date(2026, 3, 31), Direction::Previous);
        assert_eq!(prev, date(2026, 2, 28));
    }

    #[test]
    fn test_week_and_day_steps() {
        assert_eq!(
            ViewType::Week.step(date(2026, 10, 16), Direction::Next),
            date(2026, 10, 23)
        );
        assert_eq!(
            ViewType::Day.step(date(2026, 1, 1), Direction::Previous),
            date(2025, 12, 31)
        );
    }

    #[test]
    fn test_titles() {
        let anchor = date(2026, 10, 16);
        assert_eq!(ViewType::Month.title(anchor), "October 2026");
        assert_eq!(ViewType::Week.title(anchor), "Oct 11 – Oct 17, 2026");
        assert_eq!(ViewType::Day.title(anchor), "Friday, October 16, 2026");
    }

    #[test]
    fn test_visible_range_matches_view() {
        let range = VisibleRange::for_view(ViewType::Month, date(2026, 10, 16));
        assert_eq!(range.start(), date(2026, 9, 27));
        assert_eq!(range.end(), date(2026, 11, 7));
        assert!(range.contains(date(2026, 11, 7)));
        assert!(!range.contains(date(2026, 11, 8)));
    }
}
