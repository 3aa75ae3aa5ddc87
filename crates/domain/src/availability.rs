// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Slot selectability rules.
//!
//! A slot is selectable when:
//! - nothing occupies it (one appointment per 15-minute cell)
//! - its day is not before today
//! - on today, its start is after the current whole minute
//! - it lies inside the rendered range, when one is given
//!
//! Month view has no time of day and applies only the day rule.
//! "Now" is read from the clock on every decision.

use crate::calendar::VisibleRange;
use crate::clock::Clock;
use crate::local_time::local_minute;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;

/// Why a slot cannot be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRejection {
    /// An appointment already starts in the slot.
    Occupied,
    /// The slot's day is before today.
    PastDay,
    /// The slot is today, at or before the current minute.
    ElapsedToday,
    /// The slot is outside the rendered range.
    OutsideRange,
}

impl std::fmt::Display for SlotRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Occupied => write!(f, "the slot is already booked"),
            Self::PastDay => write!(f, "the day is in the past"),
            Self::ElapsedToday => write!(f, "the slot has already started"),
            Self::OutsideRange => write!(f, "the slot is outside the visible calendar"),
        }
    }
}

/// Checks a candidate slot start against its occupants and the current local minute.
///
/// # Errors
///
/// Returns the first rule the candidate breaks.
pub fn check_slot<T>(
    candidate: NaiveDateTime,
    occupants: &[T],
    now_local: NaiveDateTime,
) -> Result<(), SlotRejection> {
    if !occupants.is_empty() {
        return Err(SlotRejection::Occupied);
    }

    let today: NaiveDate = now_local.date();
    if candidate.date() < today {
        return Err(SlotRejection::PastDay);
    }

    if candidate.date() == today {
        let slot_minute: (u32, u32) = (candidate.hour(), candidate.minute());
        let current_minute: (u32, u32) = (now_local.hour(), now_local.minute());
        if slot_minute <= current_minute {
            return Err(SlotRejection::ElapsedToday);
        }
    }

    Ok(())
}

/// Returns true if the candidate slot may be booked.
#[must_use]
pub fn is_selectable<T>(
    candidate: NaiveDateTime,
    occupants: &[T],
    now_local: NaiveDateTime,
) -> bool {
    check_slot(candidate, occupants, now_local).is_ok()
}

/// Month-view rule: a day is selectable unless it is before today.
#[must_use]
pub fn is_day_selectable(date: NaiveDate, now_local: NaiveDateTime) -> bool {
    date >= now_local.date()
}

/// Availability rules bound to the viewer's time zone.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityPolicy {
    time_zone: Tz,
}

impl AvailabilityPolicy {
    #[must_use]
    pub const fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }

    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Reads the clock and returns the current whole local minute.
    pub fn now_local(&self, clock: &impl Clock) -> NaiveDateTime {
        local_minute(clock.now(), self.time_zone)
    }

    /// Checks a candidate slot, reading the clock now.
    ///
    /// # Errors
    ///
    /// Returns the first rule the candidate breaks.
    pub fn check<T>(
        &self,
        clock: &impl Clock,
        candidate: NaiveDateTime,
        occupants: &[T],
    ) -> Result<(), SlotRejection> {
        check_slot(candidate, occupants, self.now_local(clock))
    }

    /// Checks a candidate slot that must also lie in the rendered range.
    ///
    /// # Errors
    ///
    /// Returns the first rule the candidate breaks.
    pub fn check_in_range<T>(
        &self,
        clock: &impl Clock,
        range: &VisibleRange,
        candidate: NaiveDateTime,
        occupants: &[T],
    ) -> Result<(), SlotRejection> {
        if !range.contains(candidate.date()) {
            return Err(SlotRejection::OutsideRange);
        }
        self.check(clock, candidate, occupants)
    }

    pub fn is_selectable<T>(
        &self,
        clock: &impl Clock,
        candidate: NaiveDateTime,
        occupants: &[T],
    ) -> bool {
        self.check(clock, candidate, occupants).is_ok()
    }

    /// Returns true if the candidate may be booked from the rendered range.
    pub fn is_selectable_in<T>(
        &self,
        clock: &impl Clock,
        range: &VisibleRange,
        candidate: NaiveDateTime,
        occupants: &[T],
    ) -> bool {
        self.check_in_range(clock, range, candidate, occupants).is_ok()
    }

    pub fn is_day_selectable(&self, clock: &impl Clock, date: NaiveDate) -> bool {
        is_day_selectable(date, self.now_local(clock))
    }
}
