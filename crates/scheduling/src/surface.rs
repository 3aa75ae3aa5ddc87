// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Render-ready calendar views.
//!
//! A view combines the day grid, the index's occupants and the availability
//! decision for every cell. "Now" is read from the clock once per view.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clinicops_domain::{
    Appointment, AppointmentIndex, AvailabilityPolicy, Clock, TimeSlot, ViewType, days_for_day,
    days_for_month, days_for_week, is_day_selectable, is_selectable, time_slots,
};

/// One day in the month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading and trailing days of neighbouring months.
    pub in_month: bool,
    pub is_today: bool,
    pub appointments: Vec<Appointment>,
    pub selectable: bool,
}

/// One 15-minute cell in a week or day column.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCell {
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub occupants: Vec<Appointment>,
    pub selectable: bool,
}

impl SlotCell {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.slot.on(self.date)
    }
}

/// One day of slots.
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub is_today: bool,
    pub slots: Vec<SlotCell>,
}

/// Six weeks of days.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub title: String,
    pub weeks: Vec<Vec<DayCell>>,
}

/// Day columns of slots; seven for a week, one for a day.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGridView {
    pub title: String,
    pub columns: Vec<DayColumn>,
}

/// Any of the three views.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarView {
    Month(MonthView),
    Week(TimeGridView),
    Day(TimeGridView),
}

/// Builds calendar views from an index.
#[derive(Debug)]
pub struct CalendarSurface<'a, C: Clock> {
    index: &'a AppointmentIndex,
    policy: AvailabilityPolicy,
    clock: &'a C,
}

impl<'a, C: Clock> CalendarSurface<'a, C> {
    #[must_use]
    pub const fn new(
        index: &'a AppointmentIndex,
        policy: AvailabilityPolicy,
        clock: &'a C,
    ) -> Self {
        Self {
            index,
            policy,
            clock,
        }
    }

    /// Builds the view of the given type around `anchor`.
    #[must_use]
    pub fn view(&self, view_type: ViewType, anchor: NaiveDate) -> CalendarView {
        match view_type {
            ViewType::Month => CalendarView::Month(self.month_view(anchor)),
            ViewType::Week => CalendarView::Week(self.week_view(anchor)),
            ViewType::Day => CalendarView::Day(self.day_view(anchor)),
        }
    }

    #[must_use]
    pub fn month_view(&self, anchor: NaiveDate) -> MonthView {
        let now_local: NaiveDateTime = self.policy.now_local(self.clock);
        let cells: Vec<DayCell> = days_for_month(anchor)
            .into_iter()
            .map(|date| DayCell {
                date,
                in_month: date.month() == anchor.month() && date.year() == anchor.year(),
                is_today: date == now_local.date(),
                appointments: self.index.for_date(date).to_vec(),
                selectable: is_day_selectable(date, now_local),
            })
            .collect();

        MonthView {
            title: ViewType::Month.title(anchor),
            weeks: cells.chunks(7).map(<[DayCell]>::to_vec).collect(),
        }
    }

    #[must_use]
    pub fn week_view(&self, anchor: NaiveDate) -> TimeGridView {
        TimeGridView {
            title: ViewType::Week.title(anchor),
            columns: self.columns(days_for_week(anchor)),
        }
    }

    #[must_use]
    pub fn day_view(&self, anchor: NaiveDate) -> TimeGridView {
        TimeGridView {
            title: ViewType::Day.title(anchor),
            columns: self.columns(days_for_day(anchor)),
        }
    }

    fn columns(&self, days: Vec<NaiveDate>) -> Vec<DayColumn> {
        let now_local: NaiveDateTime = self.policy.now_local(self.clock);
        let slots: Vec<TimeSlot> = time_slots();

        days.into_iter()
            .map(|date| DayColumn {
                date,
                is_today: date == now_local.date(),
                slots: slots
                    .iter()
                    .map(|slot| {
                        let occupants: Vec<Appointment> =
                            self.index.cell(date, slot).occupants;
                        SlotCell {
                            date,
                            slot: slot.clone(),
                            selectable: is_selectable(slot.on(date), &occupants, now_local),
                            occupants,
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}
