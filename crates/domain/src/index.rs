// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory projection of the appointment collection by local day.
//!
//! The index is a read-side view. It is rebuilt wholesale whenever the
//! backing collection is refreshed; the only in-place change is dropping an
//! appointment whose deletion the repository has confirmed.

use crate::calendar::TimeSlot;
use crate::local_time::to_local;
use crate::types::{Appointment, AppointmentId};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap};

/// The appointments occupying one (date, hour, minute) coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub occupants: Vec<Appointment>,
}

impl CalendarCell {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }
}

/// Appointments bucketed by the viewer's local calendar day.
#[derive(Debug, Clone)]
pub struct AppointmentIndex {
    time_zone: Tz,
    by_day: BTreeMap<NaiveDate, Vec<Appointment>>,
    day_of: HashMap<AppointmentId, NaiveDate>,
}

impl AppointmentIndex {
    /// Creates an index with no appointments.
    #[must_use]
    pub fn empty(time_zone: Tz) -> Self {
        Self {
            time_zone,
            by_day: BTreeMap::new(),
            day_of: HashMap::new(),
        }
    }

    /// Builds an index from a flat list of appointments.
    ///
    /// The index is keyed by appointment id: if the list repeats an id, the
    /// later entry wins.
    #[must_use]
    pub fn new(appointments: impl IntoIterator<Item = Appointment>, time_zone: Tz) -> Self {
        let mut latest: HashMap<AppointmentId, Appointment> = HashMap::new();
        for appointment in appointments {
            latest.insert(appointment.id, appointment);
        }

        let mut by_day: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
        let mut day_of: HashMap<AppointmentId, NaiveDate> = HashMap::with_capacity(latest.len());
        for (id, appointment) in latest {
            let day: NaiveDate = to_local(appointment.scheduled_at, time_zone).date();
            day_of.insert(id, day);
            by_day.entry(day).or_default().push(appointment);
        }
        for bucket in by_day.values_mut() {
            bucket.sort_by_key(|a| (a.scheduled_at, a.id));
        }

        Self {
            time_zone,
            by_day,
            day_of,
        }
    }

    /// Returns the time zone days are projected into.
    #[must_use]
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Returns the appointments on a local day, earliest first.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> &[Appointment] {
        self.by_day
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the appointments starting exactly at a local date, hour and minute.
    #[must_use]
    pub fn for_slot(&self, date: NaiveDate, hour: u32, minute: u32) -> Vec<&Appointment> {
        self.for_date(date)
            .iter()
            .filter(|a| {
                let local: NaiveDateTime = to_local(a.scheduled_at, self.time_zone);
                local.hour() == hour && local.minute() == minute
            })
            .collect()
    }

    /// Returns the appointments whose local start falls anywhere inside a
    /// slot's 15-minute span on a day.
    #[must_use]
    pub fn within_slot(&self, date: NaiveDate, slot: &TimeSlot) -> Vec<&Appointment> {
        self.for_date(date)
            .iter()
            .filter(|a| {
                let local: NaiveDateTime = to_local(a.scheduled_at, self.time_zone);
                TimeSlot::containing(local.time()) == *slot
            })
            .collect()
    }

    /// Returns the cell for a slot on a day.
    #[must_use]
    pub fn cell(&self, date: NaiveDate, slot: &TimeSlot) -> CalendarCell {
        CalendarCell {
            date,
            hour: slot.hour(),
            minute: slot.minute(),
            occupants: self
                .for_slot(date, slot.hour(), slot.minute())
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        let day: &NaiveDate = self.day_of.get(&id)?;
        self.for_date(*day).iter().find(|a| a.id == id)
    }

    /// Drops an appointment, returning it if it was present.
    pub fn remove(&mut self, id: AppointmentId) -> Option<Appointment> {
        let day: NaiveDate = self.day_of.remove(&id)?;
        let bucket: &mut Vec<Appointment> = self.by_day.get_mut(&day)?;
        let position: usize = bucket.iter().position(|a| a.id == id)?;
        let removed: Appointment = bucket.remove(position);
        if bucket.is_empty() {
            self.by_day.remove(&day);
        }
        Some(removed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.day_of.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.day_of.is_empty()
    }

    /// Iterates every appointment in day order, earliest first.
    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.by_day.values().flatten()
    }

    /// Iterates the appointments on local days in `start..=end`.
    pub fn in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &Appointment> {
        self.by_day.range(start..=end).flat_map(|(_, bucket)| bucket)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::appointment_status::AppointmentStatus;
    use crate::calendar::time_slots;
    use crate::local_time::parse_timestamp;
    use crate::types::{AppointmentType, Metadata, PatientId};
    use chrono::NaiveTime;

    fn appointment(id: i64, at: &str) -> Appointment {
        Appointment {
            id: AppointmentId::new(id),
            patient_id: PatientId::new(1),
            provider_id: None,
            coach_id: None,
            scheduled_at: parse_timestamp(at).unwrap(),
            duration_minutes: 30,
            appointment_type: AppointmentType::Coaching,
            status: AppointmentStatus::Scheduled,
            facility_id: None,
            location_id: None,
            fee: None,
            notes: String::new(),
            metadata: Metadata::new(),
            is_recurring: false,
            recurring_pattern: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_within_slot_covers_the_whole_span() {
        let index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-20T09:05:00Z"),
                appointment(2, "2026-10-20T09:15:00Z"),
            ],
            Tz::UTC,
        );
        let nine: TimeSlot = TimeSlot::containing(NaiveTime::from_hms_opt(9, 10, 0).unwrap());

        let ids: Vec<i64> = index
            .within_slot(date(2026, 10, 20), &nine)
            .iter()
            .map(|a| a.id.value())
            .collect();
        assert_eq!(ids, vec![1]);
        assert!(index.for_slot(date(2026, 10, 20), 9, 0).is_empty());
    }

    #[test]
    fn test_for_date_orders_by_start() {
        let index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-20T15:00:00Z"),
                appointment(2, "2026-10-20T09:00:00Z"),
                appointment(3, "2026-10-21T09:00:00Z"),
            ],
            Tz::UTC,
        );

        let ids: Vec<i64> = index
            .for_date(date(2026, 10, 20))
            .iter()
            .map(|a| a.id.value())
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(index.for_date(date(2026, 10, 22)).is_empty());
    }

    #[test]
    fn test_days_follow_the_viewer_time_zone() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let index = AppointmentIndex::new(vec![appointment(1, "2026-10-21T03:00:00Z")], tz);

        assert_eq!(index.for_date(date(2026, 10, 20)).len(), 1);
        assert!(index.for_date(date(2026, 10, 21)).is_empty());
        assert_eq!(index.for_slot(date(2026, 10, 20), 20, 0).len(), 1);
    }

    #[test]
    fn test_for_slot_matches_exact_minute() {
        let index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-20T09:00:00Z"),
                appointment(2, "2026-10-20T09:15:00Z"),
                appointment(3, "2026-10-20T09:10:00Z"),
            ],
            Tz::UTC,
        );

        let at_nine: Vec<&Appointment> = index.for_slot(date(2026, 10, 20), 9, 0);
        assert_eq!(at_nine.len(), 1);
        assert_eq!(at_nine[0].id, AppointmentId::new(1));
        assert_eq!(index.for_slot(date(2026, 10, 20), 9, 15).len(), 1);
        assert!(index.for_slot(date(2026, 10, 20), 9, 30).is_empty());
    }

    #[test]
    fn test_cell_reports_occupants() {
        let index = AppointmentIndex::new(vec![appointment(1, "2026-10-20T09:00:00Z")], Tz::UTC);
        let slots = time_slots();

        let occupied = index.cell(date(2026, 10, 20), &slots[36]);
        assert!(occupied.is_occupied());
        let free = index.cell(date(2026, 10, 20), &slots[37]);
        assert!(!free.is_occupied());
    }

    #[test]
    fn test_repeated_id_keeps_latest_entry() {
        let index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-20T09:00:00Z"),
                appointment(1, "2026-10-22T11:00:00Z"),
            ],
            Tz::UTC,
        );

        assert_eq!(index.len(), 1);
        assert!(index.for_date(date(2026, 10, 20)).is_empty());
        assert_eq!(
            index.get(AppointmentId::new(1)).unwrap().scheduled_at,
            parse_timestamp("2026-10-22T11:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_remove_drops_appointment_and_empty_day() {
        let mut index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-20T09:00:00Z"),
                appointment(2, "2026-10-21T09:00:00Z"),
            ],
            Tz::UTC,
        );

        let removed = index.remove(AppointmentId::new(1));
        assert_eq!(removed.map(|a| a.id), Some(AppointmentId::new(1)));
        assert_eq!(index.len(), 1);
        assert!(index.for_date(date(2026, 10, 20)).is_empty());
        assert!(index.remove(AppointmentId::new(1)).is_none());
        assert!(index.get(AppointmentId::new(2)).is_some());
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let index = AppointmentIndex::new(
            vec![
                appointment(1, "2026-10-19T09:00:00Z"),
                appointment(2, "2026-10-20T09:00:00Z"),
                appointment(3, "2026-10-21T09:00:00Z"),
            ],
            Tz::UTC,
        );

        let ids: Vec<i64> = index
            .in_range(date(2026, 10, 20), date(2026, 10, 21))
            .map(|a| a.id.value())
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(index.iter().count(), 3);
    }
}
