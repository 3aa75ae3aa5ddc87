// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod appointment_status;
mod availability;
mod calendar;
mod clock;
mod error;
mod index;
mod local_time;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use appointment_status::AppointmentStatus;
pub use availability::{
    AvailabilityPolicy, SlotRejection, check_slot, is_day_selectable, is_selectable,
};
pub use calendar::{
    Direction, MONTH_GRID_DAYS, SLOT_MINUTES, SLOTS_PER_DAY, TimeSlot, ViewType, VisibleRange,
    days_for_day, days_for_month, days_for_week, start_of_week, time_slots,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use index::{AppointmentIndex, CalendarCell};
pub use local_time::{
    format_timestamp, local_date, local_minute, parse_time_zone, parse_timestamp, to_local,
    to_utc,
};

// Re-export public types
pub use chrono_tz::Tz;
pub use error::DomainError;
pub use types::{
    Appointment, AppointmentDraft, AppointmentField, AppointmentId, AppointmentPatch,
    AppointmentType, CoachId, Facility, FacilityId, Fee, Location, LocationId, Metadata,
    NewAppointment, PatientId, ProviderId,
};
pub use validation::{
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES, validate_duration, validate_future,
    validate_location_membership, validate_location_pairing,
};
