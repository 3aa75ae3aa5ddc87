// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required appointment field was not provided.
    MissingField(&'static str),
    /// Duration is outside the permitted bounds.
    InvalidDuration {
        /// The rejected duration in minutes.
        minutes: u32,
        /// Smallest permitted duration.
        min: u32,
        /// Largest permitted duration.
        max: u32,
    },
    /// The appointment would start at or before the current moment.
    ScheduledInPast {
        /// The requested start.
        scheduled_at: DateTime<Utc>,
        /// The moment the check was made.
        now: DateTime<Utc>,
    },
    /// Fee amount is negative, NaN or otherwise unusable.
    InvalidFee(String),
    /// A location was chosen without a facility.
    LocationWithoutFacility {
        /// The orphaned location.
        location_id: i64,
    },
    /// The location is not one of the facility's locations.
    LocationNotInFacility {
        /// The facility.
        facility_id: i64,
        /// The location.
        location_id: i64,
    },
    /// Appointment type string is not recognised.
    InvalidAppointmentType(String),
    /// Calendar view name is not recognised.
    InvalidViewType(String),
    /// Appointment status string is not recognised.
    InvalidAppointmentStatus(String),
    /// A status transition is not permitted by the lifecycle.
    InvalidStatusTransition {
        /// Status before the transition.
        from: String,
        /// Requested status.
        to: String,
        /// Why it was refused.
        reason: String,
    },
    /// Failed to parse a timestamp.
    TimestampParseError {
        /// The offending string.
        value: String,
        /// The parser's message.
        error: String,
    },
    /// A local wall-clock time does not exist in the viewer's time zone.
    NonexistentLocalTime {
        /// The local date-time that could not be resolved.
        local: String,
        /// The time zone name.
        time_zone: String,
    },
    /// Time zone name is not a known IANA zone.
    InvalidTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing required field: {field}"),
            Self::InvalidDuration { minutes, min, max } => {
                write!(
                    f,
                    "Invalid duration: {minutes} minutes. Must be between {min} and {max}"
                )
            }
            Self::ScheduledInPast { scheduled_at, now } => {
                write!(
                    f,
                    "Appointment must be scheduled in the future: {} is not after {}",
                    scheduled_at.to_rfc3339(),
                    now.to_rfc3339()
                )
            }
            Self::InvalidFee(msg) => write!(f, "Invalid fee: {msg}"),
            Self::LocationWithoutFacility { location_id } => {
                write!(f, "Location {location_id} was selected without a facility")
            }
            Self::LocationNotInFacility {
                facility_id,
                location_id,
            } => {
                write!(
                    f,
                    "Location {location_id} does not belong to facility {facility_id}"
                )
            }
            Self::InvalidAppointmentType(value) => {
                write!(f, "Invalid appointment type: {value}")
            }
            Self::InvalidViewType(value) => write!(f, "Invalid calendar view: {value}"),
            Self::InvalidAppointmentStatus(value) => {
                write!(f, "Invalid appointment status: {value}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from {from} to {to}: {reason}")
            }
            Self::TimestampParseError { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
            Self::NonexistentLocalTime { local, time_zone } => {
                write!(f, "Local time {local} does not exist in {time_zone}")
            }
            Self::InvalidTimezone(name) => write!(f, "Invalid time zone: {name}"),
        }
    }
}

impl std::error::Error for DomainError {}
