// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Projection between UTC instants and the viewer's local calendar.
//!
//! Timestamps travel as ISO-8601 UTC strings. Every grid, slot and day
//! comparison happens on the viewer's local wall clock, and all of them go
//! through the functions here so the day an appointment lands on is decided
//! in exactly one place.

use crate::error::DomainError;
use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

/// Parses an IANA time zone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is unknown.
pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Projects an instant onto the viewer's wall clock.
#[must_use]
pub fn to_local(at: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    at.with_timezone(&tz).naive_local()
}

/// Returns the viewer's calendar day for an instant.
#[must_use]
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    to_local(at, tz).date()
}

/// Returns the instant truncated to its whole local minute.
#[must_use]
pub fn local_minute(at: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let local: NaiveDateTime = to_local(at, tz);
    let time: NaiveTime = local.time();
    // hour and minute of an existing time always form a valid time
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
        .map_or(local, |truncated| local.date().and_time(truncated))
}

/// Resolves a local wall-clock time back to an instant.
///
/// An ambiguous local time (clocks falling back) resolves to the earlier
/// of the two instants.
///
/// # Errors
///
/// Returns `DomainError::NonexistentLocalTime` if the local time falls in
/// a gap (clocks springing forward).
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::NonexistentLocalTime {
            local: local.to_string(),
            time_zone: tz.name().to_string(),
        })
}

/// Parses a wire timestamp.
///
/// RFC 3339 strings with any offset are accepted; a string without an
/// offset is read as UTC.
///
/// # Errors
///
/// Returns `DomainError::TimestampParseError` if the string is neither.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| DomainError::TimestampParseError {
            value: value.to_string(),
            error: e.to_string(),
        })
}

/// Formats an instant for the wire (`2026-10-17T09:00:00Z`).
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
