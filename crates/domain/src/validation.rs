// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{FacilityId, Location, LocationId};
use chrono::{DateTime, Utc};

/// Shortest bookable appointment, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 15;

/// Longest bookable appointment, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 480;

/// Validates that a duration lies within the bookable bounds.
///
/// # Errors
///
/// Returns `DomainError::InvalidDuration` if the duration is below 15 or
/// above 480 minutes.
pub const fn validate_duration(minutes: u32) -> Result<(), DomainError> {
    if minutes < MIN_DURATION_MINUTES || minutes > MAX_DURATION_MINUTES {
        return Err(DomainError::InvalidDuration {
            minutes,
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        });
    }
    Ok(())
}

/// Validates that an appointment starts strictly after `now`.
///
/// # Errors
///
/// Returns `DomainError::ScheduledInPast` if `scheduled_at` is at or before `now`.
pub fn validate_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), DomainError> {
    if scheduled_at <= now {
        return Err(DomainError::ScheduledInPast { scheduled_at, now });
    }
    Ok(())
}

/// Validates that a location is only chosen together with a facility.
///
/// # Errors
///
/// Returns `DomainError::LocationWithoutFacility` if a location is set
/// while the facility is not.
pub const fn validate_location_pairing(
    facility_id: Option<FacilityId>,
    location_id: Option<LocationId>,
) -> Result<(), DomainError> {
    if let (None, Some(location_id)) = (facility_id, location_id) {
        return Err(DomainError::LocationWithoutFacility {
            location_id: location_id.value(),
        });
    }
    Ok(())
}

/// Validates that the chosen location belongs to the chosen facility.
///
/// `facility_locations` is the location list the directory returned for
/// `facility_id`.
///
/// # Errors
///
/// Returns an error if a location is set without a facility, or if the
/// location is not in the facility's list.
pub fn validate_location_membership(
    facility_id: Option<FacilityId>,
    location_id: Option<LocationId>,
    facility_locations: &[Location],
) -> Result<(), DomainError> {
    validate_location_pairing(facility_id, location_id)?;

    match (facility_id, location_id) {
        (Some(facility_id), Some(location_id))
            if !facility_locations.iter().any(|l| l.id == location_id) =>
        {
            Err(DomainError::LocationNotInFacility {
                facility_id: facility_id.value(),
                location_id: location_id.value(),
            })
        }
        _ => Ok(()),
    }
}
