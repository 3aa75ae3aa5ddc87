// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Duration, Utc};

use crate::{
    DomainError, FacilityId, Location, LocationId, parse_timestamp, validate_duration,
    validate_future, validate_location_membership, validate_location_pairing,
};

fn locations(ids: &[i64]) -> Vec<Location> {
    ids.iter()
        .map(|id| Location::new(LocationId::new(*id), format!("Location {id}")))
        .collect()
}

#[test]
fn test_validate_duration_accepts_bounds() {
    assert!(validate_duration(15).is_ok());
    assert!(validate_duration(30).is_ok());
    assert!(validate_duration(480).is_ok());
}

#[test]
fn test_validate_duration_rejects_out_of_bounds() {
    assert!(matches!(
        validate_duration(14),
        Err(DomainError::InvalidDuration { minutes: 14, .. })
    ));
    assert!(matches!(
        validate_duration(481),
        Err(DomainError::InvalidDuration { minutes: 481, .. })
    ));
    assert!(validate_duration(0).is_err());
}

#[test]
fn test_validate_future_is_strict() {
    let now: DateTime<Utc> = parse_timestamp("2026-10-16T10:00:00Z").unwrap();

    assert!(validate_future(now + Duration::seconds(1), now).is_ok());
    assert!(matches!(
        validate_future(now, now),
        Err(DomainError::ScheduledInPast { .. })
    ));
    assert!(validate_future(now - Duration::days(1), now).is_err());
}

#[test]
fn test_location_requires_facility() {
    let result: Result<(), DomainError> =
        validate_location_pairing(None, Some(LocationId::new(3)));
    assert_eq!(
        result,
        Err(DomainError::LocationWithoutFacility { location_id: 3 })
    );
    assert!(validate_location_pairing(Some(FacilityId::new(7)), None).is_ok());
    assert!(validate_location_pairing(None, None).is_ok());
}

#[test]
fn test_location_must_belong_to_facility() {
    let facility_locations: Vec<Location> = locations(&[1, 2]);

    assert!(
        validate_location_membership(
            Some(FacilityId::new(7)),
            Some(LocationId::new(2)),
            &facility_locations
        )
        .is_ok()
    );
    assert_eq!(
        validate_location_membership(
            Some(FacilityId::new(7)),
            Some(LocationId::new(3)),
            &facility_locations
        ),
        Err(DomainError::LocationNotInFacility {
            facility_id: 7,
            location_id: 3
        })
    );
}

#[test]
fn test_facility_without_location_is_valid() {
    assert!(validate_location_membership(Some(FacilityId::new(7)), None, &[]).is_ok());
}
