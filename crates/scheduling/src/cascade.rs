// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility to location cascade.
//!
//! Selecting a facility loads its locations. Each load is tagged with a
//! request number; a response is applied only while its request is still
//! the latest, so the most recently selected facility always wins.

use crate::collaborators::{DirectoryError, FacilityDirectory};
use crate::error::SchedulingError;
use clinicops_domain::{FacilityId, Location, LocationId};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A point-in-time view of the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeSnapshot {
    pub facility_id: Option<FacilityId>,
    pub location_id: Option<LocationId>,
    /// Locations of `facility_id`, replaced wholesale on every load.
    pub locations: Vec<Location>,
    pub loading: bool,
    /// Set when the last load failed.
    pub error: Option<DirectoryError>,
}

/// The result of a facility selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// The facility's locations were loaded.
    Loaded {
        facility_id: FacilityId,
        locations: usize,
    },
    /// The selection changed before the response arrived; it was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct CascadeState {
    snapshot: CascadeSnapshot,
    request: u64,
}

/// Shared handle to the facility and location selection.
#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    state: Arc<Mutex<CascadeState>>,
}

impl CascadeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CascadeState> {
        lock_state(&self.state)
    }

    /// Selects a facility and loads its locations.
    ///
    /// The selection is recorded immediately; only the location list waits
    /// for the directory.
    ///
    /// # Errors
    ///
    /// Returns the directory error if the load fails and is still current.
    /// The location list is cleared and the error recorded.
    pub fn select_facility<'d, D: FacilityDirectory>(
        &self,
        directory: &'d D,
        facility_id: FacilityId,
    ) -> impl Future<Output = Result<CascadeOutcome, DirectoryError>> + use<'d, D> {
        let request: u64 = self.begin(facility_id);
        let state: Arc<Mutex<CascadeState>> = Arc::clone(&self.state);

        async move {
            let response: Result<Vec<Location>, DirectoryError> =
                directory.list_locations_for_facility(facility_id).await;
            finish(&state, request, facility_id, response)
        }
    }

    fn begin(&self, facility_id: FacilityId) -> u64 {
        let mut state: MutexGuard<'_, CascadeState> = self.lock();
        state.request += 1;

        let snapshot: &mut CascadeSnapshot = &mut state.snapshot;
        if snapshot.facility_id != Some(facility_id) {
            snapshot.location_id = None;
            snapshot.locations.clear();
        }
        snapshot.facility_id = Some(facility_id);
        snapshot.loading = true;
        snapshot.error = None;

        debug!(
            facility_id = facility_id.value(),
            request = state.request,
            "Loading facility locations"
        );
        state.request
    }

    /// Clears the facility, its locations and the selected location.
    ///
    /// Any load in flight is discarded when it resolves.
    pub fn clear_facility(&self) {
        let mut state: MutexGuard<'_, CascadeState> = self.lock();
        state.request += 1;
        state.snapshot = CascadeSnapshot::default();
    }

    /// Selects a location of the current facility, or clears the selection.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::UnknownLocation` if the location is not in
    /// the loaded list.
    pub fn select_location(&self, location_id: Option<LocationId>) -> Result<(), SchedulingError> {
        let mut state: MutexGuard<'_, CascadeState> = self.lock();
        match location_id {
            Some(id) if !state.snapshot.locations.iter().any(|l| l.id == id) => {
                return Err(SchedulingError::UnknownLocation { location_id: id });
            }
            _ => {}
        }
        state.snapshot.location_id = location_id;
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> CascadeSnapshot {
        self.lock().snapshot.clone()
    }

    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.lock().snapshot.locations.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().snapshot.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<DirectoryError> {
        self.lock().snapshot.error.clone()
    }

    #[must_use]
    pub fn selected_facility(&self) -> Option<FacilityId> {
        self.lock().snapshot.facility_id
    }

    #[must_use]
    pub fn selected_location(&self) -> Option<LocationId> {
        self.lock().snapshot.location_id
    }

    /// Returns true if the location is in the loaded list.
    #[must_use]
    pub fn contains_location(&self, location_id: LocationId) -> bool {
        self.lock()
            .snapshot
            .locations
            .iter()
            .any(|l| l.id == location_id)
    }
}

fn lock_state(state: &Mutex<CascadeState>) -> MutexGuard<'_, CascadeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn finish(
    state: &Mutex<CascadeState>,
    request: u64,
    facility_id: FacilityId,
    response: Result<Vec<Location>, DirectoryError>,
) -> Result<CascadeOutcome, DirectoryError> {
    let mut state: MutexGuard<'_, CascadeState> = lock_state(state);
    if request != state.request {
        warn!(
            facility_id = facility_id.value(),
            request,
            current = state.request,
            "Discarding stale location response"
        );
        return Ok(CascadeOutcome::Superseded);
    }

    let snapshot: &mut CascadeSnapshot = &mut state.snapshot;
    snapshot.loading = false;
    match response {
        Ok(locations) => {
            let count: usize = locations.len();
            snapshot.locations = locations;
            let still_listed: bool = snapshot
                .location_id
                .is_none_or(|selected| snapshot.locations.iter().any(|l| l.id == selected));
            if !still_listed {
                snapshot.location_id = None;
            }
            Ok(CascadeOutcome::Loaded {
                facility_id,
                locations: count,
            })
        }
        Err(err) => {
            snapshot.locations.clear();
            snapshot.location_id = None;
            snapshot.error = Some(err.clone());
            Err(err)
        }
    }
}
