// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory collaborators and fixtures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinicops_domain::{
    AppointmentId, AppointmentStatus, Facility, FacilityId, FixedClock, Location, LocationId,
    parse_timestamp,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use crate::{
    AppointmentFilters, AppointmentPage, AppointmentPatchPayload, AppointmentPayload,
    AppointmentRecord, AppointmentRepository, DirectoryError, FacilityDirectory,
    FacilityStatusFilter, Pagination, RepositoryError, SchedulingConfig, SchedulingCoordinator,
};

pub type TestCoordinator =
    SchedulingCoordinator<InMemoryRepository, StaticDirectory, Arc<FixedClock>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ts(value: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Friday 2026-10-16, 10:07 UTC.
pub fn create_test_now() -> DateTime<Utc> {
    ts("2026-10-16T10:07:00Z")
}

pub fn create_test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(create_test_now()))
}

pub fn create_test_record(id: i64, scheduled_at: &str) -> AppointmentRecord {
    AppointmentRecord {
        id,
        patient_id: 1,
        provider_id: None,
        coach_id: None,
        scheduled_at: scheduled_at.to_string(),
        duration_minutes: 30,
        appointment_type: String::from("coaching"),
        status: String::from("scheduled"),
        facility_id: None,
        location_id: None,
        fee: None,
        notes: Some(String::new()),
        metadata: None,
        is_recurring: false,
        recurring_pattern: None,
    }
}

pub fn create_test_location(id: i64, name: &str) -> Location {
    Location::new(LocationId::new(id), name.to_string())
}

pub fn create_test_facility(id: i64, locations: Vec<Location>) -> Facility {
    Facility {
        id: FacilityId::new(id),
        name: format!("Facility {id}"),
        is_active: true,
        locations,
    }
}

/// Facility 7 has L1 and L2, facility 9 has L3.
pub fn create_test_directory() -> StaticDirectory {
    StaticDirectory::new(vec![
        create_test_facility(
            7,
            vec![create_test_location(1, "L1"), create_test_location(2, "L2")],
        ),
        create_test_facility(9, vec![create_test_location(3, "L3")]),
    ])
}

pub async fn create_test_coordinator(
    records: Vec<AppointmentRecord>,
) -> (TestCoordinator, Arc<FixedClock>) {
    init_tracing();
    let clock: Arc<FixedClock> = create_test_clock();
    let coordinator: TestCoordinator = SchedulingCoordinator::new(
        InMemoryRepository::with_records(records),
        create_test_directory(),
        Arc::clone(&clock),
        SchedulingConfig::default(),
    )
    .unwrap();
    coordinator.refresh().await.unwrap();
    (coordinator, clock)
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Debug, Default)]
struct RepositoryState {
    records: Vec<AppointmentRecord>,
    next_id: i64,
    calls: Vec<&'static str>,
    list_failure: Option<RepositoryError>,
    mutation_failure: Option<RepositoryError>,
    garbled_replies: bool,
}

/// A repository backed by a vector, with call recording and failure injection.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<RepositoryState>,
}

impl InMemoryRepository {
    pub fn with_records(records: Vec<AppointmentRecord>) -> Self {
        let next_id: i64 = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(RepositoryState {
                records,
                next_id,
                ..RepositoryState::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than `list`.
    pub fn mutation_calls(&self) -> Vec<&'static str> {
        self.calls().into_iter().filter(|c| *c != "list").collect()
    }

    pub fn records(&self) -> Vec<AppointmentRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn record(&self, id: i64) -> Option<AppointmentRecord> {
        self.records().into_iter().find(|r| r.id == id)
    }

    pub fn insert_record(&self, record: AppointmentRecord) {
        self.state.lock().unwrap().records.push(record);
    }

    pub fn fail_lists_with(&self, error: Option<RepositoryError>) {
        self.state.lock().unwrap().list_failure = error;
    }

    pub fn fail_mutations_with(&self, error: Option<RepositoryError>) {
        self.state.lock().unwrap().mutation_failure = error;
    }

    /// Stores mutations faithfully but replies with an unreadable record.
    pub fn garble_replies(&self) {
        self.state.lock().unwrap().garbled_replies = true;
    }

    fn reply(state: &RepositoryState, record: &AppointmentRecord) -> AppointmentRecord {
        let mut reply: AppointmentRecord = record.clone();
        if state.garbled_replies {
            reply.scheduled_at = String::from("not a timestamp");
        }
        reply
    }

    fn begin_mutation(&self, call: &'static str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.mutation_failure.clone().map_or(Ok(()), Err)
    }
}

impl AppointmentRepository for InMemoryRepository {
    async fn list(&self, filters: &AppointmentFilters) -> Result<AppointmentPage, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list");
        if let Some(error) = state.list_failure.clone() {
            return Err(error);
        }

        let per_page: usize = usize::try_from(filters.per_page.max(1)).unwrap();
        let total: usize = state.records.len();
        let total_pages: usize = total.div_ceil(per_page);
        let start: usize = (usize::try_from(filters.page.max(1)).unwrap() - 1) * per_page;
        let items: Vec<AppointmentRecord> = state
            .records
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Ok(AppointmentPage {
            items,
            pagination: Pagination {
                page: filters.page,
                per_page: filters.per_page,
                total: u64::try_from(total).unwrap(),
                total_pages: u32::try_from(total_pages).unwrap(),
            },
        })
    }

    async fn get(&self, id: AppointmentId) -> Result<AppointmentRecord, RepositoryError> {
        self.state.lock().unwrap().calls.push("get");
        self.record(id.value()).ok_or(RepositoryError::NotFound(id))
    }

    async fn create(
        &self,
        payload: &AppointmentPayload,
    ) -> Result<AppointmentRecord, RepositoryError> {
        self.begin_mutation("create")?;
        let mut state = self.state.lock().unwrap();
        let mut value: Value = serde_json::to_value(payload).unwrap();
        value["id"] = json!(state.next_id);
        state.next_id += 1;

        let record: AppointmentRecord = serde_json::from_value(value).unwrap();
        state.records.push(record.clone());
        Ok(Self::reply(&state, &record))
    }

    async fn update(
        &self,
        id: AppointmentId,
        patch: &AppointmentPatchPayload,
    ) -> Result<AppointmentRecord, RepositoryError> {
        self.begin_mutation("update")?;
        let mut state = self.state.lock().unwrap();
        let stored: &mut AppointmentRecord = state
            .records
            .iter_mut()
            .find(|r| r.id == id.value())
            .ok_or(RepositoryError::NotFound(id))?;

        let updated = patch.patch().applied_to(&stored.to_appointment().unwrap());
        *stored = AppointmentRecord::from_appointment(&updated);
        let record: AppointmentRecord = stored.clone();
        Ok(Self::reply(&state, &record))
    }

    async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        self.begin_mutation("delete")?;
        let mut state = self.state.lock().unwrap();
        let before: usize = state.records.len();
        state.records.retain(|r| r.id != id.value());
        if state.records.len() == before {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}

pub fn status_of(repository: &InMemoryRepository, id: i64) -> AppointmentStatus {
    repository
        .record(id)
        .unwrap()
        .to_appointment()
        .unwrap()
        .status
}

// ============================================================================
// Directories
// ============================================================================

/// A directory that answers immediately from fixed data.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    facilities: Vec<Facility>,
    location_calls: Mutex<Vec<FacilityId>>,
    failure: Mutex<Option<DirectoryError>>,
}

impl StaticDirectory {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self {
            facilities,
            ..Self::default()
        }
    }

    pub fn location_calls(&self) -> Vec<FacilityId> {
        self.location_calls.lock().unwrap().clone()
    }

    pub fn fail_with(&self, error: Option<DirectoryError>) {
        *self.failure.lock().unwrap() = error;
    }
}

impl FacilityDirectory for StaticDirectory {
    async fn list_facilities(
        &self,
        status: FacilityStatusFilter,
    ) -> Result<Vec<Facility>, DirectoryError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .facilities
            .iter()
            .filter(|f| status.matches(f))
            .cloned()
            .collect())
    }

    async fn list_locations_for_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Location>, DirectoryError> {
        self.location_calls.lock().unwrap().push(facility_id);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.facilities
            .iter()
            .find(|f| f.id == facility_id)
            .map(|f| f.locations.clone())
            .ok_or(DirectoryError::FacilityNotFound(facility_id))
    }
}

pub type LocationReply = Result<Vec<Location>, DirectoryError>;

/// A directory whose location responses are released by the test.
#[derive(Debug, Default)]
pub struct GatedDirectory {
    gates: Mutex<HashMap<FacilityId, oneshot::Receiver<LocationReply>>>,
}

impl GatedDirectory {
    /// Registers a pending response for a facility and returns its release handle.
    pub fn gate(&self, facility_id: FacilityId) -> oneshot::Sender<LocationReply> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().insert(facility_id, receiver);
        sender
    }
}

impl FacilityDirectory for GatedDirectory {
    async fn list_facilities(
        &self,
        _status: FacilityStatusFilter,
    ) -> Result<Vec<Facility>, DirectoryError> {
        Ok(Vec::new())
    }

    async fn list_locations_for_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Location>, DirectoryError> {
        let receiver = self.gates.lock().unwrap().remove(&facility_id);
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(DirectoryError::Transport(String::from("gate dropped")))),
            None => Err(DirectoryError::FacilityNotFound(facility_id)),
        }
    }
}
