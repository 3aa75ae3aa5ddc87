// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contracts for the services the scheduling layer consumes.
//!
//! Both traits speak the wire types from [`crate::wire`]; conversion into
//! domain values happens on this side of the boundary.

use crate::wire::{AppointmentPatchPayload, AppointmentPayload, AppointmentRecord};
use chrono::{DateTime, Utc};
use clinicops_domain::{
    Appointment, AppointmentField, AppointmentId, AppointmentPatch, AppointmentStatus,
    AppointmentType, CoachId, Facility, FacilityId, Location, PatientId, ProviderId,
};
use thiserror::Error;

/// Appointment repository failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The appointment does not exist on the server.
    #[error("Appointment {0} not found")]
    NotFound(AppointmentId),
    /// The server refused a change that conflicts with its state.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The server rejected the request as invalid.
    #[error("Rejected: {0}")]
    Rejected(String),
    /// The request did not complete.
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Facility directory failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The facility does not exist.
    #[error("Facility {0} not found")]
    FacilityNotFound(FacilityId),
    /// The request did not complete.
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Query parameters for listing appointments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentFilters {
    pub patient_id: Option<PatientId>,
    pub coach_id: Option<CoachId>,
    pub provider_id: Option<ProviderId>,
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    /// Inclusive lower bound on `scheduled_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `scheduled_at`.
    pub date_to: Option<DateTime<Utc>>,
    /// Free-text search over notes.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl AppointmentFilters {
    /// Returns a copy of the filters addressing one page.
    #[must_use]
    pub fn with_page(&self, page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            ..self.clone()
        }
    }

    /// Returns true if the appointment passes every set filter.
    ///
    /// Pagination is ignored.
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.patient_id.is_none_or(|id| appointment.patient_id == id)
            && self.coach_id.is_none_or(|id| appointment.coach_id == Some(id))
            && self
                .provider_id
                .is_none_or(|id| appointment.provider_id == Some(id))
            && self.status.is_none_or(|s| appointment.status == s)
            && self
                .appointment_type
                .is_none_or(|t| appointment.appointment_type == t)
            && self.date_from.is_none_or(|from| appointment.scheduled_at >= from)
            && self.date_to.is_none_or(|to| appointment.scheduled_at < to)
            && self.search.as_deref().is_none_or(|needle| {
                appointment
                    .notes
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
    }
}

/// Pagination details returned with a page of appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Returns true if pages remain after this one.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of appointment records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppointmentPage {
    pub items: Vec<AppointmentRecord>,
    pub pagination: Pagination,
}

/// Which facilities to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacilityStatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl FacilityStatusFilter {
    #[must_use]
    pub const fn matches(&self, facility: &Facility) -> bool {
        match self {
            Self::Active => facility.is_active,
            Self::Inactive => !facility.is_active,
            Self::All => true,
        }
    }
}

/// The appointment store owned by another service.
///
/// The status shortcuts default to `update` with the equivalent patch.
#[allow(async_fn_in_trait)]
pub trait AppointmentRepository {
    /// Lists one page of appointments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(&self, filters: &AppointmentFilters) -> Result<AppointmentPage, RepositoryError>;

    /// Fetches a single appointment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the appointment does not exist.
    async fn get(&self, id: AppointmentId) -> Result<AppointmentRecord, RepositoryError>;

    /// Creates an appointment and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    async fn create(&self, payload: &AppointmentPayload)
    -> Result<AppointmentRecord, RepositoryError>;

    /// Applies field changes and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    async fn update(
        &self,
        id: AppointmentId,
        patch: &AppointmentPatchPayload,
    ) -> Result<AppointmentRecord, RepositoryError>;

    /// Deletes an appointment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the appointment does not exist.
    async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError>;

    /// Moves an appointment to a new start instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    async fn reschedule(
        &self,
        id: AppointmentId,
        scheduled_at: DateTime<Utc>,
    ) -> Result<AppointmentRecord, RepositoryError> {
        let patch: AppointmentPatch =
            AppointmentPatch::new().with(AppointmentField::ScheduledAt(scheduled_at));
        self.update(id, &AppointmentPatchPayload::new(patch)).await
    }

    /// Marks an appointment completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    async fn complete(
        &self,
        id: AppointmentId,
        notes: Option<String>,
    ) -> Result<AppointmentRecord, RepositoryError> {
        let patch: AppointmentPatch = status_patch(AppointmentStatus::Completed, notes);
        self.update(id, &AppointmentPatchPayload::new(patch)).await
    }

    /// Marks an appointment as a no-show.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    async fn mark_no_show(
        &self,
        id: AppointmentId,
        notes: Option<String>,
    ) -> Result<AppointmentRecord, RepositoryError> {
        let patch: AppointmentPatch = status_patch(AppointmentStatus::NoShow, notes);
        self.update(id, &AppointmentPatchPayload::new(patch)).await
    }
}

fn status_patch(status: AppointmentStatus, notes: Option<String>) -> AppointmentPatch {
    let mut patch: AppointmentPatch =
        AppointmentPatch::new().with(AppointmentField::Status(status));
    if let Some(notes) = notes {
        patch.push(AppointmentField::Notes(notes));
    }
    patch
}

/// The facility and location directory owned by another service.
#[allow(async_fn_in_trait)]
pub trait FacilityDirectory {
    /// Lists facilities with their location summaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_facilities(
        &self,
        status: FacilityStatusFilter,
    ) -> Result<Vec<Facility>, DirectoryError>;

    /// Lists the locations of one facility.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the facility does not exist.
    async fn list_locations_for_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Location>, DirectoryError>;
}
