// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The appointment form backing the scheduling dialog.
//!
//! Date and start time are held on the viewer's wall clock. The end time is
//! always derived from the start and the duration and cannot be set.

use crate::wire::parse_fee_input;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clinicops_domain::{
    Appointment, AppointmentDraft, AppointmentPatch, AppointmentStatus, AppointmentType, CoachId,
    DomainError, FacilityId, Fee, LocationId, Metadata, PatientId, ProviderId, Tz, to_local,
    to_utc,
};

/// Editable appointment fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentForm {
    pub patient_id: Option<PatientId>,
    pub provider_id: Option<ProviderId>,
    pub coach_id: Option<CoachId>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub appointment_type: AppointmentType,
    /// Only sent on edit; new appointments are always `scheduled`.
    pub status: AppointmentStatus,
    pub facility_id: Option<FacilityId>,
    pub location_id: Option<LocationId>,
    pub fee: Option<Fee>,
    pub notes: String,
    pub metadata: Metadata,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

impl AppointmentForm {
    /// Creates a blank form for a new appointment.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
        appointment_type: AppointmentType,
    ) -> Self {
        Self {
            patient_id: None,
            provider_id: None,
            coach_id: None,
            date,
            start_time,
            duration_minutes,
            appointment_type,
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

    /// Fills a form from an existing appointment, converted to local time.
    #[must_use]
    pub fn from_appointment(appointment: &Appointment, time_zone: Tz) -> Self {
        let local: NaiveDateTime = to_local(appointment.scheduled_at, time_zone);
        Self {
            patient_id: Some(appointment.patient_id),
            provider_id: appointment.provider_id,
            coach_id: appointment.coach_id,
            date: local.date(),
            start_time: local.time(),
            duration_minutes: appointment.duration_minutes,
            appointment_type: appointment.appointment_type,
            status: appointment.status,
            facility_id: appointment.facility_id,
            location_id: appointment.location_id,
            fee: appointment.fee,
            notes: appointment.notes.clone(),
            metadata: appointment.metadata.clone(),
            is_recurring: appointment.is_recurring,
            recurring_pattern: appointment.recurring_pattern.clone(),
        }
    }

    /// Local start.
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// Local end, derived from the start and the duration.
    #[must_use]
    pub fn end_time(&self) -> NaiveDateTime {
        self.starts_at() + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Sets the fee from user input. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFee` if the input is not a finite
    /// non-negative number. The fee is left unchanged.
    pub fn set_fee_input(&mut self, input: &str) -> Result<(), DomainError> {
        self.fee = parse_fee_input(input)?;
        Ok(())
    }

    /// Builds a creation draft, resolving the local start to UTC.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonexistentLocalTime` if the start falls in a
    /// daylight-saving gap.
    pub fn to_draft(&self, time_zone: Tz) -> Result<AppointmentDraft, DomainError> {
        Ok(AppointmentDraft {
            patient_id: self.patient_id,
            provider_id: self.provider_id,
            coach_id: self.coach_id,
            scheduled_at: Some(to_utc(self.starts_at(), time_zone)?),
            duration_minutes: Some(self.duration_minutes),
            appointment_type: Some(self.appointment_type),
            facility_id: self.facility_id,
            location_id: self.location_id,
            fee: self.fee,
            notes: self.notes.clone(),
            metadata: self.metadata.clone(),
            is_recurring: self.is_recurring,
            recurring_pattern: self.recurring_pattern.clone(),
        })
    }

    /// Builds the patch turning `original` into what the form holds.
    ///
    /// An unchanged local start keeps the original instant, so an ambiguous
    /// wall-clock time is never moved by an unrelated edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the patient was cleared or the start falls in a
    /// daylight-saving gap.
    pub fn to_patch(
        &self,
        original: &Appointment,
        time_zone: Tz,
    ) -> Result<AppointmentPatch, DomainError> {
        let scheduled_at: DateTime<Utc> =
            if self.starts_at() == to_local(original.scheduled_at, time_zone) {
                original.scheduled_at
            } else {
                to_utc(self.starts_at(), time_zone)?
            };

        let updated: Appointment = Appointment {
            id: original.id,
            patient_id: self
                .patient_id
                .ok_or(DomainError::MissingField("patient_id"))?,
            provider_id: self.provider_id,
            coach_id: self.coach_id,
            scheduled_at,
            duration_minutes: self.duration_minutes,
            appointment_type: self.appointment_type,
            status: self.status,
            facility_id: self.facility_id,
            location_id: self.location_id,
            fee: self.fee,
            notes: self.notes.clone(),
            metadata: self.metadata.clone(),
            is_recurring: self.is_recurring,
            recurring_pattern: self.recurring_pattern.clone(),
        };

        Ok(AppointmentPatch::diff(original, &updated))
    }
}
