// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, LifecycleAction};
use crate::error::CoreError;
use crate::state::{LifecycleEvent, TransitionResult};
use chrono::{DateTime, Utc};
use clinicops_domain::{
    Appointment, AppointmentDraft, AppointmentPatch, AppointmentStatus, AppointmentType,
    DomainError, NewAppointment, PatientId, format_timestamp, validate_duration, validate_future,
    validate_location_pairing,
};

/// Metadata key the cancellation reason is stored under.
pub const CANCEL_REASON_KEY: &str = "cancel_reason";

/// Validates a draft and produces an appointment ready for creation.
///
/// New appointments always start in `scheduled`.
///
/// # Arguments
///
/// * `draft` - The unvalidated input
/// * `now` - The current instant, read from the caller's clock
///
/// # Errors
///
/// Returns an error if:
/// - `patient_id`, `scheduled_at`, `type` or `duration_minutes` is missing
/// - The duration is outside 15..=480 minutes
/// - `scheduled_at` is not strictly after `now`
/// - A location is set without a facility
pub fn validate_create(
    draft: AppointmentDraft,
    now: DateTime<Utc>,
) -> Result<NewAppointment, CoreError> {
    let patient_id: PatientId = draft
        .patient_id
        .ok_or(DomainError::MissingField("patient_id"))?;
    let scheduled_at: DateTime<Utc> = draft
        .scheduled_at
        .ok_or(DomainError::MissingField("scheduled_at"))?;
    let appointment_type: AppointmentType = draft
        .appointment_type
        .ok_or(DomainError::MissingField("type"))?;
    let duration_minutes: u32 = draft
        .duration_minutes
        .ok_or(DomainError::MissingField("duration_minutes"))?;

    validate_duration(duration_minutes)?;
    validate_future(scheduled_at, now)?;
    validate_location_pairing(draft.facility_id, draft.location_id)?;

    Ok(NewAppointment {
        patient_id,
        provider_id: draft.provider_id,
        coach_id: draft.coach_id,
        scheduled_at,
        duration_minutes,
        appointment_type,
        status: AppointmentStatus::Scheduled,
        facility_id: draft.facility_id,
        location_id: draft.location_id,
        fee: draft.fee,
        notes: draft.notes,
        metadata: draft.metadata,
        is_recurring: draft.is_recurring,
        recurring_pattern: draft.recurring_pattern,
    })
}

/// Applies a lifecycle command to an appointment.
///
/// The input appointment is never modified; the result carries the updated
/// copy, the field changes and an event describing the transition.
///
/// # Arguments
///
/// * `appointment` - The current appointment (immutable)
/// * `command` - The command to apply
/// * `now` - The current instant, read from the caller's clock
///
/// # Errors
///
/// Returns an error if:
/// - A dedicated transition targets an appointment that is not `scheduled`
/// - A new start instant is not strictly after `now`
/// - An update leaves the duration out of bounds or a location without a facility
pub fn apply(
    appointment: &Appointment,
    command: Command,
    now: DateTime<Utc>,
) -> Result<TransitionResult, CoreError> {
    let action: LifecycleAction = command.action();
    let mut updated: Appointment = appointment.clone();

    let description: String = match command {
        Command::Reschedule { scheduled_at } => {
            require_status_change(appointment, action, AppointmentStatus::Scheduled)?;
            validate_future(scheduled_at, now)?;
            updated.scheduled_at = scheduled_at;
            format!(
                "Rescheduled from {} to {}",
                format_timestamp(appointment.scheduled_at),
                format_timestamp(scheduled_at)
            )
        }
        Command::Complete { notes } => {
            require_status_change(appointment, action, AppointmentStatus::Completed)?;
            updated.status = AppointmentStatus::Completed;
            if let Some(notes) = notes {
                updated.notes = notes;
            }
            String::from("Marked as completed")
        }
        Command::MarkNoShow { notes } => {
            require_status_change(appointment, action, AppointmentStatus::NoShow)?;
            updated.status = AppointmentStatus::NoShow;
            if let Some(notes) = notes {
                updated.notes = notes;
            }
            String::from("Marked as no-show")
        }
        Command::Cancel { reason } => {
            require_status_change(appointment, action, AppointmentStatus::Canceled)?;
            updated.status = AppointmentStatus::Canceled;
            match reason {
                Some(reason) => {
                    let description: String = format!("Canceled: {reason}");
                    updated
                        .metadata
                        .insert(CANCEL_REASON_KEY.to_string(), reason.into());
                    description
                }
                None => String::from("Canceled"),
            }
        }
        Command::Update { patch } => {
            updated = patch.applied_to(appointment);

            if updated.scheduled_at != appointment.scheduled_at {
                validate_future(updated.scheduled_at, now)?;
            }
            validate_duration(updated.duration_minutes)?;
            validate_location_pairing(updated.facility_id, updated.location_id)?;

            let names: Vec<&'static str> = patch.iter().map(|field| field.name()).collect();
            format!("Updated fields: {}", names.join(", "))
        }
        Command::Delete => String::from("Deleted"),
    };

    let changes: AppointmentPatch = AppointmentPatch::diff(appointment, &updated);
    let event: LifecycleEvent = LifecycleEvent {
        appointment_id: appointment.id,
        action,
        from: appointment.status,
        to: updated.status,
        description,
    };

    Ok(TransitionResult {
        appointment: updated,
        changes,
        event,
    })
}

fn require_status_change(
    appointment: &Appointment,
    action: LifecycleAction,
    to: AppointmentStatus,
) -> Result<(), CoreError> {
    appointment
        .status
        .validate_transition(to)
        .map_err(|reason| CoreError::InvalidTransition {
            appointment_id: appointment.id,
            action,
            reason,
        })
}
