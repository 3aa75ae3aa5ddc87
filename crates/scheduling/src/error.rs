// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the scheduling layer.

use crate::collaborators::{DirectoryError, RepositoryError};
use chrono::NaiveDateTime;
use clinicops::CoreError;
use clinicops_domain::{Appointment, AppointmentId, DomainError, LocationId, SlotRejection};
use thiserror::Error;

/// Broad classification of a scheduling failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed input, or a rule the request breaks.
    /// Never reaches the repository.
    Validation,
    /// The slot is taken, or the repository reported a conflicting change.
    Conflict,
    /// A collaborator call failed. Nothing local was changed.
    Transport,
    /// A collaborator returned data that cannot be interpreted.
    DataIntegrity,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Transport => "transport",
            Self::DataIntegrity => "data_integrity",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scheduling errors.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Input failed a domain rule.
    #[error("Invalid appointment: {0}")]
    Validation(#[from] DomainError),

    /// The lifecycle refused the operation.
    #[error(transparent)]
    Lifecycle(#[from] CoreError),

    /// The requested slot cannot be booked.
    #[error("Slot {} is not available: {reason}", .at.format("%Y-%m-%d %H:%M"))]
    SlotUnavailable {
        at: NaiveDateTime,
        reason: SlotRejection,
    },

    /// The location is not in the loaded list for the selected facility.
    #[error("Location {location_id} is not available for the selected facility")]
    UnknownLocation { location_id: LocationId },

    /// The appointment is not in the calendar index.
    #[error("Appointment {0} is not loaded in the calendar")]
    UnknownAppointment(AppointmentId),

    /// An operation needs the scheduling dialog to be open.
    #[error("No appointment form is open")]
    NoOpenForm,

    /// `confirm_delete` was called without a prior `request_delete`.
    #[error("No delete is awaiting confirmation")]
    NoPendingDelete,

    /// The configuration is unusable.
    #[error("Invalid scheduling configuration: {0}")]
    Config(String),

    /// The appointment repository failed.
    #[error("Appointment repository request failed: {0}")]
    Repository(#[from] RepositoryError),

    /// The facility directory failed.
    #[error("Facility directory request failed: {0}")]
    Directory(#[from] DirectoryError),

    /// A collaborator returned a record that cannot be converted.
    #[error("Malformed appointment record: {0}")]
    MalformedRecord(String),

    /// The mutation succeeded but the repository replied with a record that
    /// cannot be converted.
    #[error("Appointment {record_id} was saved but the repository reply is unreadable: {source}")]
    UnreadableReply {
        record_id: i64,
        source: Box<SchedulingError>,
    },

    /// The mutation succeeded but reloading the calendar did not.
    #[error(
        "Appointment {} was saved but refreshing the calendar failed: {source}",
        .appointment.id
    )]
    IndexRefresh {
        appointment: Box<Appointment>,
        source: RepositoryError,
    },
}

impl SchedulingError {
    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SlotUnavailable {
                reason: SlotRejection::Occupied,
                ..
            }
            | Self::Repository(RepositoryError::Conflict(_) | RepositoryError::NotFound(_)) => {
                ErrorKind::Conflict
            }
            Self::Repository(RepositoryError::Transport(_))
            | Self::Directory(_)
            | Self::IndexRefresh { .. } => ErrorKind::Transport,
            Self::MalformedRecord(_) | Self::UnreadableReply { .. } => ErrorKind::DataIntegrity,
            Self::Validation(_)
            | Self::Lifecycle(_)
            | Self::SlotUnavailable { .. }
            | Self::UnknownLocation { .. }
            | Self::UnknownAppointment(_)
            | Self::NoOpenForm
            | Self::NoPendingDelete
            | Self::Config(_)
            | Self::Repository(RepositoryError::Rejected(_)) => ErrorKind::Validation,
        }
    }

    /// Returns the saved appointment if the failure happened after a successful mutation.
    #[must_use]
    pub fn saved_appointment(&self) -> Option<&Appointment> {
        match self {
            Self::IndexRefresh { appointment, .. } => Some(appointment.as_ref()),
            _ => None,
        }
    }
}
