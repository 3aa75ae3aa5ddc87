// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::LifecycleAction;
use clinicops_domain::{AppointmentId, DomainError};

/// Errors that can occur during lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A dedicated transition was requested from a status that does not allow it.
    InvalidTransition {
        /// The appointment the command targeted.
        appointment_id: AppointmentId,
        /// The refused action.
        action: LifecycleAction,
        /// The status check that failed.
        reason: DomainError,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvalidTransition {
                appointment_id,
                action,
                reason,
            } => write!(
                f,
                "Cannot {action} appointment {appointment_id}: {reason}"
            ),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DomainViolation(err) | Self::InvalidTransition { reason: err, .. } => Some(err),
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
