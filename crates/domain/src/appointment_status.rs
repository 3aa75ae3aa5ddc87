// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Appointment status states and transition rules.
//!
//! `Scheduled` is the only initial state. The dedicated lifecycle
//! operations (complete, no-show, cancel, reschedule) only start from
//! `Scheduled`; the generic update path may set any status directly and
//! does not consult these rules.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and upcoming
    #[default]
    Scheduled,
    /// Session took place
    Completed,
    /// Patient did not attend
    NoShow,
    /// Called off before it took place
    Canceled,
    /// Superseded by a booking at another time
    Rescheduled,
}

impl AppointmentStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 5] = [
        Self::Scheduled,
        Self::Completed,
        Self::NoShow,
        Self::Canceled,
        Self::Rescheduled,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for the wire format and filters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Canceled => "canceled",
            Self::Rescheduled => "rescheduled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAppointmentStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            // the console has historically sent both spellings
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "rescheduled" => Ok(Self::Rescheduled),
            _ => Err(DomainError::InvalidAppointmentStatus(s.to_string())),
        }
    }

    /// Returns true if the dedicated lifecycle operations cannot leave this state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    /// Validates a dedicated lifecycle transition.
    ///
    /// `Scheduled → Scheduled` is accepted: rescheduling keeps the status.
    ///
    /// # Errors
    ///
    /// Returns an error if the current status is terminal.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for AppointmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
