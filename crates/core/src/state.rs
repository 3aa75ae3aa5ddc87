// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::LifecycleAction;
use clinicops_domain::{Appointment, AppointmentId, AppointmentPatch, AppointmentStatus};

/// A record of one lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub appointment_id: AppointmentId,
    pub action: LifecycleAction,
    /// Status before the operation.
    pub from: AppointmentStatus,
    /// Status after the operation.
    pub to: AppointmentStatus,
    /// Human-readable summary.
    pub description: String,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] appointment {} {} -> {}: {}",
            self.action, self.appointment_id, self.from, self.to, self.description
        )
    }
}

/// The result of a successful lifecycle transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The appointment after the transition.
    pub appointment: Appointment,
    /// The field changes between the original and the result.
    pub changes: AppointmentPatch,
    /// The event recording this transition.
    pub event: LifecycleEvent,
}

impl TransitionResult {
    /// Returns true if the transition changed no field.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}
