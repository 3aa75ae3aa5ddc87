// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use clinicops_domain::AppointmentPatch;

/// A lifecycle command expressed as data only.
///
/// Commands are the only way to request a change to an existing appointment.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move the appointment to a new start instant.
    Reschedule {
        /// The new start (UTC).
        scheduled_at: DateTime<Utc>,
    },
    /// Mark the appointment as completed.
    Complete {
        /// Replaces the appointment's notes when present.
        notes: Option<String>,
    },
    /// Mark the patient as a no-show.
    MarkNoShow {
        /// Replaces the appointment's notes when present.
        notes: Option<String>,
    },
    /// Cancel the appointment.
    Cancel {
        /// Stored under the `cancel_reason` metadata key when present.
        reason: Option<String>,
    },
    /// Apply arbitrary field changes, including any status.
    Update {
        /// The field changes.
        patch: AppointmentPatch,
    },
    /// Remove the appointment.
    Delete,
}

impl Command {
    /// Returns the lifecycle action this command performs.
    #[must_use]
    pub const fn action(&self) -> LifecycleAction {
        match self {
            Self::Reschedule { .. } => LifecycleAction::Reschedule,
            Self::Complete { .. } => LifecycleAction::Complete,
            Self::MarkNoShow { .. } => LifecycleAction::MarkNoShow,
            Self::Cancel { .. } => LifecycleAction::Cancel,
            Self::Update { .. } => LifecycleAction::Update,
            Self::Delete => LifecycleAction::Delete,
        }
    }
}

/// The kind of lifecycle operation recorded on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    Create,
    Reschedule,
    Complete,
    MarkNoShow,
    Cancel,
    Update,
    Delete,
}

impl LifecycleAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Reschedule => "reschedule",
            Self::Complete => "complete",
            Self::MarkNoShow => "mark_no_show",
            Self::Cancel => "cancel",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
