// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::appointment_status::AppointmentStatus;
use crate::error::DomainError;
use chrono::{DateTime, Duration, Utc};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of an appointment, assigned by the repository.
    AppointmentId
);
id_type!(
    /// Identifier of a patient record.
    PatientId
);
id_type!(
    /// Identifier of a provider.
    ProviderId
);
id_type!(
    /// Identifier of a coach.
    CoachId
);
id_type!(
    /// Identifier of a facility.
    FacilityId
);
id_type!(
    /// Identifier of a location.
    LocationId
);

/// Open extension map carried alongside an appointment.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// The kind of session an appointment books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    Coaching,
    Onboarding,
    Support,
    Consultation,
    Therapy,
    FollowUp,
}

impl AppointmentType {
    /// Every appointment type, in picker order.
    pub const ALL: [Self; 6] = [
        Self::Coaching,
        Self::Onboarding,
        Self::Support,
        Self::Consultation,
        Self::Therapy,
        Self::FollowUp,
    ];

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coaching => "coaching",
            Self::Onboarding => "onboarding",
            Self::Support => "support",
            Self::Consultation => "consultation",
            Self::Therapy => "therapy",
            Self::FollowUp => "follow_up",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Coaching => "Coaching",
            Self::Onboarding => "Onboarding",
            Self::Support => "Support",
            Self::Consultation => "Consultation",
            Self::Therapy => "Therapy",
            Self::FollowUp => "Follow-up",
        }
    }
}

impl FromStr for AppointmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::InvalidAppointmentType(s.to_string()))
    }
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-negative monetary amount, stored as whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fee {
    cents: u64,
}

impl Fee {
    /// Creates a fee from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Creates a fee from a decimal amount, rounded to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFee` if the amount is NaN, infinite,
    /// negative or too large to represent.
    pub fn from_amount(amount: f64) -> Result<Self, DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::InvalidFee(format!(
                "{amount} is not a finite number"
            )));
        }
        if amount < 0.0 {
            return Err(DomainError::InvalidFee(format!(
                "{amount} is negative"
            )));
        }

        let cents: u64 = (amount * 100.0)
            .round()
            .to_u64()
            .ok_or_else(|| DomainError::InvalidFee(format!("{amount} is out of range")))?;

        Ok(Self { cents })
    }

    /// Returns the amount in whole cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.cents
    }

    /// Returns the amount as a decimal number.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.cents.to_f64().unwrap_or(f64::MAX) / 100.0
    }
}

impl FromStr for Fee {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed: &str = s.trim();
        let amount: f64 = trimmed
            .parse::<f64>()
            .map_err(|_| DomainError::InvalidFee(format!("'{trimmed}' is not a number")))?;
        Self::from_amount(amount)
    }
}

impl std::fmt::Display for Fee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

/// A location summary as exposed by the facility directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
}

impl Location {
    /// Creates a location with only an id and a name.
    #[must_use]
    pub const fn new(id: LocationId, name: String) -> Self {
        Self {
            id,
            name,
            city: None,
            state: None,
            location_type: None,
        }
    }
}

/// A facility and the locations associated with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub is_active: bool,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Facility {
    /// Returns true if the facility lists the given location.
    #[must_use]
    pub fn has_location(&self, location_id: LocationId) -> bool {
        self.locations.iter().any(|l| l.id == location_id)
    }
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub provider_id: Option<ProviderId>,
    pub coach_id: Option<CoachId>,
    /// Start instant (UTC).
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub facility_id: Option<FacilityId>,
    pub location_id: Option<LocationId>,
    pub fee: Option<Fee>,
    pub notes: String,
    pub metadata: Metadata,
    /// Captured from the form; never expanded into occurrences.
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

impl Appointment {
    /// Returns the derived end instant.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Unvalidated input for creating an appointment.
///
/// Required fields are optional here so that missing values can be reported
/// instead of being impossible to express.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppointmentDraft {
    pub patient_id: Option<PatientId>,
    pub provider_id: Option<ProviderId>,
    pub coach_id: Option<CoachId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub appointment_type: Option<AppointmentType>,
    pub facility_id: Option<FacilityId>,
    pub location_id: Option<LocationId>,
    pub fee: Option<Fee>,
    pub notes: String,
    pub metadata: Metadata,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

/// A validated appointment that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub provider_id: Option<ProviderId>,
    pub coach_id: Option<CoachId>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub facility_id: Option<FacilityId>,
    pub location_id: Option<LocationId>,
    pub fee: Option<Fee>,
    pub notes: String,
    pub metadata: Metadata,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

impl NewAppointment {
    /// Attaches a repository-assigned id.
    #[must_use]
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            provider_id: self.provider_id,
            coach_id: self.coach_id,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            appointment_type: self.appointment_type,
            status: self.status,
            facility_id: self.facility_id,
            location_id: self.location_id,
            fee: self.fee,
            notes: self.notes,
            metadata: self.metadata,
            is_recurring: self.is_recurring,
            recurring_pattern: self.recurring_pattern,
        }
    }

    /// Returns the derived end instant.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// A single editable appointment field with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentField {
    PatientId(PatientId),
    ProviderId(Option<ProviderId>),
    CoachId(Option<CoachId>),
    ScheduledAt(DateTime<Utc>),
    DurationMinutes(u32),
    AppointmentType(AppointmentType),
    Status(AppointmentStatus),
    FacilityId(Option<FacilityId>),
    LocationId(Option<LocationId>),
    Fee(Option<Fee>),
    Notes(String),
    /// Sets one metadata key; `Null` removes it.
    MetadataEntry {
        key: String,
        value: serde_json::Value,
    },
    Recurrence {
        is_recurring: bool,
        pattern: Option<String>,
    },
}

impl AppointmentField {
    /// Returns the wire name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PatientId(_) => "patient_id",
            Self::ProviderId(_) => "provider_id",
            Self::CoachId(_) => "coach_id",
            Self::ScheduledAt(_) => "scheduled_at",
            Self::DurationMinutes(_) => "duration_minutes",
            Self::AppointmentType(_) => "type",
            Self::Status(_) => "status",
            Self::FacilityId(_) => "facility_id",
            Self::LocationId(_) => "location_id",
            Self::Fee(_) => "fee",
            Self::Notes(_) => "notes",
            Self::MetadataEntry { .. } => "metadata",
            Self::Recurrence { .. } => "is_recurring",
        }
    }

    /// Writes the field's value into an appointment.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        match self {
            Self::PatientId(v) => appointment.patient_id = *v,
            Self::ProviderId(v) => appointment.provider_id = *v,
            Self::CoachId(v) => appointment.coach_id = *v,
            Self::ScheduledAt(v) => appointment.scheduled_at = *v,
            Self::DurationMinutes(v) => appointment.duration_minutes = *v,
            Self::AppointmentType(v) => appointment.appointment_type = *v,
            Self::Status(v) => appointment.status = *v,
            Self::FacilityId(v) => appointment.facility_id = *v,
            Self::LocationId(v) => appointment.location_id = *v,
            Self::Fee(v) => appointment.fee = *v,
            Self::Notes(v) => appointment.notes.clone_from(v),
            Self::MetadataEntry { key, value } => {
                if value.is_null() {
                    appointment.metadata.remove(key);
                } else {
                    appointment.metadata.insert(key.clone(), value.clone());
                }
            }
            Self::Recurrence {
                is_recurring,
                pattern,
            } => {
                appointment.is_recurring = *is_recurring;
                appointment.recurring_pattern.clone_from(pattern);
            }
        }
    }
}

/// An ordered set of field changes for the generic update path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppointmentPatch {
    fields: Vec<AppointmentField>,
}

impl AppointmentPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field change, returning the patch.
    #[must_use]
    pub fn with(mut self, field: AppointmentField) -> Self {
        self.push(field);
        self
    }

    /// Adds a field change. A later change to the same field replaces the earlier one.
    pub fn push(&mut self, field: AppointmentField) {
        let replaces = |existing: &AppointmentField| match (existing, &field) {
            (
                AppointmentField::MetadataEntry { key: a, .. },
                AppointmentField::MetadataEntry { key: b, .. },
            ) => a == b,
            (AppointmentField::MetadataEntry { .. }, _)
            | (_, AppointmentField::MetadataEntry { .. }) => false,
            (a, b) => a.name() == b.name(),
        };
        self.fields.retain(|existing| !replaces(existing));
        self.fields.push(field);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppointmentField> {
        self.fields.iter()
    }

    /// Returns the status the patch sets, if any.
    #[must_use]
    pub fn status(&self) -> Option<AppointmentStatus> {
        self.fields.iter().find_map(|f| match f {
            AppointmentField::Status(s) => Some(*s),
            _ => None,
        })
    }

    /// Returns the start instant the patch sets, if any.
    #[must_use]
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.fields.iter().find_map(|f| match f {
            AppointmentField::ScheduledAt(at) => Some(*at),
            _ => None,
        })
    }

    /// Returns a copy of `appointment` with every field change applied.
    #[must_use]
    pub fn applied_to(&self, appointment: &Appointment) -> Appointment {
        let mut updated: Appointment = appointment.clone();
        for field in &self.fields {
            field.apply_to(&mut updated);
        }
        updated
    }

    /// Builds the patch that turns `original` into `updated`.
    ///
    /// The id is not part of the diff.
    #[must_use]
    pub fn diff(original: &Appointment, updated: &Appointment) -> Self {
        let mut patch: Self = Self::new();

        if original.patient_id != updated.patient_id {
            patch.push(AppointmentField::PatientId(updated.patient_id));
        }
        if original.provider_id != updated.provider_id {
            patch.push(AppointmentField::ProviderId(updated.provider_id));
        }
        if original.coach_id != updated.coach_id {
            patch.push(AppointmentField::CoachId(updated.coach_id));
        }
        if original.scheduled_at != updated.scheduled_at {
            patch.push(AppointmentField::ScheduledAt(updated.scheduled_at));
        }
        if original.duration_minutes != updated.duration_minutes {
            patch.push(AppointmentField::DurationMinutes(updated.duration_minutes));
        }
        if original.appointment_type != updated.appointment_type {
            patch.push(AppointmentField::AppointmentType(updated.appointment_type));
        }
        if original.status != updated.status {
            patch.push(AppointmentField::Status(updated.status));
        }
        if original.facility_id != updated.facility_id {
            patch.push(AppointmentField::FacilityId(updated.facility_id));
        }
        if original.location_id != updated.location_id {
            patch.push(AppointmentField::LocationId(updated.location_id));
        }
        if original.fee != updated.fee {
            patch.push(AppointmentField::Fee(updated.fee));
        }
        if original.notes != updated.notes {
            patch.push(AppointmentField::Notes(updated.notes.clone()));
        }
        for (key, value) in &updated.metadata {
            if original.metadata.get(key) != Some(value) {
                patch.push(AppointmentField::MetadataEntry {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        for key in original.metadata.keys() {
            if !updated.metadata.contains_key(key) {
                patch.push(AppointmentField::MetadataEntry {
                    key: key.clone(),
                    value: serde_json::Value::Null,
                });
            }
        }
        if original.is_recurring != updated.is_recurring
            || original.recurring_pattern != updated.recurring_pattern
        {
            patch.push(AppointmentField::Recurrence {
                is_recurring: updated.is_recurring,
                pattern: updated.recurring_pattern.clone(),
            });
        }

        patch
    }
}
