// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Serialized forms exchanged with the appointment repository.
//!
//! Timestamps are ISO-8601 UTC strings. Fees arrive either as a JSON number
//! or as a decimal string; they are coerced into [`Fee`] here and nowhere else.

use crate::error::SchedulingError;
use chrono::{DateTime, Utc};
use clinicops_domain::{
    Appointment, AppointmentField, AppointmentId, AppointmentIndex, AppointmentPatch,
    AppointmentStatus, AppointmentType, CoachId, DomainError, FacilityId, Fee, LocationId,
    Metadata, NewAppointment, PatientId, ProviderId, format_timestamp, parse_timestamp,
};
use chrono_tz::Tz;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

/// A fee as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireFee {
    Number(f64),
    Text(String),
}

impl WireFee {
    /// Coerces the wire value into a fee.
    ///
    /// A blank string means no fee.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFee` for NaN, infinite, negative or
    /// non-numeric values.
    pub fn to_fee(&self) -> Result<Option<Fee>, DomainError> {
        match self {
            Self::Number(amount) => Fee::from_amount(*amount).map(Some),
            Self::Text(text) => parse_fee_input(text),
        }
    }
}

impl From<Fee> for WireFee {
    fn from(fee: Fee) -> Self {
        Self::Text(fee.to_string())
    }
}

/// Parses a fee typed by a user or sent as a string.
///
/// # Errors
///
/// Returns `DomainError::InvalidFee` if the text is not blank and not a
/// finite non-negative number.
pub fn parse_fee_input(text: &str) -> Result<Option<Fee>, DomainError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    text.parse::<Fee>().map(Some)
}

/// An appointment as stored by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub provider_id: Option<i64>,
    #[serde(default)]
    pub coach_id: Option<i64>,
    pub scheduled_at: String,
    pub duration_minutes: i64,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: String,
    #[serde(default)]
    pub facility_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub fee: Option<WireFee>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_pattern: Option<String>,
}

impl AppointmentRecord {
    /// Builds the record the repository would hold for an appointment.
    #[must_use]
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.value(),
            patient_id: appointment.patient_id.value(),
            provider_id: appointment.provider_id.map(ProviderId::value),
            coach_id: appointment.coach_id.map(CoachId::value),
            scheduled_at: format_timestamp(appointment.scheduled_at),
            duration_minutes: i64::from(appointment.duration_minutes),
            appointment_type: appointment.appointment_type.as_str().to_string(),
            status: appointment.status.as_str().to_string(),
            facility_id: appointment.facility_id.map(FacilityId::value),
            location_id: appointment.location_id.map(LocationId::value),
            fee: appointment.fee.map(WireFee::from),
            notes: Some(appointment.notes.clone()),
            metadata: Some(appointment.metadata.clone()),
            is_recurring: appointment.is_recurring,
            recurring_pattern: appointment.recurring_pattern.clone(),
        }
    }

    /// Converts the record into a domain appointment.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::MalformedRecord` if the id, timestamp,
    /// duration, type, status or fee cannot be interpreted.
    pub fn to_appointment(&self) -> Result<Appointment, SchedulingError> {
        let malformed = |what: String| {
            SchedulingError::MalformedRecord(format!("appointment {}: {what}", self.id))
        };

        if self.id <= 0 {
            return Err(malformed(String::from("id must be positive")));
        }
        let scheduled_at: DateTime<Utc> =
            parse_timestamp(&self.scheduled_at).map_err(|e| malformed(e.to_string()))?;
        let duration_minutes: u32 = self
            .duration_minutes
            .to_u32()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| malformed(format!("invalid duration {}", self.duration_minutes)))?;
        let appointment_type: AppointmentType = self
            .appointment_type
            .parse()
            .map_err(|e: DomainError| malformed(e.to_string()))?;
        let status: AppointmentStatus = self
            .status
            .parse()
            .map_err(|e: DomainError| malformed(e.to_string()))?;
        let fee: Option<Fee> = match &self.fee {
            Some(fee) => fee.to_fee().map_err(|e| malformed(e.to_string()))?,
            None => None,
        };

        Ok(Appointment {
            id: AppointmentId::new(self.id),
            patient_id: PatientId::new(self.patient_id),
            provider_id: self.provider_id.map(ProviderId::new),
            coach_id: self.coach_id.map(CoachId::new),
            scheduled_at,
            duration_minutes,
            appointment_type,
            status,
            facility_id: self.facility_id.map(FacilityId::new),
            location_id: self.location_id.map(LocationId::new),
            fee,
            notes: self.notes.clone().unwrap_or_default(),
            metadata: self.metadata.clone().unwrap_or_default(),
            is_recurring: self.is_recurring,
            recurring_pattern: self.recurring_pattern.clone(),
        })
    }
}

/// The result of building an index from repository records.
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub index: AppointmentIndex,
    /// Records left out because they could not be converted.
    pub rejected: usize,
}

/// Builds an index from records, leaving out any that are malformed.
///
/// One bad record never prevents the rest from rendering.
pub fn index_from_records(
    records: impl IntoIterator<Item = AppointmentRecord>,
    time_zone: Tz,
) -> IndexBuild {
    let mut rejected: usize = 0;
    let appointments: Vec<Appointment> = records
        .into_iter()
        .filter_map(|record| match record.to_appointment() {
            Ok(appointment) => Some(appointment),
            Err(err) => {
                warn!(
                    record_id = record.id,
                    error = %err,
                    "Excluding appointment record from calendar"
                );
                rejected += 1;
                None
            }
        })
        .collect();

    IndexBuild {
        index: AppointmentIndex::new(appointments, time_zone),
        rejected,
    }
}

/// The body sent to create an appointment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentPayload {
    pub patient_id: i64,
    pub provider_id: Option<i64>,
    pub coach_id: Option<i64>,
    pub scheduled_at: String,
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub facility_id: Option<i64>,
    pub location_id: Option<i64>,
    pub fee: Option<WireFee>,
    pub notes: String,
    pub metadata: Metadata,
    pub is_recurring: bool,
    pub recurring_pattern: Option<String>,
}

impl AppointmentPayload {
    #[must_use]
    pub fn from_new(appointment: &NewAppointment) -> Self {
        Self {
            patient_id: appointment.patient_id.value(),
            provider_id: appointment.provider_id.map(ProviderId::value),
            coach_id: appointment.coach_id.map(CoachId::value),
            scheduled_at: format_timestamp(appointment.scheduled_at),
            duration_minutes: appointment.duration_minutes,
            appointment_type: appointment.appointment_type,
            status: appointment.status,
            facility_id: appointment.facility_id.map(FacilityId::value),
            location_id: appointment.location_id.map(LocationId::value),
            fee: appointment.fee.map(WireFee::from),
            notes: appointment.notes.clone(),
            metadata: appointment.metadata.clone(),
            is_recurring: appointment.is_recurring,
            recurring_pattern: appointment.recurring_pattern.clone(),
        }
    }
}

/// The body sent to update an appointment.
///
/// Serializes to a JSON object holding only the changed fields. Metadata
/// entries are grouped under `metadata` with merge-patch semantics: a
/// `null` value removes the key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppointmentPatchPayload {
    patch: AppointmentPatch,
}

impl AppointmentPatchPayload {
    #[must_use]
    pub const fn new(patch: AppointmentPatch) -> Self {
        Self { patch }
    }

    /// Returns the typed field changes.
    #[must_use]
    pub const fn patch(&self) -> &AppointmentPatch {
        &self.patch
    }

    /// Renders the changes as a JSON object.
    #[must_use]
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut body: Map<String, Value> = Map::new();
        let mut metadata: Map<String, Value> = Map::new();

        for field in self.patch.iter() {
            match field {
                AppointmentField::PatientId(id) => {
                    body.insert(field.name().to_string(), id.value().into());
                }
                AppointmentField::ProviderId(id) => {
                    body.insert(field.name().to_string(), id.map(ProviderId::value).into());
                }
                AppointmentField::CoachId(id) => {
                    body.insert(field.name().to_string(), id.map(CoachId::value).into());
                }
                AppointmentField::ScheduledAt(at) => {
                    body.insert(field.name().to_string(), format_timestamp(*at).into());
                }
                AppointmentField::DurationMinutes(minutes) => {
                    body.insert(field.name().to_string(), (*minutes).into());
                }
                AppointmentField::AppointmentType(kind) => {
                    body.insert(field.name().to_string(), kind.as_str().into());
                }
                AppointmentField::Status(status) => {
                    body.insert(field.name().to_string(), status.as_str().into());
                }
                AppointmentField::FacilityId(id) => {
                    body.insert(field.name().to_string(), id.map(FacilityId::value).into());
                }
                AppointmentField::LocationId(id) => {
                    body.insert(field.name().to_string(), id.map(LocationId::value).into());
                }
                AppointmentField::Fee(fee) => {
                    body.insert(
                        field.name().to_string(),
                        fee.map(|fee| fee.to_string()).into(),
                    );
                }
                AppointmentField::Notes(notes) => {
                    body.insert(field.name().to_string(), notes.clone().into());
                }
                AppointmentField::MetadataEntry { key, value } => {
                    metadata.insert(key.clone(), value.clone());
                }
                AppointmentField::Recurrence {
                    is_recurring,
                    pattern,
                } => {
                    body.insert(String::from("is_recurring"), (*is_recurring).into());
                    body.insert(String::from("recurring_pattern"), pattern.clone().into());
                }
            }
        }

        if !metadata.is_empty() {
            body.insert(String::from("metadata"), Value::Object(metadata));
        }
        body
    }
}

impl Serialize for AppointmentPatchPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_map().serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_json() -> Value {
        json!({
            "id": 11,
            "patient_id": 1,
            "scheduled_at": "2026-10-17T09:00:00Z",
            "duration_minutes": 30,
            "type": "coaching",
            "status": "scheduled",
            "fee": "12.5",
            "metadata": {"source": "web"}
        })
    }

    fn record_with(key: &str, value: Value) -> AppointmentRecord {
        let mut raw: Value = record_json();
        raw[key] = value;
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_fee_coercion_accepts_strings_and_numbers() {
        assert_eq!(
            WireFee::Text(String::from("12.5")).to_fee(),
            Ok(Some(Fee::from_cents(1250)))
        );
        assert_eq!(WireFee::Number(12.5).to_fee(), Ok(Some(Fee::from_cents(1250))));
        assert_eq!(WireFee::Text(String::from("  ")).to_fee(), Ok(None));
    }

    #[test]
    fn test_fee_coercion_rejects_unusable_values() {
        for fee in [
            WireFee::Text(String::from("NaN")),
            WireFee::Text(String::from("abc")),
            WireFee::Number(-1.0),
        ] {
            assert!(matches!(fee.to_fee(), Err(DomainError::InvalidFee(_))), "{fee:?}");
        }
    }

    #[test]
    fn test_record_converts_to_appointment() {
        let record: AppointmentRecord = serde_json::from_value(record_json()).unwrap();
        let appointment: Appointment = record.to_appointment().unwrap();

        assert_eq!(appointment.id, AppointmentId::new(11));
        assert_eq!(appointment.fee, Some(Fee::from_cents(1250)));
        assert_eq!(appointment.notes, "");
        assert_eq!(appointment.metadata.get("source"), Some(&json!("web")));
        assert_eq!(
            AppointmentRecord::from_appointment(&appointment)
                .to_appointment()
                .unwrap(),
            appointment
        );
    }

    #[test]
    fn test_numeric_fee_deserializes() {
        let record: AppointmentRecord = record_with("fee", json!(40));
        assert_eq!(record.to_appointment().unwrap().fee, Some(Fee::from_cents(4000)));
    }

    #[test]
    fn test_malformed_records_are_rejected() {
        let cases: [AppointmentRecord; 5] = [
            record_with("scheduled_at", json!("tomorrow morning")),
            record_with("id", json!(0)),
            record_with("duration_minutes", json!(-30)),
            record_with("type", json!("massage")),
            record_with("fee", json!("abc")),
        ];
        for record in cases {
            let err: SchedulingError = record.to_appointment().unwrap_err();
            assert!(matches!(err, SchedulingError::MalformedRecord(_)), "{err}");
        }
    }

    #[test]
    fn test_index_excludes_and_counts_malformed_records() {
        let build: IndexBuild = index_from_records(
            vec![
                serde_json::from_value(record_json()).unwrap(),
                record_with("scheduled_at", json!("not a date")),
            ],
            Tz::UTC,
        );

        assert_eq!(build.rejected, 1);
        assert_eq!(build.index.len(), 1);
    }

    #[test]
    fn test_patch_payload_holds_only_changes() {
        let patch: AppointmentPatch = AppointmentPatch::new()
            .with(AppointmentField::Status(AppointmentStatus::Canceled))
            .with(AppointmentField::LocationId(None))
            .with(AppointmentField::Fee(Some(Fee::from_cents(1250))))
            .with(AppointmentField::MetadataEntry {
                key: String::from("cancel_reason"),
                value: json!("patient request"),
            })
            .with(AppointmentField::MetadataEntry {
                key: String::from("source"),
                value: Value::Null,
            });

        let body: Value = serde_json::to_value(AppointmentPatchPayload::new(patch)).unwrap();
        assert_eq!(
            body,
            json!({
                "status": "canceled",
                "location_id": null,
                "fee": "12.50",
                "metadata": {"cancel_reason": "patient request", "source": null}
            })
        );
    }

    #[test]
    fn test_create_payload_uses_wire_names() {
        let record: AppointmentRecord = serde_json::from_value(record_json()).unwrap();
        let appointment: Appointment = record.to_appointment().unwrap();
        let pending: NewAppointment = NewAppointment {
            patient_id: appointment.patient_id,
            provider_id: None,
            coach_id: None,
            scheduled_at: appointment.scheduled_at,
            duration_minutes: 30,
            appointment_type: AppointmentType::FollowUp,
            status: AppointmentStatus::Scheduled,
            facility_id: Some(FacilityId::new(7)),
            location_id: Some(LocationId::new(3)),
            fee: None,
            notes: String::new(),
            metadata: Metadata::new(),
            is_recurring: true,
            recurring_pattern: Some(String::from("weekly")),
        };

        let body: Value = serde_json::to_value(AppointmentPayload::from_new(&pending)).unwrap();
        assert_eq!(body["type"], json!("follow_up"));
        assert_eq!(body["scheduled_at"], json!("2026-10-17T09:00:00Z"));
        assert_eq!(body["status"], json!("scheduled"));
        assert_eq!(body["fee"], Value::Null);
        assert_eq!(body["recurring_pattern"], json!("weekly"));
    }
}
