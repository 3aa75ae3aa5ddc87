// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use clinicops_domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, AppointmentType, Metadata,
    PatientId, parse_timestamp,
};

pub fn ts(value: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap()
}

pub fn create_test_now() -> DateTime<Utc> {
    ts("2026-10-16T10:07:00Z")
}

pub fn create_test_appointment() -> Appointment {
    Appointment {
        id: AppointmentId::new(11),
        patient_id: PatientId::new(1),
        provider_id: None,
        coach_id: None,
        scheduled_at: ts("2026-10-17T09:00:00Z"),
        duration_minutes: 30,
        appointment_type: AppointmentType::Coaching,
        status: AppointmentStatus::Scheduled,
        facility_id: None,
        location_id: None,
        fee: None,
        notes: String::from("first visit"),
        metadata: Metadata::new(),
        is_recurring: false,
        recurring_pattern: None,
    }
}

pub fn create_test_appointment_with_status(status: AppointmentStatus) -> Appointment {
    let mut appointment: Appointment = create_test_appointment();
    appointment.status = status;
    appointment
}

pub fn create_test_draft() -> AppointmentDraft {
    AppointmentDraft {
        patient_id: Some(PatientId::new(1)),
        scheduled_at: Some(ts("2026-10-17T09:00:00Z")),
        duration_minutes: Some(30),
        appointment_type: Some(AppointmentType::Coaching),
        ..AppointmentDraft::default()
    }
}
