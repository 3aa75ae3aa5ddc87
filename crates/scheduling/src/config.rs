// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Scheduling configuration.

use crate::error::SchedulingError;
use chrono::{NaiveTime, Timelike};
use clinicops_domain::{
    AppointmentType, SLOT_MINUTES, Tz, parse_time_zone, validate_duration,
};
use serde::{Deserialize, Serialize};

const START_TIME_FORMAT: &str = "%H:%M";

/// Settings for the scheduling coordinator.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// IANA name of the viewer's time zone.
    pub time_zone: String,
    /// Duration given to new appointments.
    pub default_duration_minutes: u32,
    /// Start time used when a day is picked without a time, as `HH:MM`.
    pub default_start_time: String,
    pub default_appointment_type: AppointmentType,
    /// Records requested per page when reloading the calendar.
    pub page_size: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            time_zone: String::from("UTC"),
            default_duration_minutes: 30,
            default_start_time: String::from("09:00"),
            default_appointment_type: AppointmentType::Coaching,
            page_size: 100,
        }
    }
}

impl SchedulingConfig {
    /// Returns a default configuration for the given time zone.
    #[must_use]
    pub fn for_time_zone(time_zone: &str) -> Self {
        Self {
            time_zone: time_zone.to_string(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Config` if the JSON is malformed or a
    /// setting is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, SchedulingError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SchedulingError::Config(format!("malformed JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Config` naming the first invalid setting.
    pub fn validate(&self) -> Result<(), SchedulingError> {
        self.time_zone()?;
        validate_duration(self.default_duration_minutes)
            .map_err(|e| SchedulingError::Config(format!("default_duration_minutes: {e}")))?;
        self.default_start_time()?;
        if self.page_size == 0 {
            return Err(SchedulingError::Config(String::from(
                "page_size must be at least 1",
            )));
        }
        Ok(())
    }

    /// Returns the parsed time zone.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Config` if the name is not an IANA zone.
    pub fn time_zone(&self) -> Result<Tz, SchedulingError> {
        parse_time_zone(&self.time_zone)
            .map_err(|e| SchedulingError::Config(format!("time_zone: {e}")))
    }

    /// Returns the parsed default start time.
    ///
    /// # Errors
    ///
    /// Returns `SchedulingError::Config` if the value is not `HH:MM` on a
    /// slot boundary.
    pub fn default_start_time(&self) -> Result<NaiveTime, SchedulingError> {
        let time: NaiveTime = NaiveTime::parse_from_str(&self.default_start_time, START_TIME_FORMAT)
            .map_err(|e| {
                SchedulingError::Config(format!(
                    "default_start_time '{}': {e}",
                    self.default_start_time
                ))
            })?;
        if time.minute() % SLOT_MINUTES != 0 {
            return Err(SchedulingError::Config(format!(
                "default_start_time '{}' is not on a {SLOT_MINUTES}-minute boundary",
                self.default_start_time
            )));
        }
        Ok(time)
    }
}
