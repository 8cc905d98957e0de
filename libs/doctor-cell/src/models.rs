use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clock::hhmm;

/// Daily working-hours range, `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkingHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

/// Read-only doctor profile snapshot used for scheduling decisions.
/// `working_days` holds English weekday names (Monday..Sunday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub license_number: String,
    pub working_days: Vec<String>,
    pub working_hours: WorkingHours,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub working_hours: Option<WorkingHours>,
    pub working_days: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// A free 30-minute window. Derived on every query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableSlot {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    /// Present when the doctor does not work that day. An empty slot list
    /// with a message is a success response, not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub available_slots: Vec<AvailableSlot>,
}

/// Row view of an existing booking, as much of it as the generator needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedInterval {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
