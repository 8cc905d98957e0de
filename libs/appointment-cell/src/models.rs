use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clock::{hhmm, hhmm_option};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Completed and cancelled appointments never change status again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// Which side of the desk created the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedBy {
    Patient,
    Doctor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub created_by: CreatedBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The patient id never comes from the request body; it is taken from
/// the authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Status arrives as a raw string so an unknown value yields a 400
/// instead of a deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorAppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

/// Validation failures are separate kinds rather than one stringly
/// variant so callers can branch on them; the boundary layer owns the
/// mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot book appointments in the past")]
    PastDate,

    #[error("Doctor does not work on {0}")]
    NonWorkingDay(&'static str),

    #[error("Appointment time is outside doctor working hours or invalid")]
    OutsideWorkingHours,

    #[error("This time slot is already booked")]
    SlotConflict,

    #[error("Cannot update a {0} appointment")]
    InvalidStateTransition(AppointmentStatus),

    #[error("Invalid status value")]
    InvalidStatus,

    #[error("{0}")]
    NotAuthorized(String),

    #[error("Database error: {0}")]
    Database(String),
}
