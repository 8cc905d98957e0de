use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use doctor_cell::services::scheduling::{conflicts, weekday_name, TimeRange, WorkingWindow};
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::clock::hhmm;

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, BookAppointmentRequest,
    DoctorAppointmentListQuery, UpdateAppointmentRequest,
};
use crate::services::authz;
use crate::services::locks::SlotLockRegistry;
use crate::services::metrics::MetricsRecorder;
use crate::state::SchedulerState;

/// Just enough of a stored appointment row to run conflict checks.
#[derive(Debug, Deserialize)]
struct ScheduledRow {
    id: Uuid,
    #[serde(with = "hhmm")]
    start_time: NaiveTime,
    #[serde(with = "hhmm")]
    end_time: NaiveTime,
}

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    locks: Arc<SlotLockRegistry>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl AppointmentBookingService {
    pub fn new(state: &SchedulerState) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(&state.config)),
            locks: Arc::clone(&state.locks),
            metrics: Arc::clone(&state.metrics),
        }
    }

    /// Create a booking for the authenticated user. Validation runs
    /// in a fixed order: doctor, date, working day, working hours,
    /// then slot conflicts under the per-(doctor, date) lock.
    pub async fn book_appointment(
        &self,
        user: &User,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            user.id, request.doctor_id
        );

        let doctor = self.fetch_doctor(request.doctor_id, auth_token).await?;
        let range = TimeRange::new(request.start_time, request.end_time);
        self.validate_schedule(&doctor, request.date, range)?;

        // Serialize the check-then-insert window per doctor day.
        let _guard = self.locks.acquire(request.doctor_id, request.date).await;

        self.ensure_slot_free(request.doctor_id, request.date, range, None, auth_token)
            .await?;

        let created_by = if user.is_doctor() { "doctor" } else { "patient" };
        let now = Utc::now().to_rfc3339();
        let row = json!({
            "patient_id": user.id,
            "doctor_id": request.doctor_id,
            "date": request.date,
            "start_time": request.start_time.format("%H:%M").to_string(),
            "end_time": request.end_time.format("%H:%M").to_string(),
            "status": "scheduled",
            "reason": request.reason,
            "notes": request.notes.unwrap_or_default(),
            "created_by": created_by,
            "created_at": now,
            "updated_at": now,
        });

        let appointment = self
            .write_returning(Method::POST, "/rest/v1/appointments", row, auth_token)
            .await?;

        self.metrics.appointment_created();
        info!(
            "Appointment created: {} for patient {} with doctor {}",
            appointment.id, appointment.patient_id, appointment.doctor_id
        );

        Ok(appointment)
    }

    /// Reschedule or annotate an existing booking. Only scheduled
    /// appointments can change, and whenever any part of the
    /// (date, start, end) tuple moves, the full tuple that would
    /// result is re-validated, not just the fields that changed.
    pub async fn update_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.fetch_appointment(appointment_id, auth_token).await?;
        authz::authorize_update(user, &current)?;

        if current.status.is_terminal() {
            return Err(AppointmentError::InvalidStateTransition(current.status));
        }

        // Omitted scheduling fields keep their stored values.
        let date = request.date.unwrap_or(current.date);
        let start_time = request.start_time.unwrap_or(current.start_time);
        let end_time = request.end_time.unwrap_or(current.end_time);
        let schedule_moved =
            date != current.date || start_time != current.start_time || end_time != current.end_time;

        let mut patch = json!({ "updated_at": Utc::now().to_rfc3339() });

        if schedule_moved {
            let doctor = self.fetch_doctor(current.doctor_id, auth_token).await?;
            let range = TimeRange::new(start_time, end_time);
            self.validate_schedule(&doctor, date, range)?;

            let _guard = self.locks.acquire(current.doctor_id, date).await;
            self.ensure_slot_free(
                current.doctor_id,
                date,
                range,
                Some(appointment_id),
                auth_token,
            )
            .await?;

            patch["date"] = json!(date);
            patch["start_time"] = json!(start_time.format("%H:%M").to_string());
            patch["end_time"] = json!(end_time.format("%H:%M").to_string());

            if let Some(reason) = request.reason {
                patch["reason"] = json!(reason);
            }
            if let Some(notes) = request.notes {
                patch["notes"] = json!(notes);
            }

            let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
            return self
                .write_returning(Method::PATCH, &path, patch, auth_token)
                .await;
        }

        if let Some(reason) = request.reason {
            patch["reason"] = json!(reason);
        }
        if let Some(notes) = request.notes {
            patch["notes"] = json!(notes);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.write_returning(Method::PATCH, &path, patch, auth_token)
            .await
    }

    pub async fn get_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.fetch_appointment(appointment_id, auth_token).await?;
        authz::authorize_view(user, &appointment)?;
        Ok(appointment)
    }

    /// The authenticated patient's own appointments, soonest first.
    pub async fn list_for_patient(
        &self,
        user: &User,
        query: AppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,start_time.asc",
            user.id
        );
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    /// The authenticated doctor's calendar, optionally narrowed to one
    /// status and one date.
    pub async fn list_for_doctor(
        &self,
        user: &User,
        query: DoctorAppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=date.asc,start_time.asc",
            user.id
        );
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }
        if let Some(date) = query.date {
            path.push_str(&format!("&date=eq.{}", date));
        }

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub(crate) async fn fetch_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    async fn fetch_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Doctor, AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let rows: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(AppointmentError::DoctorNotFound)
    }

    /// The stateless part of the pipeline: date not in the past, on a
    /// working day, inside working hours, running forward in time.
    fn validate_schedule(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        range: TimeRange,
    ) -> Result<(), AppointmentError> {
        if date < Utc::now().date_naive() {
            return Err(AppointmentError::PastDate);
        }

        let window = WorkingWindow::new(
            doctor.working_days.clone(),
            doctor.working_hours.start,
            doctor.working_hours.end,
        );

        if !window.is_working_day(date) {
            return Err(AppointmentError::NonWorkingDay(weekday_name(date.weekday())));
        }

        if !window.admits(range) {
            return Err(AppointmentError::OutsideWorkingHours);
        }

        Ok(())
    }

    /// Conflict check against that day's scheduled rows. Only the
    /// scheduled status blocks; completed and cancelled rows release
    /// their interval. `exclude` skips the appointment being moved so
    /// it never conflicts with itself.
    async fn ensure_slot_free(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        range: TimeRange,
        exclude: Option<Uuid>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=eq.scheduled&select=id,start_time,end_time",
            doctor_id, date
        );
        let rows: Vec<ScheduledRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let taken = rows
            .iter()
            .filter(|row| Some(row.id) != exclude)
            .any(|row| conflicts(range, TimeRange::new(row.start_time, row.end_time)));

        if taken {
            warn!(
                "Appointment conflict for doctor {} on {} at {}-{}",
                doctor_id, date, range.start, range.end
            );
            return Err(AppointmentError::SlotConflict);
        }

        Ok(())
    }

    pub(crate) async fn write_returning(
        &self,
        method: Method,
        path: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(method, path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }
}
