use chrono::{Datelike, NaiveDate};
use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailableSlot, BookedInterval, DayAvailability, Doctor, DoctorError};
use crate::services::scheduling::{blocks_slot_start, weekday_name, TimeRange, WorkingWindow};

/// Computes the free 30-minute slots for one doctor on one date.
/// Availability is derived fresh on every query from the doctor's
/// working window and that day's scheduled appointments.
pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<DayAvailability, DoctorError> {
        debug!("Computing availability for doctor {} on {}", doctor_id, date);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let doctors: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctor = doctors.into_iter().next().ok_or(DoctorError::NotFound)?;

        let window = WorkingWindow::new(
            doctor.working_days.clone(),
            doctor.working_hours.start,
            doctor.working_hours.end,
        );

        if !window.is_working_day(date) {
            return Ok(DayAvailability {
                date,
                doctor_id,
                doctor_name: doctor.full_name,
                message: Some(format!(
                    "Doctor does not work on {}",
                    weekday_name(date.weekday())
                )),
                available_slots: Vec::new(),
            });
        }

        let booked = self.scheduled_intervals(doctor_id, date).await?;

        let available_slots = window
            .slots()
            .into_iter()
            .filter(|slot| !booked.iter().any(|b| blocks_slot_start(*b, slot.start)))
            .filter_map(|slot| {
                Some(AvailableSlot {
                    start_time: slot.start_time()?,
                    end_time: slot.end_time()?,
                })
            })
            .collect();

        Ok(DayAvailability {
            date,
            doctor_id,
            doctor_name: doctor.full_name,
            message: None,
            available_slots,
        })
    }

    /// Only `scheduled` rows occupy slots; completed and cancelled
    /// bookings free their time again.
    async fn scheduled_intervals(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeRange>, DoctorError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=eq.scheduled&order=start_time.asc",
            doctor_id, date
        );

        let rows: Vec<BookedInterval> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| TimeRange::new(r.start_time, r.end_time))
            .collect())
    }
}
