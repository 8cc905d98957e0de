use chrono::NaiveTime;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, UpdateDoctorProfileRequest};
use crate::services::scheduling::{TimeRange, WEEKDAY_NAMES};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// List all doctors, ordered by name. Public directory endpoint.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors");

        let doctors: Vec<Doctor> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/doctors?order=full_name.asc",
                None,
                None,
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    /// Fetch the profile row belonging to the authenticated doctor.
    /// Doctor rows share their primary key with the auth user id.
    pub async fn get_profile(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Fetching own doctor profile: {}", user_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", user_id);
        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateDoctorProfileRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", user_id);

        let mut update = json!({});

        if let Some(full_name) = request.full_name {
            update["full_name"] = json!(full_name);
        }
        if let Some(phone) = request.phone {
            update["phone"] = json!(phone);
        }
        if let Some(specialization) = request.specialization {
            update["specialization"] = json!(specialization);
        }
        if let Some(hours) = request.working_hours {
            validate_working_hours(hours.start, hours.end)?;
            update["working_hours"] = json!({
                "start": hours.start.format("%H:%M").to_string(),
                "end": hours.end.format("%H:%M").to_string(),
            });
        }
        if let Some(days) = request.working_days {
            validate_working_days(&days)?;
            update["working_days"] = json!(days);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let path = format!("/rest/v1/doctors?id=eq.{}", user_id);
        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update),
                Some(headers),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }
}

fn validate_working_hours(start: NaiveTime, end: NaiveTime) -> Result<(), DoctorError> {
    if !TimeRange::new(start, end).is_well_formed() {
        return Err(DoctorError::Validation(
            "working_hours.start must be before working_hours.end".to_string(),
        ));
    }
    Ok(())
}

fn validate_working_days(days: &[String]) -> Result<(), DoctorError> {
    for day in days {
        if !WEEKDAY_NAMES.contains(&day.as_str()) {
            return Err(DoctorError::Validation(format!(
                "Invalid working day: {}",
                day
            )));
        }
    }
    Ok(())
}
