use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::User;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, UpdateStatusRequest};
use crate::services::authz;
use crate::services::booking::AppointmentBookingService;
use crate::services::metrics::MetricsRecorder;
use crate::state::SchedulerState;

/// Drives appointments through their lifecycle. Creation and
/// rescheduling live in the booking service; this one only moves
/// status, enforcing the policy table and the terminal-state rule.
pub struct AppointmentLifecycleService {
    booking: AppointmentBookingService,
    metrics: Arc<dyn MetricsRecorder>,
}

impl AppointmentLifecycleService {
    pub fn new(state: &SchedulerState) -> Self {
        Self {
            booking: AppointmentBookingService::new(state),
            metrics: Arc::clone(&state.metrics),
        }
    }

    pub async fn update_status(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let target: AppointmentStatus = request
            .status
            .parse()
            .map_err(|_| AppointmentError::InvalidStatus)?;

        let current = self
            .booking
            .fetch_appointment(appointment_id, auth_token)
            .await?;

        authz::authorize_status_change(user, &current, target)?;

        if !authz::transition_allowed(current.status) {
            return Err(AppointmentError::InvalidStateTransition(current.status));
        }

        let unchanged = current.status == target;

        let mut patch = json!({
            "status": target.as_str(),
            "updated_at": Utc::now().to_rfc3339(),
        });
        if let Some(notes) = request.notes {
            patch["notes"] = json!(notes);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let appointment = self
            .booking
            .write_returning(Method::PATCH, &path, patch, auth_token)
            .await?;

        if !unchanged {
            match target {
                AppointmentStatus::Completed => self.metrics.appointment_completed(),
                AppointmentStatus::Cancelled => self.metrics.appointment_cancelled(),
                AppointmentStatus::Scheduled => {}
            }
        }

        info!(
            "Appointment {} status updated to {} by user {}",
            appointment.id, target, user.id
        );

        Ok(appointment)
    }
}
