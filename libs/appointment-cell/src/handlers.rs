use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentListQuery, BookAppointmentRequest, DoctorAppointmentListQuery,
    UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::state::SchedulerState;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::NotAuthorized(msg) => AppError::Forbidden(msg),
            AppointmentError::SlotConflict => {
                AppError::Conflict("This time slot is already booked".to_string())
            }
            AppointmentError::Database(msg) => AppError::Database(msg),
            // The remaining kinds are all out-of-policy input.
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::new(&state);

    let appointment = service
        .book_appointment(&user, request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);

    let appointments = service
        .list_for_patient(&user, query, auth.token())
        .await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "count": count,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<DoctorAppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can list their appointments".to_string(),
        ));
    }

    let service = AppointmentBookingService::new(&state);

    let appointments = service.list_for_doctor(&user, query, auth.token()).await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "count": count,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);

    let appointment = service
        .get_appointment(&user, appointment_id, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);

    let appointment = service
        .update_appointment(&user, appointment_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<SchedulerState>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::new(&state);

    let appointment = service
        .update_status(&user, appointment_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}
