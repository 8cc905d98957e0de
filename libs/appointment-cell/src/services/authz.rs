//! Access policy for appointments, kept in one place so handlers and
//! services share the same table instead of re-deriving role checks
//! inline.

use shared_models::auth::User;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// How the authenticated user relates to a specific appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    OwningPatient,
    AssignedDoctor,
    Admin,
}

/// Classify the user against an appointment. Admin outranks the other
/// relations; a doctor only counts as assigned on their own bookings.
pub fn classify(user: &User, appointment: &Appointment) -> Option<Actor> {
    if user.is_admin() {
        return Some(Actor::Admin);
    }
    if user.is_doctor() && appointment.doctor_id.to_string() == user.id {
        return Some(Actor::AssignedDoctor);
    }
    if appointment.patient_id.to_string() == user.id {
        return Some(Actor::OwningPatient);
    }
    None
}

/// Who may move an appointment into each status.
const STATUS_POLICY: &[(AppointmentStatus, &[Actor])] = &[
    (
        AppointmentStatus::Scheduled,
        &[Actor::OwningPatient, Actor::AssignedDoctor, Actor::Admin],
    ),
    (AppointmentStatus::Completed, &[Actor::AssignedDoctor]),
    (
        AppointmentStatus::Cancelled,
        &[Actor::OwningPatient, Actor::AssignedDoctor, Actor::Admin],
    ),
];

pub fn may_set_status(actor: Actor, target: AppointmentStatus) -> bool {
    STATUS_POLICY
        .iter()
        .find(|(status, _)| *status == target)
        .map(|(_, actors)| actors.contains(&actor))
        .unwrap_or(false)
}

pub fn authorize_view(
    user: &User,
    appointment: &Appointment,
) -> Result<Actor, AppointmentError> {
    classify(user, appointment).ok_or_else(|| {
        AppointmentError::NotAuthorized("Not authorized to access this appointment".to_string())
    })
}

pub fn authorize_update(
    user: &User,
    appointment: &Appointment,
) -> Result<Actor, AppointmentError> {
    classify(user, appointment).ok_or_else(|| {
        AppointmentError::NotAuthorized("Not authorized to update this appointment".to_string())
    })
}

pub fn authorize_status_change(
    user: &User,
    appointment: &Appointment,
    target: AppointmentStatus,
) -> Result<Actor, AppointmentError> {
    let actor = authorize_update(user, appointment)?;

    if !may_set_status(actor, target) {
        let message = match target {
            AppointmentStatus::Completed => "Only doctors can mark appointments as completed",
            AppointmentStatus::Cancelled => "Only patients or doctors can cancel appointments",
            AppointmentStatus::Scheduled => "Not authorized to update this appointment",
        };
        return Err(AppointmentError::NotAuthorized(message.to_string()));
    }

    Ok(actor)
}

/// Status changes only leave the scheduled state. Re-asserting
/// `scheduled` on a scheduled appointment is an allowed no-op.
pub fn transition_allowed(current: AppointmentStatus) -> bool {
    !current.is_terminal()
}
