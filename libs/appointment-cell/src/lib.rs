pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, CreatedBy,
    UpdateAppointmentRequest, UpdateStatusRequest,
};
pub use state::SchedulerState;
