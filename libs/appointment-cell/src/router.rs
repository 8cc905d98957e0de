use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::SchedulerState;

/// Every appointment route requires authentication; the per-route
/// policy (ownership, roles) is enforced in the services.
pub fn appointment_routes(state: SchedulerState) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::create_appointment).get(handlers::list_my_appointments),
        )
        .route("/doctor", get(handlers::list_doctor_appointments))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment).put(handlers::update_appointment),
        )
        .route(
            "/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
