use std::sync::Arc;

use axum::{
    Json, Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;
use doctor_cell::handlers::DoctorCellState;
use doctor_cell::router::doctor_routes;
use shared_models::HealthStatus;

pub fn create_router(doctor_state: DoctorCellState, booking: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .route("/health", get(|| async { Json(HealthStatus::ok("clinic-api")) }))
        .nest("/doctors", doctor_routes(doctor_state))
        .nest("/appointments", appointment_routes(booking))
}
