use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{self, DoctorCellState};

pub fn doctor_routes(state: DoctorCellState) -> Router {
    Router::new()
        .route("/", post(handlers::add_doctor))
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}/availability", put(handlers::update_availability))
        .route("/{doctor_id}/availability", get(handlers::get_availability))
        .with_state(state)
}
