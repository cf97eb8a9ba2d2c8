// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, BookingError, RescheduleAppointmentRequest};
use crate::services::BookingService;

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(booking): State<Arc<BookingService>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.patient_name.trim().is_empty() || request.patient_email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "patient_name and patient_email are required".to_string(),
        ));
    }

    let appointment = booking
        .book_appointment(request)
        .await
        .map_err(|e| match e {
            BookingError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            BookingError::SlotUnavailable => {
                AppError::Conflict("Appointment slot not available".to_string())
            }
            BookingError::SlotAlreadyBooked => {
                AppError::Conflict("Appointment slot conflicts with existing booking".to_string())
            }
            BookingError::InvalidTransition => {
                AppError::Conflict("Appointment cannot be modified in its current status".to_string())
            }
            BookingError::StoreFailure(msg) => AppError::Internal(msg),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(booking): State<Arc<BookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = booking
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(|e| match e {
            BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            BookingError::SlotUnavailable => {
                AppError::Conflict("New appointment slot not available".to_string())
            }
            BookingError::SlotAlreadyBooked => {
                AppError::Conflict("New slot conflicts with existing booking".to_string())
            }
            BookingError::InvalidTransition => {
                AppError::Conflict("Appointment can no longer be rescheduled".to_string())
            }
            BookingError::StoreFailure(msg) => AppError::Internal(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(booking): State<Arc<BookingService>>,
) -> Result<Json<Value>, AppError> {
    let appointments = booking
        .list_appointments()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}
