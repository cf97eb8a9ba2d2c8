use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{
    AddDoctorRequest, DaySchedule, DoctorError, DoctorId, SlotTime, UpdateAvailabilityRequest,
};
use crate::services::{DoctorDirectoryService, SlotCalendar};

/// State for the doctor routes, constructed once in the api binary.
#[derive(Clone)]
pub struct DoctorCellState {
    pub directory: Arc<DoctorDirectoryService>,
    pub calendar: Arc<dyn SlotCalendar>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<DoctorCellState>,
    Json(request): Json<AddDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.id.trim().is_empty()
        || request.name.trim().is_empty()
        || request.email.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "id, name and email are required".to_string(),
        ));
    }

    let doctor = state
        .directory
        .add_doctor(request)
        .await
        .map_err(|e| match e {
            DoctorError::AlreadyExists => AppError::Conflict("Doctor already exists".to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "doctor": doctor
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<DoctorCellState>) -> Result<Json<Value>, AppError> {
    let doctors = state.directory.list_doctors().await;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<DoctorCellState>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = DoctorId::new(doctor_id);

    state
        .directory
        .find_doctor(&doctor_id)
        .await
        .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

    let slots: BTreeSet<SlotTime> = request.slots.into_iter().collect();

    state
        .calendar
        .set_availability(&doctor_id, request.date, slots.clone())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "schedule": DaySchedule {
            date: request.date,
            available_slots: slots,
        }
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<DoctorCellState>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = DoctorId::new(doctor_id);

    state
        .directory
        .find_doctor(&doctor_id)
        .await
        .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

    match query.date {
        Some(date) => {
            let available_slots = state
                .calendar
                .availability(&doctor_id, date)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

            Ok(Json(json!({
                "success": true,
                "schedule": DaySchedule { date, available_slots }
            })))
        }
        None => {
            let schedule = state
                .calendar
                .schedule(&doctor_id)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

            Ok(Json(json!({
                "success": true,
                "schedule": schedule
            })))
        }
    }
}
