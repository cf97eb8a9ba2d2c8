// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};
use std::fmt;
use thiserror::Error;

use doctor_cell::models::{DoctorError, DoctorId, SlotTime};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: DoctorId,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Active appointments occupy their slot and are eligible for the
    /// missed-sweep and for reschedule.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Rescheduled,
    Missed,
}

impl AppointmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Rescheduled
        )
    }

    /// Allowed status moves. Missed is terminal.
    pub fn can_transition_to(&self, next: &AppointmentStatus) -> bool {
        match self {
            AppointmentStatus::Scheduled | AppointmentStatus::Rescheduled => matches!(
                next,
                AppointmentStatus::Rescheduled | AppointmentStatus::Missed
            ),
            // Terminal state - no transitions allowed
            AppointmentStatus::Missed => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
            AppointmentStatus::Missed => write!(f, "missed"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Ledger input for a new booking; id, status and audit stamps are assigned
/// on create.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: DoctorId,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: NaiveDate,
    pub new_time: SlotTime,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Not found")]
    NotFound,

    #[error("Slot not available")]
    SlotUnavailable,

    #[error("Slot already booked by another appointment")]
    SlotAlreadyBooked,

    #[error("Invalid status transition")]
    InvalidTransition,

    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl From<DoctorError> for BookingError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => BookingError::NotFound,
            DoctorError::StoreFailure(msg) => BookingError::StoreFailure(msg),
            // A duplicate-id report has no booking-side meaning
            other => BookingError::StoreFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        assert!(AppointmentStatus::Scheduled.is_active());
        assert!(AppointmentStatus::Rescheduled.is_active());
        assert!(!AppointmentStatus::Missed.is_active());
    }

    #[test]
    fn test_transition_table() {
        use AppointmentStatus::*;

        assert!(Scheduled.can_transition_to(&Rescheduled));
        assert!(Scheduled.can_transition_to(&Missed));
        assert!(Rescheduled.can_transition_to(&Rescheduled));
        assert!(Rescheduled.can_transition_to(&Missed));

        assert!(!Missed.can_transition_to(&Scheduled));
        assert!(!Missed.can_transition_to(&Rescheduled));
        assert!(!Missed.can_transition_to(&Missed));
        assert!(!Scheduled.can_transition_to(&Scheduled));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Rescheduled).unwrap(),
            "\"rescheduled\""
        );
    }
}
