// libs/appointment-cell/src/services/ledger.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::models::DoctorId;
use shared_store::AtomicMap;

use crate::models::{Appointment, AppointmentStatus, BookingError, NewAppointment};

/// Record of every appointment ever booked. Entries are created and
/// mutated, never deleted; `transition` enforces the status machine
/// atomically per appointment, so concurrent reschedules and sweeps
/// cannot lose updates.
#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    async fn create(
        &self,
        new: NewAppointment,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, BookingError>;

    /// Atomically apply a status change (and optionally a new time) after
    /// validating it against the current record. Moving to Missed also
    /// requires the appointment time to be in the past: a sweep that lost
    /// the race against a reschedule fails here instead of marking a
    /// future appointment missed.
    async fn transition(
        &self,
        id: Uuid,
        new_status: AppointmentStatus,
        new_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError>;

    /// Active appointments whose time is at least `grace` in the past.
    async fn find_stale(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Appointment>, BookingError>;

    /// Active appointment for `doctor_id` at exactly `at`, skipping
    /// `exclude`. Conflict guard for reschedule.
    async fn find_active_at(
        &self,
        doctor_id: &DoctorId,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, BookingError>;

    /// Every appointment, sorted by creation for stable output.
    async fn list(&self) -> Result<Vec<Appointment>, BookingError>;
}

pub struct InMemoryLedger {
    appointments: AtomicMap<Uuid, Appointment>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            appointments: AtomicMap::new(),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentLedger for InMemoryLedger {
    async fn create(
        &self,
        new: NewAppointment,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: new.patient_name,
            patient_email: new.patient_email,
            doctor_id: new.doctor_id,
            scheduled_at: new.scheduled_at,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        self.appointments.update(appointment.id, |entry| {
            *entry = Some(appointment.clone());
        });

        debug!(
            "Created appointment {} for doctor {} at {}",
            appointment.id, appointment.doctor_id, appointment.scheduled_at
        );
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, BookingError> {
        self.appointments
            .read(&id, |entry| entry.cloned())
            .ok_or(BookingError::NotFound)
    }

    async fn transition(
        &self,
        id: Uuid,
        new_status: AppointmentStatus,
        new_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        self.appointments.update(id, |entry| {
            let appointment = entry.as_mut().ok_or(BookingError::NotFound)?;

            if !appointment.status.can_transition_to(&new_status) {
                return Err(BookingError::InvalidTransition);
            }
            // Cannot miss an appointment whose time has not passed yet
            if new_status == AppointmentStatus::Missed && appointment.scheduled_at > now {
                return Err(BookingError::InvalidTransition);
            }

            appointment.status = new_status;
            if let Some(at) = new_time {
                appointment.scheduled_at = at;
            }
            appointment.updated_at = now;

            Ok(appointment.clone())
        })
    }

    async fn find_stale(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Appointment>, BookingError> {
        let cutoff = now - grace;
        let mut stale: Vec<Appointment> = self
            .appointments
            .snapshot()
            .into_iter()
            .map(|(_, appointment)| appointment)
            .filter(|appointment| appointment.is_active() && appointment.scheduled_at <= cutoff)
            .collect();
        stale.sort_by_key(|appointment| appointment.scheduled_at);
        Ok(stale)
    }

    async fn find_active_at(
        &self,
        doctor_id: &DoctorId,
        at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, BookingError> {
        Ok(self
            .appointments
            .snapshot()
            .into_iter()
            .map(|(_, appointment)| appointment)
            .find(|appointment| {
                appointment.is_active()
                    && &appointment.doctor_id == doctor_id
                    && appointment.scheduled_at == at
                    && Some(appointment.id) != exclude
            }))
    }

    async fn list(&self) -> Result<Vec<Appointment>, BookingError> {
        let mut all: Vec<Appointment> = self
            .appointments
            .snapshot()
            .into_iter()
            .map(|(_, appointment)| appointment)
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}
