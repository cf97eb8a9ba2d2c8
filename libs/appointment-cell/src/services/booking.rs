// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{DoctorId, SlotTime};
use doctor_cell::services::{DoctorDirectoryService, SlotCalendar};
use notification_cell::models::RescheduleNotice;
use notification_cell::services::NotificationDispatcher;
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingError, NewAppointment,
    RescheduleAppointmentRequest,
};
use crate::services::ledger::AppointmentLedger;

/// Composing authority for bookings. The calendar's atomic reserve is the
/// only admission control for a slot; every failure after a successful
/// reserve triggers a compensating release, so no reservation is orphaned.
pub struct BookingService {
    directory: Arc<DoctorDirectoryService>,
    calendar: Arc<dyn SlotCalendar>,
    ledger: Arc<dyn AppointmentLedger>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl BookingService {
    pub fn new(
        directory: Arc<DoctorDirectoryService>,
        calendar: Arc<dyn SlotCalendar>,
        ledger: Arc<dyn AppointmentLedger>,
        clock: Arc<dyn Clock>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            directory,
            calendar,
            ledger,
            clock,
            dispatcher,
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let doctor_id = DoctorId::new(request.doctor_id.clone());
        self.directory.find_doctor(&doctor_id).await?;

        // Slots are minute-granular: align the stored timestamp with the
        // calendar slot it occupies.
        let (date, slot) = split_timestamp(request.scheduled_at);
        let scheduled_at = combine(date, slot);

        debug!("Booking doctor {} at {} {}", doctor_id, date, slot);

        let reservation = self.calendar.reserve(&doctor_id, date, slot).await?;
        if !reservation.is_reserved() {
            debug!(
                "Slot {} on {} already taken for doctor {}",
                slot, date, doctor_id
            );
            return Err(BookingError::SlotUnavailable);
        }

        let new = NewAppointment {
            patient_name: request.patient_name,
            patient_email: request.patient_email,
            doctor_id: doctor_id.clone(),
            scheduled_at,
        };

        match self.ledger.create(new, self.clock.now()).await {
            Ok(appointment) => {
                info!(
                    "Booked appointment {} for doctor {} at {}",
                    appointment.id, doctor_id, appointment.scheduled_at
                );
                Ok(appointment)
            }
            Err(e) => {
                warn!(
                    "Appointment creation failed after reserve, releasing {} on {} for doctor {}",
                    slot, date, doctor_id
                );
                if let Err(release_err) = self.calendar.release(&doctor_id, date, slot).await {
                    warn!(
                        "Compensating release of {} on {} for doctor {} failed: {}",
                        slot, date, doctor_id, release_err
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.ledger.find_by_id(appointment_id).await?;

        // Terminal pre-check before any calendar mutation
        if !appointment
            .status
            .can_transition_to(&AppointmentStatus::Rescheduled)
        {
            debug!(
                "Appointment {} is {} and cannot be rescheduled",
                appointment_id, appointment.status
            );
            return Err(BookingError::InvalidTransition);
        }

        let doctor_id = appointment.doctor_id.clone();
        let new_at = combine(request.new_date, request.new_time);

        // Fast-path conflict guard; the atomic reserve below is the
        // authoritative tie-breaker for concurrent racers
        if let Some(existing) = self
            .ledger
            .find_active_at(&doctor_id, new_at, Some(appointment_id))
            .await?
        {
            debug!(
                "Appointment {} already occupies {} for doctor {}",
                existing.id, new_at, doctor_id
            );
            return Err(BookingError::SlotAlreadyBooked);
        }

        let reservation = self
            .calendar
            .reserve(&doctor_id, request.new_date, request.new_time)
            .await?;
        if !reservation.is_reserved() {
            return Err(BookingError::SlotUnavailable);
        }

        let (old_date, old_slot) = split_timestamp(appointment.scheduled_at);

        let updated = match self
            .ledger
            .transition(
                appointment_id,
                AppointmentStatus::Rescheduled,
                Some(new_at),
                self.clock.now(),
            )
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                warn!(
                    "Transition of appointment {} failed after reserve, releasing {} on {} for doctor {}",
                    appointment_id, request.new_time, request.new_date, doctor_id
                );
                if let Err(release_err) = self
                    .calendar
                    .release(&doctor_id, request.new_date, request.new_time)
                    .await
                {
                    warn!(
                        "Compensating release of {} on {} for doctor {} failed: {}",
                        request.new_time, request.new_date, doctor_id, release_err
                    );
                }
                return Err(e);
            }
        };

        // The move has committed; failure to free the vacated slot is
        // logged, not propagated
        if let Err(e) = self.calendar.release(&doctor_id, old_date, old_slot).await {
            warn!(
                "Failed to release vacated slot {} on {} for doctor {}: {}",
                old_slot, old_date, doctor_id, e
            );
        }

        info!(
            "Rescheduled appointment {} to {}",
            appointment_id, updated.scheduled_at
        );

        self.dispatcher.dispatch(RescheduleNotice {
            recipient: updated.patient_email.clone(),
            new_date: request.new_date,
            new_time: request.new_time.as_time(),
        });

        Ok(updated)
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, BookingError> {
        self.ledger.list().await
    }
}

fn split_timestamp(at: DateTime<Utc>) -> (NaiveDate, SlotTime) {
    (at.date_naive(), SlotTime::from_time(at.time()))
}

fn combine(date: NaiveDate, slot: SlotTime) -> DateTime<Utc> {
    date.and_time(slot.as_time()).and_utc()
}
