use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use shared_store::AtomicMap;

use crate::models::{DaySchedule, DoctorError, DoctorId, SlotReservation, SlotTime};

/// Per-doctor, per-date slot inventory.
///
/// `reserve` and `release` are the only paths that consume or return slots,
/// and both are atomic per (doctor, date): two concurrent reservations of
/// the same slot resolve to exactly one `Reserved`.
#[async_trait]
pub trait SlotCalendar: Send + Sync {
    /// Slots currently free on `date`. Empty when no schedule entry exists.
    async fn availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<BTreeSet<SlotTime>, DoctorError>;

    /// Replace the slot set for `date`, creating the entry if absent.
    /// Does not cross-check existing appointments.
    async fn set_availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        slots: BTreeSet<SlotTime>,
    ) -> Result<(), DoctorError>;

    /// Atomically take `time` out of the available set.
    async fn reserve(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<SlotReservation, DoctorError>;

    /// Atomically put `time` back. Idempotent.
    async fn release(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<(), DoctorError>;

    /// Full schedule for a doctor, sorted by date.
    async fn schedule(&self, doctor_id: &DoctorId) -> Result<Vec<DaySchedule>, DoctorError>;
}

pub struct InMemoryCalendar {
    days: AtomicMap<(DoctorId, NaiveDate), BTreeSet<SlotTime>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self {
            days: AtomicMap::new(),
        }
    }
}

impl Default for InMemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotCalendar for InMemoryCalendar {
    async fn availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<BTreeSet<SlotTime>, DoctorError> {
        let key = (doctor_id.clone(), date);
        Ok(self.days.read(&key, |entry| entry.cloned().unwrap_or_default()))
    }

    async fn set_availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        slots: BTreeSet<SlotTime>,
    ) -> Result<(), DoctorError> {
        let count = slots.len();
        self.days.update((doctor_id.clone(), date), |entry| {
            *entry = Some(slots);
        });
        info!(
            "Availability for doctor {} on {} set to {} slots",
            doctor_id, date, count
        );
        Ok(())
    }

    async fn reserve(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<SlotReservation, DoctorError> {
        let outcome = self.days.update((doctor_id.clone(), date), |entry| {
            match entry.as_mut() {
                Some(slots) => {
                    // remove() doubles as the presence check
                    if slots.remove(&time) {
                        SlotReservation::Reserved
                    } else {
                        SlotReservation::AlreadyTaken
                    }
                }
                None => SlotReservation::AlreadyTaken,
            }
        });
        debug!(
            "Reserve {} on {} for doctor {}: {:?}",
            time, date, doctor_id, outcome
        );
        Ok(outcome)
    }

    async fn release(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<(), DoctorError> {
        self.days.update((doctor_id.clone(), date), |entry| {
            entry.get_or_insert_with(BTreeSet::new).insert(time);
        });
        debug!("Released {} on {} for doctor {}", time, date, doctor_id);
        Ok(())
    }

    async fn schedule(&self, doctor_id: &DoctorId) -> Result<Vec<DaySchedule>, DoctorError> {
        let mut days: Vec<DaySchedule> = self
            .days
            .snapshot()
            .into_iter()
            .filter(|((id, _), _)| id == doctor_id)
            .map(|((_, date), available_slots)| DaySchedule {
                date,
                available_slots,
            })
            .collect();
        days.sort_by_key(|day| day.date);
        Ok(days)
    }
}
