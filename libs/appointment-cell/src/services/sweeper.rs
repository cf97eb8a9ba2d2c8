// libs/appointment-cell/src/services/sweeper.rs
use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use shared_utils::Clock;

use crate::models::{AppointmentStatus, BookingError};
use crate::services::ledger::AppointmentLedger;

/// Background task that marks overdue active appointments as missed.
///
/// Never touches the slot calendar: a missed appointment's slot time is
/// already in the past, so there is nothing left to re-advertise.
pub struct MissedAppointmentSweeper {
    ledger: Arc<dyn AppointmentLedger>,
    clock: Arc<dyn Clock>,
    sweep_interval: Duration,
    grace: ChronoDuration,
    is_shutdown: tokio::sync::RwLock<bool>,
}

impl MissedAppointmentSweeper {
    pub fn new(
        ledger: Arc<dyn AppointmentLedger>,
        clock: Arc<dyn Clock>,
        sweep_interval_secs: u64,
        grace_minutes: i64,
    ) -> Self {
        Self {
            ledger,
            clock,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            grace: ChronoDuration::minutes(grace_minutes),
            is_shutdown: tokio::sync::RwLock::new(false),
        }
    }

    pub async fn run(&self) {
        info!(
            "Missed-appointment sweeper started (interval {:?}, grace {} min)",
            self.sweep_interval,
            self.grace.num_minutes()
        );

        let mut interval = tokio::time::interval(self.sweep_interval);

        loop {
            interval.tick().await;

            if *self.is_shutdown.read().await {
                debug!("Sweeper received shutdown signal");
                break;
            }

            let swept = self.sweep_once().await;
            if swept > 0 {
                info!("Sweep marked {} appointment(s) as missed", swept);
            }
        }

        debug!("Sweeper loop ended");
    }

    /// One pass over the ledger; returns how many appointments were marked.
    pub async fn sweep_once(&self) -> usize {
        let now = self.clock.now();

        let stale = match self.ledger.find_stale(now, self.grace).await {
            Ok(stale) => stale,
            Err(e) => {
                warn!("Sweep could not list stale appointments: {}", e);
                return 0;
            }
        };

        let mut swept = 0;
        for appointment in stale {
            match self
                .ledger
                .transition(appointment.id, AppointmentStatus::Missed, None, now)
                .await
            {
                Ok(_) => {
                    info!(
                        "Appointment {} marked missed (was due {})",
                        appointment.id, appointment.scheduled_at
                    );
                    swept += 1;
                }
                Err(BookingError::InvalidTransition) => {
                    // Lost a race with a concurrent reschedule or sweep;
                    // the appointment is no longer stale
                    debug!("Appointment {} changed during sweep, skipping", appointment.id);
                }
                Err(e) => {
                    warn!("Failed to mark appointment {} missed: {}", appointment.id, e);
                }
            }
        }

        swept
    }

    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        *is_shutdown = true;
    }
}
