pub mod booking;
pub mod ledger;
pub mod sweeper;

pub use booking::BookingService;
pub use ledger::{AppointmentLedger, InMemoryLedger};
pub use sweeper::MissedAppointmentSweeper;
