use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Services that care about time (booking, the missed-appointment sweeper)
/// take a `Clock` instead of calling `Utc::now()` directly, so tests can pin
/// the clock and step it forward deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
