use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;

/// Clock that only moves when a test tells it to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let start = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .expect("valid test timestamp");
        Self::new(start)
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_holds_still() {
        let clock = ManualClock::at(2025, 6, 2, 9, 0);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at(2025, 6, 2, 9, 0);
        let before = clock.now();

        clock.advance(Duration::minutes(30));

        assert_eq!(clock.now(), before + Duration::minutes(30));
    }

    #[test]
    fn test_manual_clock_set_jumps_backwards() {
        let clock = ManualClock::at(2025, 6, 2, 9, 0);
        let start = clock.now();
        clock.advance(Duration::hours(2));

        clock.set(start);

        assert_eq!(clock.now(), start);
    }
}
