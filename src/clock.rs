//! Time source for hold expiry.
//!
//! Tables never read the wall clock directly; they ask a [`Clock`] once per
//! operation. [`ManualClock`] lets tests move time across expiry boundaries
//! deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> ManualClock {
        ManualClock {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.lock().expect("manual clock poisoned");
        *guard = *guard + delta;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.lock().expect("manual clock poisoned");
        *guard = now;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("manual clock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::{Clock, ManualClock};
    use chrono::Duration;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::default();
        let start = clock.now();
        assert_eq!(start, clock.now());

        let shared = clock.clone();
        shared.advance(Duration::seconds(61));
        assert_eq!(start + Duration::seconds(61), clock.now());

        clock.set(start);
        assert_eq!(start, shared.now());
    }
}
