//! Clock abstraction so time-dependent logic stays testable.

use chrono::{DateTime, Utc};

/// Supplies the current instant. The scheduler takes this as a generic
/// parameter so tests can pin time to a fixed value.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
