use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Source of the current instant used for "is the branch open now".
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the zone the schedules are written in.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock and shifts it into a fixed timezone.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

/// Always reports the same instant.
#[cfg(test)]
#[derive(Copy, Clone, Debug)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
