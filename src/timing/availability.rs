use std::sync::Arc;

use chrono::NaiveDateTime;

use super::{clock::Clock, schedule::WeeklySchedule, weekday::Weekday};

/// Decides whether a branch is open at a given instant.
///
/// Evaluation never fails: a missing entry, a closed day and an entry without
/// both times all count as closed.
///
/// Boundaries:
/// - same-day hours (`closes_at >= opens_at`) are open strictly between the two
///   times, so both the opening and the closing instant read as closed;
/// - overnight hours (`closes_at < opens_at`) are open from `opens_at` inclusive
///   through midnight until `closes_at` exclusive.
#[derive(Clone)]
pub struct AvailabilityEvaluator {
    clock: Arc<dyn Clock>,
}

impl AvailabilityEvaluator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn is_open_now(&self, schedule: &WeeklySchedule) -> bool {
        Self::is_open_at(schedule, self.now())
    }

    pub fn is_open_at(schedule: &WeeklySchedule, timestamp: NaiveDateTime) -> bool {
        let Some(entry) = schedule.entry_for(Weekday::of(timestamp)) else {
            return false;
        };
        if entry.is_closed() {
            return false;
        }
        let (Some(opens_at), Some(closes_at)) = (entry.opens_at(), entry.closes_at()) else {
            return false;
        };

        let date = timestamp.date();
        let opens = date.and_time(opens_at);
        let closes = date.and_time(closes_at);

        if closes < opens {
            // Early hours are read against the current day's entry.
            return timestamp >= opens || timestamp < closes;
        }
        opens < timestamp && timestamp < closes
    }
}
