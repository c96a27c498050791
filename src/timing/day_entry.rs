use chrono::NaiveTime;
use serde::Serialize;

use super::{time_of_day::serialize_optional, weekday::Weekday};

/// One weekday's working hours for a branch.
///
/// A closed day carries no times. An open day is expected to carry both, but
/// entries loaded from storage are not re-validated: a missing time simply makes
/// the day evaluate as closed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    #[serde(rename = "day_of_week")]
    weekday: Weekday,
    #[serde(serialize_with = "serialize_optional")]
    opens_at: Option<NaiveTime>,
    #[serde(serialize_with = "serialize_optional")]
    closes_at: Option<NaiveTime>,
    is_closed: bool,
}

impl DayEntry {
    pub fn new(
        weekday: Weekday,
        opens_at: Option<NaiveTime>,
        closes_at: Option<NaiveTime>,
        is_closed: bool,
    ) -> Self {
        Self {
            weekday,
            opens_at,
            closes_at,
            is_closed,
        }
    }

    pub fn new_open(weekday: Weekday, opens_at: NaiveTime, closes_at: NaiveTime) -> Self {
        Self::new(weekday, Some(opens_at), Some(closes_at), false)
    }

    pub fn new_closed(weekday: Weekday) -> Self {
        Self::new(weekday, None, None, true)
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn opens_at(&self) -> Option<NaiveTime> {
        self.opens_at
    }

    pub fn closes_at(&self) -> Option<NaiveTime> {
        self.closes_at
    }
}
