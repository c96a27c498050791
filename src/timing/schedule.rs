use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::{day_entry::DayEntry, weekday::Weekday};

/// A branch's working hours, at most one entry per weekday.
///
/// Weekdays without an entry are distinct from weekdays explicitly marked closed,
/// even though both evaluate as closed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    entries: BTreeMap<Weekday, DayEntry>,
}

impl WeeklySchedule {
    /// Builds a schedule from entries. A later entry for the same weekday
    /// replaces an earlier one.
    pub fn from_entries<I: IntoIterator<Item = DayEntry>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.weekday(), entry))
                .collect(),
        }
    }

    pub fn entry_for(&self, weekday: Weekday) -> Option<&DayEntry> {
        self.entries.get(&weekday)
    }

    /// Entries ordered Sunday through Saturday.
    pub fn entries(&self) -> impl Iterator<Item = &DayEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}
