pub mod availability;
pub mod clock;
pub mod day_entry;
pub mod schedule;
pub mod time_of_day;
pub mod weekday;
