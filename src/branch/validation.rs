use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::FieldErrors,
    timing::{day_entry::DayEntry, time_of_day::parse_time_of_day, weekday::Weekday},
};

use super::model::NewBranch;

/// One day of a bulk working hours update, as received.
///
/// Fields stay untyped so that a wrong type is reported against the field
/// rather than rejecting the whole body.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkingHoursInput {
    #[serde(default)]
    pub day_of_week: Option<Value>,
    #[serde(default)]
    pub opens_at: Option<Value>,
    #[serde(default)]
    pub closes_at: Option<Value>,
    #[serde(default)]
    pub is_closed: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorkingHoursRequest {
    #[serde(default)]
    pub data: Vec<WorkingHoursInput>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OpenDayRequest {
    #[serde(default)]
    pub opens_at: Option<String>,
    #[serde(default)]
    pub closes_at: Option<String>,
}

fn push(errors: &mut FieldErrors, field: String, message: &str) {
    errors.entry(field).or_default().push(message.to_string());
}

/// Parses an optional time, recording a format error under `field`.
fn parse_field(errors: &mut FieldErrors, field: String, text: Option<&str>) -> Option<NaiveTime> {
    let text = text?;
    let time = parse_time_of_day(text);
    if time.is_none() {
        push(errors, field, "The time must match the format H:i:s.");
    }
    time
}

/// Reads an integer given as a JSON number or a numeric string.
fn integer_like(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Reads `true`/`false`, `1`/`0` and their string forms.
fn boolean_like(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.as_str() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Parses an untyped optional time; anything but a string is a format error.
fn parse_value_field(
    errors: &mut FieldErrors,
    field: String,
    value: Option<&Value>,
) -> Option<NaiveTime> {
    match value? {
        Value::String(text) => parse_field(errors, field, Some(text)),
        _ => {
            push(errors, field, "The time must match the format H:i:s.");
            None
        }
    }
}

pub fn validate_new_branch(branch: &NewBranch) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if branch.name.is_empty() {
        push(&mut errors, "name".to_string(), "The name field is required.");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a bulk update and turns it into day entries.
///
/// A closed day must not carry times; an open day needs both, and they must
/// differ. Errors are keyed `data.{index}.{field}`.
pub fn validate_working_hours(data: &[WorkingHoursInput]) -> Result<Vec<DayEntry>, FieldErrors> {
    let mut errors = FieldErrors::new();
    if data.is_empty() {
        push(&mut errors, "data".to_string(), "The data field is required.");
        return Err(errors);
    }

    let mut entries = Vec::with_capacity(data.len());
    for (index, day) in data.iter().enumerate() {
        let weekday = match day.day_of_week.as_ref() {
            None => {
                push(
                    &mut errors,
                    format!("data.{}.day_of_week", index),
                    "The day of week field is required.",
                );
                None
            }
            Some(value) => match integer_like(value) {
                None => {
                    push(
                        &mut errors,
                        format!("data.{}.day_of_week", index),
                        "The day of week must be an integer.",
                    );
                    None
                }
                Some(number) => {
                    let weekday = u8::try_from(number).ok().and_then(Weekday::from_number);
                    if weekday.is_none() {
                        push(
                            &mut errors,
                            format!("data.{}.day_of_week", index),
                            "The day of week must be between 0 and 6.",
                        );
                    }
                    weekday
                }
            },
        };
        let is_closed = match day.is_closed.as_ref() {
            None => {
                push(
                    &mut errors,
                    format!("data.{}.is_closed", index),
                    "The is closed field is required.",
                );
                None
            }
            Some(value) => {
                let flag = boolean_like(value);
                if flag.is_none() {
                    push(
                        &mut errors,
                        format!("data.{}.is_closed", index),
                        "The is closed field must be true or false.",
                    );
                }
                flag
            }
        };
        let opens_at = parse_value_field(
            &mut errors,
            format!("data.{}.opens_at", index),
            day.opens_at.as_ref(),
        );
        let closes_at = parse_value_field(
            &mut errors,
            format!("data.{}.closes_at", index),
            day.closes_at.as_ref(),
        );

        // The closed/open rules only apply once the flag itself is readable.
        let Some(is_closed) = is_closed else {
            continue;
        };
        if is_closed {
            if day.opens_at.is_some() {
                push(
                    &mut errors,
                    format!("data.{}.opens_at", index),
                    "Opening time must be null when the day is marked as closed.",
                );
            }
            if day.closes_at.is_some() {
                push(
                    &mut errors,
                    format!("data.{}.closes_at", index),
                    "Closing time must be null when the day is marked as closed.",
                );
            }
        } else {
            if day.opens_at.is_none() {
                push(
                    &mut errors,
                    format!("data.{}.opens_at", index),
                    "Opening time is required when the day is not closed.",
                );
            }
            if day.closes_at.is_none() {
                push(
                    &mut errors,
                    format!("data.{}.closes_at", index),
                    "Closing time is required when the day is not closed.",
                );
            }
            if opens_at.is_some() && opens_at == closes_at {
                push(
                    &mut errors,
                    format!("data.{}.closes_at", index),
                    "Opening time cannot be the same as closing time.",
                );
            }
        }

        if let Some(weekday) = weekday {
            entries.push(DayEntry::new(weekday, opens_at, closes_at, is_closed));
        }
    }

    if errors.is_empty() {
        Ok(entries)
    } else {
        Err(errors)
    }
}

/// Checks the times for opening a single day.
pub fn validate_open_day(request: &OpenDayRequest) -> Result<(NaiveTime, NaiveTime), FieldErrors> {
    let mut errors = FieldErrors::new();
    if request.opens_at.is_none() {
        push(&mut errors, "opens_at".to_string(), "The opens at field is required.");
    }
    if request.closes_at.is_none() {
        push(&mut errors, "closes_at".to_string(), "The closes at field is required.");
    }
    let opens_at = parse_field(&mut errors, "opens_at".to_string(), request.opens_at.as_deref());
    let closes_at = parse_field(&mut errors, "closes_at".to_string(), request.closes_at.as_deref());

    match (opens_at, closes_at) {
        (Some(opens_at), Some(closes_at)) if errors.is_empty() => {
            if opens_at == closes_at {
                push(
                    &mut errors,
                    "closes_at".to_string(),
                    "Opening time cannot be the same as closing time.",
                );
                return Err(errors);
            }
            Ok((opens_at, closes_at))
        }
        _ => Err(errors),
    }
}
