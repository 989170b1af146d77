use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::DateOfBirthError;

/// Normalises a date of birth to `YYYY-MM-DD`.
///
/// Accepts `MM/DD/YYYY`, an ISO-8601 date or timestamp, or a
/// `{year, month, day}` object whose fields are numbers or numeric strings.
pub fn normalize_date_of_birth(value: &Value) -> Result<String, DateOfBirthError> {
    let date = match value {
        Value::String(text) => parse_date_text(text.trim())?,
        Value::Object(fields) => {
            let year = date_part(fields.get("year"), "year")?;
            let month = date_part(fields.get("month"), "month")?;
            let day = date_part(fields.get("day"), "day")?;

            let year = i32::try_from(year)
                .map_err(|_| DateOfBirthError::InvalidDate(value.to_string()))?;
            let month = u32::try_from(month)
                .map_err(|_| DateOfBirthError::InvalidDate(value.to_string()))?;
            let day = u32::try_from(day)
                .map_err(|_| DateOfBirthError::InvalidDate(value.to_string()))?;

            NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| DateOfBirthError::InvalidDate(value.to_string()))?
        }
        other => return Err(DateOfBirthError::Unrecognised(other.to_string())),
    };

    Ok(date.format("%Y-%m-%d").to_string())
}

fn parse_date_text(text: &str) -> Result<NaiveDate, DateOfBirthError> {
    if text.contains('/') {
        return NaiveDate::parse_from_str(text, "%m/%d/%Y")
            .map_err(|_| DateOfBirthError::InvalidDate(text.to_string()));
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.date_naive());
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| DateOfBirthError::Unrecognised(text.to_string()))
}

fn date_part(field: Option<&Value>, name: &str) -> Result<i64, DateOfBirthError> {
    let missing = || DateOfBirthError::Unrecognised(format!("missing or invalid {}", name));

    match field {
        Some(Value::Number(number)) => match number.as_i64() {
            Some(whole) => Ok(whole),
            None => number
                .as_f64()
                .filter(|v| v.fract() == 0.0)
                .map(|v| v as i64)
                .ok_or_else(missing),
        },
        Some(Value::String(text)) => text.trim().parse::<i64>().map_err(|_| missing()),
        _ => Err(missing()),
    }
}
