use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// First word is the first name, the rest is the last name. `None` when there
/// is no last name to match on.
pub fn split_full_name(full_name: &str) -> Option<(String, String)> {
    let mut parts = full_name.split_whitespace();
    let first_name = parts.next()?.to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    if last_name.is_empty() {
        return None;
    }

    Some((first_name, last_name))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateOfBirthError {
    #[error("Unrecognised date of birth: {0}")]
    Unrecognised(String),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("  Mary Ann  van der Berg "),
            Some(("Mary".to_string(), "Ann van der Berg".to_string()))
        );
        assert_eq!(split_full_name("Jane Doe"), Some(("Jane".to_string(), "Doe".to_string())));
    }

    #[test]
    fn test_split_full_name_needs_two_parts() {
        assert_eq!(split_full_name("Cher"), None);
        assert_eq!(split_full_name("   "), None);
    }

    #[test]
    fn test_full_name() {
        let patient = Patient {
            id: Uuid::nil(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 15).unwrap(),
            email: "jane@example.com".to_string(),
        };
        assert_eq!(patient.full_name(), "Jane Doe");
    }
}
