use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Coarse doctor category used to filter the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Gp,
    Specialist,
}

impl Specialty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Gp => "gp",
            Specialty::Specialist => "specialist",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Specialty::Gp => "GP",
            Specialty::Specialist => "specialist",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub clinic_address: String,
    #[serde(default)]
    pub accepted_insurance: Vec<String>,
}

impl Doctor {
    /// Trimmed, case-insensitive membership test against the accepted set.
    pub fn accepts_insurance(&self, provider: &str) -> bool {
        let wanted = provider.trim().to_lowercase();
        !wanted.is_empty()
            && self
                .accepted_insurance
                .iter()
                .any(|accepted| accepted.trim().to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub booked: bool,
}

/// Snapshot of an open slot and its doctor, handed to the dialogue platform so
/// later turns can refer back to it without another lookup. `slot_time` travels
/// as epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub clinic_address: String,
    pub slot_id: Uuid,
    #[serde(with = "epoch_seconds")]
    pub slot_time: DateTime<Utc>,
}

impl SlotCandidate {
    pub fn new(doctor: &Doctor, slot: &Slot) -> Self {
        Self {
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            clinic_address: doctor.clinic_address.clone(),
            slot_id: slot.id,
            slot_time: slot.start_time,
        }
    }

    /// Human readable slot time, e.g. `Saturday, March 2 at 10:30 AM UTC`.
    pub fn formatted_time(&self) -> String {
        format_slot_time(&self.slot_time)
    }
}

pub fn format_slot_time(time: &DateTime<Utc>) -> String {
    time.format("%A, %B %-d at %-I:%M %p UTC").to_string()
}

/// Epoch-seconds codec for slot times. Writes integers; reads integers or
/// integral floats, since the dialogue platform stores every number as a double.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use serde_json::Number;

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(time.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let number = Number::deserialize(deserializer)?;
        let seconds = match number.as_i64() {
            Some(seconds) => seconds,
            None => match number.as_f64() {
                Some(value) if value.fract() == 0.0 => value as i64,
                _ => return Err(D::Error::custom(format!("slot_time is not whole seconds: {}", number))),
            },
        };

        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| D::Error::custom(format!("slot_time out of range: {}", seconds)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    Covered,
    NotAccepted,
    DoctorNotFound,
    LookupFailed,
}

impl InsuranceStatus {
    /// Session value for the two statuses that can be acted on.
    pub fn session_value(&self) -> Option<&'static str> {
        match self {
            InsuranceStatus::Covered => Some("covered"),
            InsuranceStatus::NotAccepted => Some("not_covered"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceAssessment {
    pub status: InsuranceStatus,
    pub message: String,
    pub estimated_cost: Option<f64>,
    pub copay: Option<f64>,
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn candidate() -> SlotCandidate {
        SlotCandidate {
            doctor_id: Uuid::nil(),
            doctor_name: "Dr. Ada Byrne".to_string(),
            clinic_address: "1 Main Street".to_string(),
            slot_id: Uuid::nil(),
            slot_time: Utc.with_ymd_and_hms(2030, 3, 2, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_slot_time_serializes_as_epoch_seconds() {
        let value = serde_json::to_value(candidate()).unwrap();
        assert_eq!(value["slot_time"], json!(1898677800));
    }

    #[test]
    fn test_candidate_survives_session_storage() {
        let original = candidate();
        let stored = serde_json::to_string(&original).unwrap();
        let restored: SlotCandidate = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_slot_time_accepts_float_seconds() {
        let restored: SlotCandidate = serde_json::from_value(json!({
            "doctor_id": Uuid::nil(),
            "doctor_name": "Dr. Ada Byrne",
            "clinic_address": "1 Main Street",
            "slot_id": Uuid::nil(),
            "slot_time": 1898677800.0
        }))
        .unwrap();

        assert_eq!(restored, candidate());
    }

    #[test]
    fn test_slot_time_rejects_fractional_seconds() {
        let result = serde_json::from_value::<SlotCandidate>(json!({
            "doctor_id": Uuid::nil(),
            "doctor_name": "Dr. Ada Byrne",
            "clinic_address": "1 Main Street",
            "slot_id": Uuid::nil(),
            "slot_time": 1898677800.5
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_formatted_time() {
        assert_eq!(candidate().formatted_time(), "Saturday, March 2 at 10:30 AM UTC");
    }

    #[test]
    fn test_accepts_insurance_ignores_case_and_whitespace() {
        let doctor = Doctor {
            id: Uuid::nil(),
            name: "Dr. Ada Byrne".to_string(),
            specialty: "gp".to_string(),
            clinic_address: "1 Main Street".to_string(),
            accepted_insurance: vec!["Aetna".to_string(), "Blue Cross".to_string()],
        };

        assert!(doctor.accepts_insurance("  blue cross "));
        assert!(!doctor.accepts_insurance("Cigna"));
        assert!(!doctor.accepts_insurance(""));
    }
}
