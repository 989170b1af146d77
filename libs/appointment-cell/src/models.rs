use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use thiserror::Error;

use doctor_cell::models::SlotCandidate;

/// Everything needed to claim one slot for one patient.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub candidate: SlotCandidate,
    pub patient_name: String,
    pub patient_email: String,
    pub symptoms: Vec<String>,
}

/// Append-only row written in the same transaction that marks the slot booked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub clinic_address: String,
    pub slot_time: DateTime<Utc>,
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSlotOutcome {
    Booked,
    AlreadyBooked,
    SlotNotFound,
    SlotMismatch,
}

/// Result of the `book_slot` stored procedure.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSlotResponse {
    pub outcome: BookSlotOutcome,
    pub booking: Option<BookingRecord>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Slot {0} is already booked")]
    SlotAlreadyBooked(Uuid),

    #[error("Slot {0} not found")]
    SlotNotFound(Uuid),

    #[error("Slot {0} no longer matches the selected doctor or time")]
    SlotMismatch(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
