use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details of a confirmed appointment to tell the patient about.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub to: String,
    pub doctor_name: String,
    pub slot_time: DateTime<Utc>,
    pub clinic_address: String,
}

/// Payload accepted by the transactional mail API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl MailMessage {
    pub fn booking_confirmation(from: &str, confirmation: &BookingConfirmation) -> Self {
        let when = confirmation.slot_time.format("%A, %B %-d, %Y at %-I:%M %p UTC");

        Self {
            from: from.to_string(),
            to: confirmation.to.clone(),
            subject: format!("Appointment confirmed with {}", confirmation.doctor_name),
            text: format!(
                "Your appointment with {} is confirmed for {}.\n\nLocation: {}\n\nIf you need to change or cancel, please contact the clinic.",
                confirmation.doctor_name, when, confirmation.clinic_address
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Mail transport is not configured")]
    NotConfigured,

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail API rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
}
