// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use shared_database::supabase::SupabaseClient;

use crate::models::{BookSlotOutcome, BookSlotResponse, BookingError, BookingRecord, BookingRequest};

const BOOK_SLOT_FUNCTION: &str = "book_slot";

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
}

impl BookingService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Claims the slot and records the booking in a single store transaction.
    ///
    /// The `book_slot` procedure locks the slot row, so of two concurrent calls
    /// for the same slot exactly one sees `booked = false`. The loser gets
    /// `SlotAlreadyBooked` and nothing is written for it. A candidate whose
    /// doctor or time no longer matches the slot row is refused with
    /// `SlotMismatch`; the stored record always carries the slot's own details.
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingRecord, BookingError> {
        let slot_id = request.candidate.slot_id;
        info!("Booking slot {} with {} for {}", slot_id, request.candidate.doctor_name, request.patient_email);

        let args = json!({
            "p_slot_id": slot_id,
            "p_doctor_id": request.candidate.doctor_id,
            "p_slot_time": request.candidate.slot_time.to_rfc3339(),
            "p_patient_name": request.patient_name,
            "p_patient_email": request.patient_email,
            "p_symptoms": request.symptoms,
        });

        let response: BookSlotResponse = self.supabase.rpc(BOOK_SLOT_FUNCTION, args)
            .await
            .map_err(|e| {
                error!("book_slot failed for slot {}: {}", slot_id, e);
                BookingError::DatabaseError(e.to_string())
            })?;

        debug!("book_slot returned {:?} for slot {}", response.outcome, slot_id);

        match response.outcome {
            BookSlotOutcome::Booked => {
                let booking = response.booking.ok_or_else(|| {
                    BookingError::DatabaseError(format!("Slot {} booked without a booking record", slot_id))
                })?;
                info!("Booking {} created for slot {}", booking.id, slot_id);
                Ok(booking)
            }
            BookSlotOutcome::AlreadyBooked => {
                warn!("Slot {} was already booked", slot_id);
                Err(BookingError::SlotAlreadyBooked(slot_id))
            }
            BookSlotOutcome::SlotNotFound => {
                warn!("Slot {} does not exist", slot_id);
                Err(BookingError::SlotNotFound(slot_id))
            }
            BookSlotOutcome::SlotMismatch => {
                warn!("Slot {} does not belong to {} at the selected time", slot_id, request.candidate.doctor_id);
                Err(BookingError::SlotMismatch(slot_id))
            }
        }
    }
}
