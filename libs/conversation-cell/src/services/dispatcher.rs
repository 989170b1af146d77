use std::sync::Arc;

use tracing::{debug, error, info, warn};

use appointment_cell::models::{BookingError, BookingRecord, BookingRequest};
use appointment_cell::services::BookingService;
use doctor_cell::models::{InsuranceStatus, SlotCandidate, Specialty};
use doctor_cell::services::{resolve_doctor_choice, AvailabilityService, InsuranceService};
use notification_cell::models::BookingConfirmation;
use notification_cell::services::MailClient;
use patient_cell::models::split_full_name;
use patient_cell::services::{normalize_date_of_birth, PatientService};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;
use triage_cell::models::TriageOutcome;
use triage_cell::services::TriageClassifier;

use crate::models::{
    params, BookingInputs, InsuranceInputs, SessionParameters, SessionUpdate, TriageInputs,
    TurnKind, TurnReply,
};
use crate::services::replies;

/// Routes one webhook turn to the triage, insurance or booking flow. Holds no
/// conversation state of its own; everything comes in with the parameters.
pub struct TurnDispatcher {
    classifier: TriageClassifier,
    availability: AvailabilityService,
    insurance: InsuranceService,
    patients: PatientService,
    bookings: BookingService,
    mailer: Arc<MailClient>,
}

impl TurnDispatcher {
    pub fn new(config: &AppConfig, supabase: Arc<SupabaseClient>, mailer: Arc<MailClient>) -> Self {
        Self {
            classifier: TriageClassifier::new(config),
            availability: AvailabilityService::new(Arc::clone(&supabase)),
            insurance: InsuranceService::new(Arc::clone(&supabase), config),
            patients: PatientService::new(Arc::clone(&supabase)),
            bookings: BookingService::new(supabase),
            mailer,
        }
    }

    pub async fn handle_turn(&self, params: SessionParameters) -> Result<TurnReply, AppError> {
        let kind = TurnKind::classify(&params);
        info!("Handling {} turn", kind.name());

        match kind {
            TurnKind::BookingConfirmation(inputs) => self.handle_booking(inputs).await,
            TurnKind::InsuranceCheck(inputs) => self.handle_insurance_check(inputs).await,
            TurnKind::Triage(inputs) => self.handle_triage(inputs).await,
        }
    }

    async fn handle_triage(&self, inputs: TriageInputs) -> Result<TurnReply, AppError> {
        let duration_days = match inputs.duration_days {
            Ok(days) => days,
            Err(e) => {
                warn!("{}", e);
                let mut updates = SessionUpdate::new();
                updates.clear(params::SYMPTOM_DURATION_DAYS);
                return Ok(TurnReply::new(replies::ASK_DURATION, updates));
            }
        };

        let outcome = self.classifier.classify(&inputs.symptoms, duration_days);
        info!("Triage outcome {} for {} symptom(s) over {} day(s)", outcome, inputs.symptoms.len(), duration_days);

        let mut updates = SessionUpdate::new();
        updates
            .set(params::SYMPTOM_RESULT, outcome.as_str())?
            .set(params::TRIAGE_RECOMMENDATION, outcome.recommendation())?;

        let specialty = match outcome {
            TriageOutcome::Gp => Specialty::Gp,
            TriageOutcome::Specialist => Specialty::Specialist,
            TriageOutcome::Emergency | TriageOutcome::SelfCare => {
                updates.set(params::DOCTOR_CANDIDATES, Vec::<SlotCandidate>::new())?;
                return Ok(TurnReply::new(outcome.recommendation(), updates));
            }
        };

        let candidates = self.availability.find_candidates(specialty).await;
        debug!("{} {} candidate(s) found", candidates.len(), specialty);

        let text = replies::candidate_list(outcome.recommendation(), specialty, &candidates);
        updates.set(params::DOCTOR_CANDIDATES, &candidates)?;

        Ok(TurnReply::new(text, updates))
    }

    async fn handle_insurance_check(&self, inputs: InsuranceInputs) -> Result<TurnReply, AppError> {
        let Some(candidate) = resolve_doctor_choice(&inputs.candidates, &inputs.choice) else {
            info!("Could not resolve doctor choice '{}'", inputs.choice);
            let mut updates = SessionUpdate::new();
            updates.clear(params::SELECTED_DOCTOR_CHOICE);
            return Ok(TurnReply::new(replies::CHOICE_NOT_UNDERSTOOD, updates));
        };

        let assessment = self
            .insurance
            .evaluate(candidate.doctor_id, &candidate.doctor_name, &inputs.provider)
            .await;

        let mut updates = SessionUpdate::new();
        let text = match assessment.status {
            InsuranceStatus::DoctorNotFound => {
                updates.clear(params::SELECTED_DOCTOR_CHOICE);
                replies::insurance_unresolved(&assessment)
            }
            InsuranceStatus::LookupFailed => replies::insurance_unresolved(&assessment),
            InsuranceStatus::Covered | InsuranceStatus::NotAccepted => {
                updates
                    .set(params::SELECTED_CANDIDATE, candidate)?
                    .set(params::INSURANCE_STATUS, assessment.status.session_value())?
                    .set(params::ESTIMATED_COST, assessment.estimated_cost)?
                    .set(params::COPAY, assessment.copay)?;
                replies::insurance_verdict(&assessment, candidate)
            }
        };

        Ok(TurnReply::new(text, updates))
    }

    async fn handle_booking(&self, inputs: BookingInputs) -> Result<TurnReply, AppError> {
        let Some(candidate) = inputs.candidate else {
            let mut updates = SessionUpdate::new();
            updates.clear_all(&params::SELECTION);
            return Ok(TurnReply::new(replies::NO_SELECTION, updates));
        };

        let Some((full_name, (first_name, last_name))) = inputs
            .full_name
            .and_then(|name| split_full_name(&name).map(|parts| (name, parts)))
        else {
            let mut updates = SessionUpdate::new();
            updates
                .clear(params::BOOKING_CONFIRMED)
                .clear(params::PATIENT_FULL_NAME);
            return Ok(TurnReply::new(replies::ASK_FULL_NAME, updates));
        };

        let Some(raw_date_of_birth) = inputs.date_of_birth else {
            let mut updates = SessionUpdate::new();
            updates.clear(params::BOOKING_CONFIRMED);
            return Ok(TurnReply::new(replies::ASK_DATE_OF_BIRTH, updates));
        };

        let date_of_birth = match normalize_date_of_birth(&raw_date_of_birth) {
            Ok(date) => date,
            Err(e) => {
                info!("Rejected date of birth: {}", e);
                let mut updates = SessionUpdate::new();
                updates
                    .clear(params::DATE_OF_BIRTH)
                    .clear(params::BOOKING_CONFIRMED);
                return Ok(TurnReply::new(replies::DATE_OF_BIRTH_UNREADABLE, updates));
            }
        };

        let patient = match self.patients.find_patient(&first_name, &last_name, &date_of_birth).await {
            Ok(Some(patient)) => patient,
            Ok(None) => {
                let mut updates = SessionUpdate::new();
                updates
                    .clear(params::PATIENT_FULL_NAME)
                    .clear(params::DATE_OF_BIRTH)
                    .clear(params::BOOKING_CONFIRMED);
                return Ok(TurnReply::new(
                    replies::patient_not_found(&full_name, &date_of_birth),
                    updates,
                ));
            }
            Err(e) => {
                error!("Patient lookup failed: {}", e);
                let mut updates = SessionUpdate::new();
                updates.clear(params::BOOKING_CONFIRMED);
                return Ok(TurnReply::new(replies::RECORDS_UNAVAILABLE, updates));
            }
        };

        let request = BookingRequest {
            candidate: candidate.clone(),
            patient_name: patient.full_name(),
            patient_email: patient.email.clone(),
            symptoms: inputs.symptoms,
        };

        let result = self.bookings.book(&request).await;
        self.finish_booking(&candidate, &patient.email, result).await
    }

    /// Every finished attempt wipes the conversation; only the booking result
    /// survives into the next turn.
    async fn finish_booking(
        &self,
        candidate: &SlotCandidate,
        email: &str,
        result: Result<BookingRecord, BookingError>,
    ) -> Result<TurnReply, AppError> {
        let mut updates = SessionUpdate::new();
        updates.clear_all(&params::CONVERSATION);

        let text = match result {
            Ok(booking) => {
                let confirmation = BookingConfirmation {
                    to: email.to_string(),
                    doctor_name: booking.doctor_name.clone(),
                    slot_time: booking.slot_time,
                    clinic_address: booking.clinic_address.clone(),
                };
                let sent = self.mailer.send_booking_confirmation(&confirmation).await;

                updates
                    .set(params::BOOKING_ID, booking.id)?
                    .set(params::BOOKING_STATUS, "booked")?;
                replies::booked(&booking, sent)
            }
            Err(e) => {
                warn!("Booking attempt failed: {}", e);
                updates.set(params::BOOKING_STATUS, "failed")?;
                match e {
                    BookingError::SlotAlreadyBooked(_) => replies::slot_taken(candidate),
                    BookingError::SlotNotFound(_) => replies::slot_gone(candidate),
                    BookingError::SlotMismatch(_) => replies::slot_changed(candidate),
                    BookingError::DatabaseError(_) => replies::BOOKING_UNAVAILABLE.to_string(),
                }
            }
        };

        Ok(TurnReply::new(text, updates))
    }
}

