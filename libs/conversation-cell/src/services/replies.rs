use appointment_cell::models::BookingRecord;
use doctor_cell::models::{format_slot_time, InsuranceAssessment, InsuranceStatus, SlotCandidate, Specialty};

pub const ASK_DURATION: &str =
    "How many days have you had these symptoms? Please answer with a whole number of days.";

pub const CHOICE_NOT_UNDERSTOOD: &str = "I couldn't tell which doctor you meant. Please say the number from the list, for example \"the first one\", or the doctor's name, like \"Dr. Smith\".";

pub const NO_SELECTION: &str =
    "I don't have an appointment selected yet. Please choose a doctor from the list first.";

pub const ASK_FULL_NAME: &str =
    "To book the appointment I need your full name, first and last, as it appears on your records.";

pub const ASK_DATE_OF_BIRTH: &str = "Please tell me your date of birth in MM/DD/YYYY format.";

pub const DATE_OF_BIRTH_UNREADABLE: &str =
    "I couldn't read that date of birth. Please provide it in MM/DD/YYYY format, for example 03/15/1990.";

pub const RECORDS_UNAVAILABLE: &str =
    "I couldn't reach our patient records just now. Please try confirming again in a moment.";

pub const BOOKING_UNAVAILABLE: &str =
    "Sorry, I couldn't complete your booking right now. Please try again later or call the clinic.";

pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn candidate_line(index: usize, candidate: &SlotCandidate) -> String {
    format!(
        "{}. {} on {} at {}",
        index + 1,
        candidate.doctor_name,
        candidate.formatted_time(),
        candidate.clinic_address
    )
}

/// Recommendation followed by the numbered candidate list, or by a
/// no-availability notice when the list is empty.
pub fn candidate_list(recommendation: &str, specialty: Specialty, candidates: &[SlotCandidate]) -> String {
    if candidates.is_empty() {
        return format!(
            "{}\n\nUnfortunately there are no {} appointments available in the next 30 days. Please try again later or call the clinic.",
            recommendation,
            specialty.display_name()
        );
    }

    let lines = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| candidate_line(index, candidate))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nHere are the earliest available {} appointments:\n{}\n\nWhich doctor would you like to see? You can say \"the first one\" or the doctor's name. Please also tell me your insurance provider.",
        recommendation,
        specialty.display_name(),
        lines
    )
}

/// Insurance check that produced no verdict, with the follow-up the user
/// should take.
pub fn insurance_unresolved(assessment: &InsuranceAssessment) -> String {
    let follow_up = match assessment.status {
        InsuranceStatus::DoctorNotFound => "Please choose another doctor from the list.",
        _ => "Please try again in a moment.",
    };

    format!("{} {}", assessment.message, follow_up)
}

/// Coverage verdict, costs and the booking prompt for the chosen slot.
pub fn insurance_verdict(assessment: &InsuranceAssessment, candidate: &SlotCandidate) -> String {
    let costs = match (assessment.status, assessment.estimated_cost, assessment.copay) {
        (InsuranceStatus::Covered, Some(cost), Some(copay)) => format!(
            "The estimated visit cost is {} and your copay would be {}.",
            money(cost),
            money(copay)
        ),
        (_, Some(cost), _) => format!(
            "The estimated visit cost is {} without insurance coverage.",
            money(cost)
        ),
        _ => String::new(),
    };

    let prompt = match assessment.status {
        InsuranceStatus::Covered => "Would you like me to book it?",
        _ => "Would you still like me to book it?",
    };

    format!(
        "{} {}\n\nThe appointment would be with {} on {} at {}. {}",
        assessment.message,
        costs,
        candidate.doctor_name,
        candidate.formatted_time(),
        candidate.clinic_address,
        prompt
    )
}

pub fn patient_not_found(full_name: &str, date_of_birth: &str) -> String {
    format!(
        "I couldn't find a patient record for {} born {}. Please check your name and date of birth and try again.",
        full_name, date_of_birth
    )
}

/// Confirmation text built from the stored booking, not the session snapshot.
pub fn booked(booking: &BookingRecord, confirmation_sent: bool) -> String {
    let summary = format!(
        "Your appointment with {} on {} at {} is booked.",
        booking.doctor_name,
        format_slot_time(&booking.slot_time),
        booking.clinic_address
    );

    if confirmation_sent {
        format!("{} A confirmation has been sent to {}.", summary, booking.patient_email)
    } else {
        format!(
            "{} We couldn't send the confirmation email, so please keep a note of these details.",
            summary
        )
    }
}

pub fn slot_taken(candidate: &SlotCandidate) -> String {
    format!(
        "Sorry, the appointment with {} on {} is no longer available. Tell me your symptoms again and I'll find you another time.",
        candidate.doctor_name,
        candidate.formatted_time()
    )
}

pub fn slot_gone(candidate: &SlotCandidate) -> String {
    format!(
        "Sorry, the appointment with {} could not be found any more. Tell me your symptoms again and I'll find you another time.",
        candidate.doctor_name
    )
}

pub fn slot_changed(candidate: &SlotCandidate) -> String {
    format!(
        "Sorry, the appointment with {} on {} has changed since it was offered. Tell me your symptoms again and I'll find you a current time.",
        candidate.doctor_name,
        candidate.formatted_time()
    )
}
