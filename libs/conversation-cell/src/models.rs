use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use doctor_cell::models::SlotCandidate;
use shared_models::error::{AppError, GENERIC_APOLOGY};

/// Session parameter names shared with the dialogue platform.
pub mod params {
    pub const SYMPTOMS: &str = "symptoms";
    pub const SYMPTOMS_LIST: &str = "symptoms_list";
    pub const SYMPTOM_DURATION_DAYS: &str = "symptom_duration_days";
    pub const SYMPTOM_RESULT: &str = "symptom_result";
    pub const TRIAGE_RECOMMENDATION: &str = "triage_recommendation";
    pub const DOCTOR_CANDIDATES: &str = "doctor_candidates";
    pub const SELECTED_DOCTOR_CHOICE: &str = "selected_doctor_choice";
    pub const INSURANCE_PROVIDER: &str = "insurance_provider";
    pub const SELECTED_CANDIDATE: &str = "selected_candidate";
    pub const INSURANCE_STATUS: &str = "insurance_status";
    pub const ESTIMATED_COST: &str = "estimated_cost";
    pub const COPAY: &str = "copay";
    pub const PATIENT_FULL_NAME: &str = "patient_full_name";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    pub const BOOKING_ID: &str = "booking_id";
    pub const BOOKING_STATUS: &str = "booking_status";

    /// Everything a finished booking attempt wipes.
    pub const CONVERSATION: [&str; 15] = [
        SYMPTOMS,
        SYMPTOMS_LIST,
        SYMPTOM_DURATION_DAYS,
        SYMPTOM_RESULT,
        TRIAGE_RECOMMENDATION,
        DOCTOR_CANDIDATES,
        SELECTED_DOCTOR_CHOICE,
        INSURANCE_PROVIDER,
        SELECTED_CANDIDATE,
        INSURANCE_STATUS,
        ESTIMATED_COST,
        COPAY,
        PATIENT_FULL_NAME,
        DATE_OF_BIRTH,
        BOOKING_CONFIRMED,
    ];

    /// Fields tied to the slot picked for booking.
    pub const SELECTION: [&str; 6] = [
        BOOKING_CONFIRMED,
        SELECTED_CANDIDATE,
        SELECTED_DOCTOR_CHOICE,
        INSURANCE_STATUS,
        ESTIMATED_COST,
        COPAY,
    ];
}

// ==============================================================================
// WEBHOOK ENVELOPE
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub session_info: Option<SessionInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<SessionInfoUpdate>,
    pub fulfillment_response: FulfillmentResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfoUpdate {
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentResponse {
    pub messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMessage {
    pub text: MessageText,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageText {
    pub text: Vec<String>,
}

impl WebhookResponse {
    fn with_text(text: String, session_info: Option<SessionInfoUpdate>) -> Self {
        Self {
            session_info,
            fulfillment_response: FulfillmentResponse {
                messages: vec![ResponseMessage {
                    text: MessageText { text: vec![text] },
                }],
            },
        }
    }

    /// Fixed apology with no parameter changes.
    pub fn apology() -> Self {
        Self::with_text(GENERIC_APOLOGY.to_string(), None)
    }

    pub fn reply_text(&self) -> &str {
        self.fulfillment_response
            .messages
            .first()
            .and_then(|m| m.text.text.first())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl From<TurnReply> for WebhookResponse {
    fn from(reply: TurnReply) -> Self {
        let session_info = Some(SessionInfoUpdate { parameters: reply.updates.into_parameters() });
        Self::with_text(reply.text, session_info)
    }
}

// ==============================================================================
// TURN OUTPUT
// ==============================================================================

/// Parameter changes for the next turn. A `null` value tells the platform to
/// clear that parameter.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    parameters: Map<String, Value>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<&mut Self, AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {}: {}", key, e)))?;
        self.parameters.insert(key.to_string(), value);
        Ok(self)
    }

    pub fn clear(&mut self, key: &str) -> &mut Self {
        self.parameters.insert(key.to_string(), Value::Null);
        self
    }

    pub fn clear_all(&mut self, keys: &[&str]) -> &mut Self {
        for key in keys {
            self.clear(key);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn into_parameters(self) -> Map<String, Value> {
        self.parameters
    }
}

#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub updates: SessionUpdate,
}

impl TurnReply {
    pub fn new(text: impl Into<String>, updates: SessionUpdate) -> Self {
        Self { text: text.into(), updates }
    }
}

// ==============================================================================
// SESSION STATE
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Symptom duration is not a whole number of days: {0}")]
    InvalidDuration(String),
}

/// Typed view over the parameter bag the platform sends each turn.
#[derive(Debug, Clone, Default)]
pub struct SessionParameters {
    raw: Map<String, Value>,
}

impl From<WebhookRequest> for SessionParameters {
    fn from(request: WebhookRequest) -> Self {
        let raw = request
            .session_info
            .and_then(|info| info.parameters)
            .unwrap_or_default();
        Self { raw }
    }
}

impl SessionParameters {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// Present and not null.
    fn value(&self, key: &str) -> Option<&Value> {
        self.raw.get(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<String> {
        self.value(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// A list of strings or a single string; `symptoms_list` is read when
    /// `symptoms` is absent.
    pub fn symptoms(&self) -> Vec<String> {
        let value = self.value(params::SYMPTOMS).or_else(|| self.value(params::SYMPTOMS_LIST));

        match value {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(text)) if !text.trim().is_empty() => vec![text.trim().to_string()],
            _ => Vec::new(),
        }
    }

    /// Missing means zero. Accepts integers, whole floats and numeric strings.
    pub fn symptom_duration_days(&self) -> Result<u32, SessionError> {
        let invalid = |v: &Value| SessionError::InvalidDuration(v.to_string());

        let days = match self.value(params::SYMPTOM_DURATION_DAYS) {
            None => return Ok(0),
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(0),
            Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        let raw = self.value(params::SYMPTOM_DURATION_DAYS).cloned().unwrap_or_default();
        match days {
            Some(days) if days.is_finite() && days >= 0.0 && days <= u32::MAX as f64 => Ok(days.trunc() as u32),
            _ => Err(invalid(&raw)),
        }
    }

    /// Candidates offered on an earlier turn. Unreadable entries drop the list.
    pub fn doctor_candidates(&self) -> Vec<SlotCandidate> {
        let Some(value) = self.value(params::DOCTOR_CANDIDATES) else {
            return Vec::new();
        };

        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Ignoring unreadable doctor_candidates: {}", e);
            Vec::new()
        })
    }

    pub fn selected_candidate(&self) -> Option<SlotCandidate> {
        let value = self.value(params::SELECTED_CANDIDATE)?;

        serde_json::from_value(value.clone())
            .map_err(|e| warn!("Ignoring unreadable selected_candidate: {}", e))
            .ok()
    }

    pub fn selected_doctor_choice(&self) -> Option<String> {
        self.text(params::SELECTED_DOCTOR_CHOICE)
    }

    pub fn insurance_provider(&self) -> Option<String> {
        self.text(params::INSURANCE_PROVIDER)
    }

    /// Plain text, or a person entity object carrying `name` or `original`.
    pub fn patient_full_name(&self) -> Option<String> {
        match self.value(params::PATIENT_FULL_NAME)? {
            Value::String(text) => Some(text.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Object(fields) => ["name", "original"]
                .iter()
                .filter_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        }
    }

    pub fn date_of_birth(&self) -> Option<&Value> {
        self.value(params::DATE_OF_BIRTH)
            .filter(|v| v.as_str().map_or(true, |s| !s.trim().is_empty()))
    }

    pub fn booking_confirmed(&self) -> bool {
        match self.value(params::BOOKING_CONFIRMED) {
            Some(Value::Bool(confirmed)) => *confirmed,
            Some(Value::String(text)) => {
                matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "y")
            }
            _ => false,
        }
    }
}

// ==============================================================================
// TURN KIND
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingInputs {
    pub candidate: Option<SlotCandidate>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<Value>,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InsuranceInputs {
    pub choice: String,
    pub provider: String,
    pub candidates: Vec<SlotCandidate>,
}

#[derive(Debug, Clone)]
pub struct TriageInputs {
    pub symptoms: Vec<String>,
    pub duration_days: Result<u32, SessionError>,
}

/// What this turn is about, decided once from which parameters are present.
#[derive(Debug, Clone)]
pub enum TurnKind {
    BookingConfirmation(BookingInputs),
    InsuranceCheck(InsuranceInputs),
    Triage(TriageInputs),
}

impl TurnKind {
    /// Priority: booking confirmation, then insurance check, then triage.
    pub fn classify(params: &SessionParameters) -> Self {
        if params.booking_confirmed() {
            return TurnKind::BookingConfirmation(BookingInputs {
                candidate: params.selected_candidate(),
                full_name: params.patient_full_name(),
                date_of_birth: params.date_of_birth().cloned(),
                symptoms: params.symptoms(),
            });
        }

        if let (Some(choice), Some(provider)) = (params.selected_doctor_choice(), params.insurance_provider()) {
            let candidates = params.doctor_candidates();
            if !candidates.is_empty() {
                return TurnKind::InsuranceCheck(InsuranceInputs { choice, provider, candidates });
            }
        }

        TurnKind::Triage(TriageInputs {
            symptoms: params.symptoms(),
            duration_days: params.symptom_duration_days(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TurnKind::BookingConfirmation(_) => "booking_confirmation",
            TurnKind::InsuranceCheck(_) => "insurance_check",
            TurnKind::Triage(_) => "triage",
        }
    }
}
