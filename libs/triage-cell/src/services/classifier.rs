use tracing::debug;

use shared_config::AppConfig;

use crate::models::TriageOutcome;

pub const SPECIALIST_MIN_DAYS: u32 = 14;
pub const GP_MIN_DAYS: u32 = 3;

pub struct TriageClassifier {
    emergency_keywords: Vec<String>,
}

impl TriageClassifier {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_keywords(config.emergency_keywords.clone())
    }

    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self {
            emergency_keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Emergency keywords take priority; duration is only consulted when none
    /// of them appear in the joined symptom text.
    pub fn classify(&self, symptoms: &[String], duration_days: u32) -> TriageOutcome {
        let symptom_text = symptoms.join(" ").to_lowercase();

        let outcome = if self.emergency_keywords.iter().any(|k| symptom_text.contains(k.as_str())) {
            TriageOutcome::Emergency
        } else if duration_days >= SPECIALIST_MIN_DAYS {
            TriageOutcome::Specialist
        } else if duration_days >= GP_MIN_DAYS {
            TriageOutcome::Gp
        } else {
            TriageOutcome::SelfCare
        };

        debug!("Classified '{}' over {} days as {}", symptom_text, duration_days, outcome);
        outcome
    }
}
