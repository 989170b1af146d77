use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageOutcome {
    Emergency,
    Specialist,
    Gp,
    SelfCare,
}

impl TriageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageOutcome::Emergency => "emergency",
            TriageOutcome::Specialist => "specialist",
            TriageOutcome::Gp => "gp",
            TriageOutcome::SelfCare => "self_care",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            TriageOutcome::Emergency => {
                "Your symptoms may indicate a medical emergency. Please call emergency services or go to the nearest emergency department right away."
            }
            TriageOutcome::Specialist => {
                "Because your symptoms have lasted two weeks or longer, we recommend seeing a specialist."
            }
            TriageOutcome::Gp => {
                "We recommend booking an appointment with a general practitioner (GP)."
            }
            TriageOutcome::SelfCare => {
                "Your symptoms sound mild. Rest, drink plenty of fluids and keep an eye on how you feel. If they last more than three days, consider seeing a GP."
            }
        }
    }
}

impl std::fmt::Display for TriageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
