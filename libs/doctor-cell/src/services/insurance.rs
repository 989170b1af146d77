use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, InsuranceAssessment, InsuranceStatus};

pub struct InsuranceService {
    supabase: Arc<SupabaseClient>,
    visit_cost: f64,
    copay: f64,
}

impl InsuranceService {
    pub fn new(supabase: Arc<SupabaseClient>, config: &AppConfig) -> Self {
        Self {
            supabase,
            visit_cost: config.visit_cost_estimate,
            copay: config.insured_copay,
        }
    }

    /// Checks whether the doctor takes the patient's insurance and attaches the
    /// flat cost figures. The copay is only present when covered.
    pub async fn evaluate(&self, doctor_id: Uuid, doctor_name: &str, provider: &str) -> InsuranceAssessment {
        debug!("Evaluating insurance '{}' for doctor {}", provider, doctor_id);

        let doctor = match self.get_doctor(doctor_id).await {
            Ok(doctor) => doctor,
            Err(DoctorError::NotFound) => {
                warn!("Insurance check for unknown doctor {}", doctor_id);
                return InsuranceAssessment {
                    status: InsuranceStatus::DoctorNotFound,
                    message: format!("I couldn't find {} in our directory.", doctor_name),
                    estimated_cost: None,
                    copay: None,
                };
            }
            Err(e) => {
                error!("Insurance lookup failed for doctor {}: {}", doctor_id, e);
                return InsuranceAssessment {
                    status: InsuranceStatus::LookupFailed,
                    message: "I couldn't check insurance coverage right now.".to_string(),
                    estimated_cost: None,
                    copay: None,
                };
            }
        };

        let provider = provider.trim();
        if doctor.accepts_insurance(provider) {
            InsuranceAssessment {
                status: InsuranceStatus::Covered,
                message: format!("Good news: {} accepts {}.", doctor.name, provider),
                estimated_cost: Some(self.visit_cost),
                copay: Some(self.copay),
            }
        } else {
            InsuranceAssessment {
                status: InsuranceStatus::NotAccepted,
                message: format!("{} does not accept {}.", doctor.name, provider),
                estimated_cost: Some(self.visit_cost),
                copay: None,
            }
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&limit=1", doctor_id);

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctor_data = result.into_iter().next().ok_or(DoctorError::NotFound)?;

        serde_json::from_value(doctor_data)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }
}
