use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError};

pub struct PatientService {
    supabase: Arc<SupabaseClient>,
}

impl PatientService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Exact, case-sensitive match on all three fields. `date_of_birth` must
    /// already be normalised to `YYYY-MM-DD`.
    pub async fn find_patient(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: &str,
    ) -> Result<Option<Patient>, PatientError> {
        debug!("Looking up patient {} {} born {}", first_name, last_name, date_of_birth);

        let path = format!(
            "/rest/v1/patients?first_name=eq.{}&last_name=eq.{}&date_of_birth=eq.{}&limit=1",
            urlencoding::encode(first_name),
            urlencoding::encode(last_name),
            urlencoding::encode(date_of_birth),
        );

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let Some(patient_data) = result.into_iter().next() else {
            warn!("No patient matches {} {} born {}", first_name, last_name, date_of_birth);
            return Ok(None);
        };

        let patient: Patient = serde_json::from_value(patient_data)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;

        Ok(Some(patient))
    }

    /// Contact address of the first matching patient.
    pub async fn find_contact_email(
        &self,
        first_name: &str,
        last_name: &str,
        date_of_birth: &str,
    ) -> Result<Option<String>, PatientError> {
        Ok(self
            .find_patient(first_name, last_name, date_of_birth)
            .await?
            .map(|patient| patient.email))
    }
}
