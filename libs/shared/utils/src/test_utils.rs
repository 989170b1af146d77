use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, default_emergency_keywords};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            mail_api_url: String::new(),
            mail_api_key: String::new(),
        }
    }
}

impl TestConfig {
    /// Store and mail both served by the same mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            mail_api_url: format!("{}/mail", uri),
            mail_api_key: "test-mail-key".to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            store_timeout_secs: 2,
            mail_api_url: self.mail_api_url.clone(),
            mail_api_key: self.mail_api_key.clone(),
            mail_from: "appointments@clinic.test".to_string(),
            mail_timeout_secs: 2,
            emergency_keywords: default_emergency_keywords(),
            visit_cost_estimate: 150.0,
            insured_copay: 25.0,
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(id: Uuid, name: &str, specialty: &str, insurance: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "clinic_address": format!("{} Clinic, 12 Harbour Road", name),
            "accepted_insurance": insurance
        })
    }

    pub fn slot_response(id: Uuid, doctor_id: Uuid, start_time: DateTime<Utc>) -> Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "start_time": start_time.to_rfc3339(),
            "booked": false
        })
    }

    pub fn patient_response(first_name: &str, last_name: &str, date_of_birth: &str, email: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "first_name": first_name,
            "last_name": last_name,
            "date_of_birth": date_of_birth,
            "email": email
        })
    }

    pub fn booking_response(slot_id: Uuid, doctor_id: Uuid, slot_time: DateTime<Utc>, patient_email: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "slot_id": slot_id,
            "doctor_id": doctor_id,
            "doctor_name": "Dr. John Smith",
            "clinic_address": "Dr. John Smith Clinic, 12 Harbour Road",
            "slot_time": slot_time.to_rfc3339(),
            "patient_name": "Jane Doe",
            "patient_email": patient_email,
            "symptoms": ["fever"],
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn book_slot_response(outcome: &str, booking: Option<Value>) -> Value {
        json!({
            "outcome": outcome,
            "booking": booking
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
