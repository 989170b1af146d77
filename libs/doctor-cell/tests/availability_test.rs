// libs/doctor-cell/tests/availability_test.rs
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use doctor_cell::models::Specialty;
use doctor_cell::services::AvailabilityService;
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

/// Matches slot queries by the operator on the lower `start_time` bound:
/// `gte.` for the weekend search, `gt.` for the 30 day fallback.
struct LowerBound(&'static str);

impl Match for LowerBound {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(key, value)| key == "start_time" && value.starts_with(self.0))
    }
}

fn service_for(server: &MockServer) -> AvailabilityService {
    let config = TestConfig::with_mock_server(&server.uri()).to_app_config();
    AvailabilityService::new(Arc::new(SupabaseClient::new(&config).unwrap()))
}

#[tokio::test]
async fn test_weekend_slot_short_circuits_fallback() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    // Wednesday; the weekend starts 2030-03-02
    let now = Utc.with_ymd_and_hms(2030, 2, 27, 12, 0, 0).unwrap();
    let saturday_slot = Utc.with_ymd_and_hms(2030, 3, 2, 10, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", "eq.gp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, "Dr. Alice Murphy", "gp", &["Aetna"])
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("booked", "eq.false"))
        .and(LowerBound("gte."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(Uuid::new_v4(), doctor_id, saturday_slot)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(LowerBound("gt."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates_at(Specialty::Gp, now).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].doctor_id, doctor_id);
    assert_eq!(candidates[0].slot_time, saturday_slot);
}

#[tokio::test]
async fn test_saturday_search_starts_at_now() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 3, 2, 15, 0, 0).unwrap();
    let sunday_slot = Utc.with_ymd_and_hms(2030, 3, 3, 9, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, "Dr. Alice Murphy", "gp", &[])
        ])))
        .mount(&server)
        .await;

    // A query from Saturday midnight would surface this morning's 09:00 slot
    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(LowerBound("gte.2030-03-02T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(
                Uuid::new_v4(),
                doctor_id,
                Utc.with_ymd_and_hms(2030, 3, 2, 9, 0, 0).unwrap(),
            )
        ])))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(LowerBound("gte.2030-03-02T15:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(Uuid::new_v4(), doctor_id, sunday_slot)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates_at(Specialty::Gp, now).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].slot_time, sunday_slot);
    assert!(candidates.iter().all(|c| c.slot_time >= now));
}

#[tokio::test]
async fn test_fallback_runs_when_weekend_is_empty() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 2, 27, 12, 0, 0).unwrap();
    let tuesday_slot = now + Duration::days(6);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, "Dr. Priya Shah", "specialist", &[])
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(LowerBound("gte."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(LowerBound("gt."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(Uuid::new_v4(), doctor_id, tuesday_slot)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates_at(Specialty::Specialist, now).await;

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].slot_time, tuesday_slot);
}

#[tokio::test]
async fn test_doctor_without_slots_is_omitted_and_order_is_kept() {
    let server = MockServer::start().await;
    let first = Uuid::new_v4();
    let busy = Uuid::new_v4();
    let last = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 2, 27, 12, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(first, "Dr. Zoe Quinn", "gp", &[]),
            MockSupabaseResponses::doctor_response(busy, "Dr. Busy Bee", "gp", &[]),
            MockSupabaseResponses::doctor_response(last, "Dr. Adam Ames", "gp", &[])
        ])))
        .mount(&server)
        .await;

    // The later doctor has the earlier slot; output still follows directory order
    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("doctor_id", format!("eq.{}", first)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(Uuid::new_v4(), first, now + Duration::days(4))
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("doctor_id", format!("eq.{}", last)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::slot_response(Uuid::new_v4(), last, now + Duration::days(3))
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("doctor_id", format!("eq.{}", busy)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates_at(Specialty::Gp, now).await;

    let ids: Vec<Uuid> = candidates.iter().map(|c| c.doctor_id).collect();
    assert_eq!(ids, vec![first, last]);
}

#[tokio::test]
async fn test_booked_slot_is_never_returned() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let now = Utc.with_ymd_and_hms(2030, 2, 27, 12, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, "Dr. Alice Murphy", "gp", &[])
        ])))
        .mount(&server)
        .await;

    let mut booked = MockSupabaseResponses::slot_response(
        Uuid::new_v4(),
        doctor_id,
        Utc.with_ymd_and_hms(2030, 3, 2, 9, 0, 0).unwrap(),
    );
    booked["booked"] = json!(true);

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booked])))
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates_at(Specialty::Gp, now).await;

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_store_failure_degrades_to_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(503).set_body_json(
            MockSupabaseResponses::error_response("service unavailable", "503"),
        ))
        .mount(&server)
        .await;

    let candidates = service_for(&server).find_candidates(Specialty::Gp).await;

    assert!(candidates.is_empty());
}
