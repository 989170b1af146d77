use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use futures::future::join_all;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, Slot, SlotCandidate, Specialty};

/// How far ahead the fallback search looks when the weekend has nothing open.
pub const FALLBACK_WINDOW_DAYS: i64 = 30;

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// One candidate per doctor of the given specialty, in directory order.
    /// Doctors with nothing open are left out; store failures degrade to an
    /// empty or shorter list.
    pub async fn find_candidates(&self, specialty: Specialty) -> Vec<SlotCandidate> {
        self.find_candidates_at(specialty, Utc::now()).await
    }

    pub async fn find_candidates_at(
        &self,
        specialty: Specialty,
        now: DateTime<Utc>,
    ) -> Vec<SlotCandidate> {
        let doctors = match self.list_doctors(specialty).await {
            Ok(doctors) => doctors,
            Err(e) => {
                error!("Failed to list {} doctors: {}", specialty, e);
                return Vec::new();
            }
        };

        debug!("Searching availability for {} {} doctors", doctors.len(), specialty);

        // join_all keeps input order, so candidates follow directory order
        let lookups = doctors.iter().map(|doctor| self.next_open_slot(doctor.id, now));
        let results = join_all(lookups).await;

        let candidates: Vec<SlotCandidate> = doctors
            .iter()
            .zip(results)
            .filter_map(|(doctor, result)| match result {
                Ok(Some(slot)) => Some(SlotCandidate::new(doctor, &slot)),
                Ok(None) => {
                    debug!("No open slot for doctor {}", doctor.id);
                    None
                }
                Err(e) => {
                    warn!("Skipping doctor {} after slot lookup failure: {}", doctor.id, e);
                    None
                }
            })
            .collect();

        info!("Found {} {} candidates", candidates.len(), specialty);
        candidates
    }

    pub async fn list_doctors(&self, specialty: Specialty) -> Result<Vec<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?specialty=eq.{}", specialty.as_str());

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    /// Earliest unbooked slot in the coming weekend, else within the fallback
    /// window. The fallback query only runs when the weekend has nothing.
    /// During a weekend the search starts at `now`, never earlier that day.
    pub async fn next_open_slot(
        &self,
        doctor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Slot>, DoctorError> {
        let (weekend_start, weekend_end) = weekend_window(now);
        let weekend = self.earliest_open_slot(
            doctor_id,
            &format!("gte.{}", store_timestamp(&weekend_start.max(now))),
            &format!("lt.{}", store_timestamp(&weekend_end)),
        ).await?;

        if weekend.is_some() {
            return Ok(weekend);
        }

        let (from, until) = fallback_window(now);
        self.earliest_open_slot(
            doctor_id,
            &format!("gt.{}", store_timestamp(&from)),
            &format!("lt.{}", store_timestamp(&until)),
        ).await
    }

    async fn earliest_open_slot(
        &self,
        doctor_id: Uuid,
        lower_filter: &str,
        upper_filter: &str,
    ) -> Result<Option<Slot>, DoctorError> {
        let path = format!(
            "/rest/v1/slots?doctor_id=eq.{}&booked=eq.false&start_time={}&start_time={}&order=start_time.asc&limit=1",
            doctor_id,
            urlencoding::encode(lower_filter),
            urlencoding::encode(upper_filter),
        );

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let slots = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Slot>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse slot: {}", e)))?;

        Ok(slots.into_iter().filter(|slot| !slot.booked).min_by_key(|slot| slot.start_time))
    }
}

/// The coming Saturday 00:00 UTC (today when today is Saturday) up to, but not
/// including, the Monday after it.
pub fn weekend_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    // Saturday is day 5 counting from Monday
    let days_until_saturday = (5 - now.weekday().num_days_from_monday() as i64).rem_euclid(7);
    let saturday = now.date_naive() + Duration::days(days_until_saturday);
    let start = saturday.and_time(chrono::NaiveTime::MIN).and_utc();

    (start, start + Duration::days(2))
}

/// Strictly after `now` and strictly before `now + FALLBACK_WINDOW_DAYS`.
pub fn fallback_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(FALLBACK_WINDOW_DAYS))
}

fn store_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
