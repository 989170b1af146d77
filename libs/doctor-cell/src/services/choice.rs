use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::SlotCandidate;

const ORDINALS: [(&str, &str); 5] = [
    ("first", "1st"),
    ("second", "2nd"),
    ("third", "3rd"),
    ("fourth", "4th"),
    ("fifth", "5th"),
];

// "Dr" needs a dot or whitespace after it so words like "drive" don't match
static DOCTOR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdr(?:\.\s*|\s+)([a-z][a-z ]*)").expect("doctor name pattern is valid")
});

/// Maps what the user said ("the second one", "Dr. Smith") onto one of the
/// offered candidates. Ordinals win over names; an ordinal past the end of the
/// list is a miss.
pub fn resolve_doctor_choice<'a>(candidates: &'a [SlotCandidate], choice: &str) -> Option<&'a SlotCandidate> {
    let lowered = choice.to_lowercase();

    if let Some(index) = ordinal_index(&lowered) {
        debug!("Doctor choice '{}' read as ordinal {}", choice, index + 1);
        return candidates.get(index);
    }

    let name = DOCTOR_NAME
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())?;

    debug!("Doctor choice '{}' read as name '{}'", choice, name);
    candidates
        .iter()
        .find(|candidate| candidate.doctor_name.to_lowercase().contains(&name))
}

fn ordinal_index(lowered: &str) -> Option<usize> {
    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            ORDINALS
                .iter()
                .position(|(spelled, numeric)| word == *spelled || word == *numeric)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn candidate(name: &str) -> SlotCandidate {
        SlotCandidate {
            doctor_id: Uuid::new_v4(),
            doctor_name: name.to_string(),
            clinic_address: "1 Main Street".to_string(),
            slot_id: Uuid::new_v4(),
            slot_time: Utc.with_ymd_and_hms(2030, 3, 2, 10, 0, 0).unwrap(),
        }
    }

    fn candidates() -> Vec<SlotCandidate> {
        vec![
            candidate("Dr. Alice Murphy"),
            candidate("Dr. John Smith"),
            candidate("Dr. Carla Nunez"),
        ]
    }

    #[test]
    fn test_ordinal_word_selects_by_position() {
        let list = candidates();
        let chosen = resolve_doctor_choice(&list, "second one").unwrap();
        assert_eq!(chosen.doctor_name, "Dr. John Smith");
    }

    #[test]
    fn test_numeric_ordinal() {
        let list = candidates();
        let chosen = resolve_doctor_choice(&list, "the 3rd please").unwrap();
        assert_eq!(chosen.doctor_name, "Dr. Carla Nunez");
    }

    #[test]
    fn test_ordinal_out_of_range_is_a_miss() {
        let list = candidates();
        assert!(resolve_doctor_choice(&list, "fifth").is_none());
    }

    #[test]
    fn test_unknown_ordinal_is_a_miss() {
        let list = candidates();
        assert!(resolve_doctor_choice(&list, "tenth").is_none());
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let list = candidates();
        let chosen = resolve_doctor_choice(&list, "Dr. Smith").unwrap();
        assert_eq!(chosen.doctor_name, "Dr. John Smith");

        let chosen = resolve_doctor_choice(&list, "i'd like dr nunez").unwrap();
        assert_eq!(chosen.doctor_name, "Dr. Carla Nunez");
    }

    #[test]
    fn test_name_without_title_is_a_miss() {
        let list = candidates();
        assert!(resolve_doctor_choice(&list, "Smith").is_none());
    }

    #[test]
    fn test_unknown_name_is_a_miss() {
        let list = candidates();
        assert!(resolve_doctor_choice(&list, "Dr. Who").is_none());
    }

    #[test]
    fn test_empty_candidate_list() {
        assert!(resolve_doctor_choice(&[], "first").is_none());
    }
}
