//! WASM bindings for session-guard.
//!
//! Exposes conflict evaluation, day busy slots, month occupancy, free-slot
//! suggestions, and candidate validation to the web portals via `wasm-bindgen`.
//! All complex types cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p session-guard-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/session-guard-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/session_guard_wasm.wasm
//! ```

use serde::Serialize;
use session_guard::interval::format_clock;
use session_guard::{
    BusySlot, CalendarMonth, CandidateSession, ConflictResult, ExistingSession, FreeSlot,
    GuardConfig,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ConflictSessionDto<'a> {
    id: &'a str,
    title: &'a str,
    date: String,
    start_time: String,
    end_time: String,
    professional_id: &'a str,
    local_id: Option<&'a str>,
}

impl<'a> From<&'a ExistingSession> for ConflictSessionDto<'a> {
    fn from(s: &'a ExistingSession) -> Self {
        Self {
            id: &s.id,
            title: &s.title,
            date: s.date.to_string(),
            start_time: format_clock(s.start_time),
            end_time: format_clock(s.end_time),
            professional_id: &s.professional_id,
            local_id: s.local_id.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ConflictResultDto<'a> {
    has_conflict: bool,
    professional_conflicts: Vec<ConflictSessionDto<'a>>,
    local_conflicts: Vec<ConflictSessionDto<'a>>,
    messages: Vec<String>,
}

impl<'a> From<&'a ConflictResult> for ConflictResultDto<'a> {
    fn from(r: &'a ConflictResult) -> Self {
        Self {
            has_conflict: r.has_conflict(),
            professional_conflicts: r.professional_conflicts.iter().map(Into::into).collect(),
            local_conflicts: r.local_conflicts.iter().map(Into::into).collect(),
            messages: r.describe(),
        }
    }
}

#[derive(Serialize)]
struct BusySlotDto<'a> {
    start: String,
    end: String,
    source: session_guard::SlotSource,
    title: &'a str,
    session_id: &'a str,
}

impl<'a> From<&'a BusySlot> for BusySlotDto<'a> {
    fn from(s: &'a BusySlot) -> Self {
        Self {
            start: format_clock(s.interval.start()),
            end: format_clock(s.interval.end()),
            source: s.source,
            title: &s.title,
            session_id: &s.session_id,
        }
    }
}

#[derive(Serialize)]
struct FreeSlotDto {
    start: String,
    end: String,
    duration_minutes: i64,
}

impl From<&FreeSlot> for FreeSlotDto {
    fn from(s: &FreeSlot) -> Self {
        Self {
            start: format_clock(s.interval.start()),
            end: format_clock(s.interval.end()),
            duration_minutes: s.duration_minutes,
        }
    }
}

#[derive(Serialize)]
struct ValidationDto {
    valid: bool,
    error: Option<String>,
    duration_minutes: Option<i64>,
}

// ---------------------------------------------------------------------------
// Helpers: JSON in, JSON out, errors as plain strings
// ---------------------------------------------------------------------------

type BindingResult<T> = std::result::Result<T, String>;

fn parse_sessions(json: &str) -> BindingResult<Vec<ExistingSession>> {
    serde_json::from_str(json).map_err(|e| format!("Invalid sessions JSON: {}", e))
}

fn parse_candidate(json: &str) -> BindingResult<CandidateSession> {
    serde_json::from_str(json).map_err(|e| format!("Invalid candidate JSON: {}", e))
}

fn parse_config(json: Option<&str>) -> BindingResult<GuardConfig> {
    match json {
        Some(raw) if !raw.trim().is_empty() => {
            GuardConfig::from_json_str(raw).map_err(|e| e.to_string())
        }
        _ => Ok(GuardConfig::default()),
    }
}

fn to_json<T: Serialize>(value: &T) -> BindingResult<String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn evaluate_json(candidate_json: &str, sessions_json: &str) -> BindingResult<String> {
    let candidate = parse_candidate(candidate_json)?;
    let sessions = parse_sessions(sessions_json)?;
    let result = session_guard::evaluate(&candidate, &sessions);
    to_json(&ConflictResultDto::from(&result))
}

fn busy_slots_json(
    date: &str,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    sessions_json: &str,
    exclude_id: Option<&str>,
) -> BindingResult<String> {
    let date = session_guard::session::parse_date(date).map_err(|e| e.to_string())?;
    let sessions = parse_sessions(sessions_json)?;
    let slots = session_guard::busy_slots_for_day(
        date,
        non_empty(professional_id),
        non_empty(local_id),
        &sessions,
        non_empty(exclude_id),
    );
    let dtos: Vec<BusySlotDto> = slots.iter().map(BusySlotDto::from).collect();
    to_json(&dtos)
}

fn occupied_dates_json(
    month: &str,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    sessions_json: &str,
) -> BindingResult<String> {
    let month: CalendarMonth = month.parse().map_err(|e: session_guard::GuardError| e.to_string())?;
    let sessions = parse_sessions(sessions_json)?;
    let dates = session_guard::occupied_dates_for_month(
        month,
        non_empty(professional_id),
        non_empty(local_id),
        &sessions,
    );
    let dtos: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
    to_json(&dtos)
}

fn free_slots_json(
    date: &str,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    sessions_json: &str,
    exclude_id: Option<&str>,
    config_json: Option<&str>,
) -> BindingResult<String> {
    let date = session_guard::session::parse_date(date).map_err(|e| e.to_string())?;
    let sessions = parse_sessions(sessions_json)?;
    let config = parse_config(config_json)?;
    let window = config.opening_hours().map_err(|e| e.to_string())?;
    let slots = session_guard::free_slots_for_day(
        date,
        non_empty(professional_id),
        non_empty(local_id),
        &sessions,
        non_empty(exclude_id),
        window,
        i64::from(config.min_duration_minutes),
    );
    let dtos: Vec<FreeSlotDto> = slots.iter().map(FreeSlotDto::from).collect();
    to_json(&dtos)
}

fn validate_json(candidate_json: &str, config_json: Option<&str>) -> BindingResult<String> {
    let candidate = parse_candidate(candidate_json)?;
    let config = parse_config(config_json)?;
    let dto = match session_guard::validate_candidate(&candidate, &config) {
        Ok(interval) => ValidationDto {
            valid: true,
            error: None,
            duration_minutes: Some(interval.duration_minutes()),
        },
        Err(e) => ValidationDto {
            valid: false,
            error: Some(e.to_string()),
            duration_minutes: None,
        },
    };
    to_json(&dto)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check a candidate session against existing bookings.
///
/// `candidate_json` is a `{date, start_time, end_time, professional_id,
/// local_id, exclude_id}` object (all optional); `sessions_json` is an array of
/// backend session records. Returns `{has_conflict, professional_conflicts,
/// local_conflicts, messages}`.
#[wasm_bindgen(js_name = "evaluateConflicts")]
pub fn evaluate_conflicts(candidate_json: &str, sessions_json: &str) -> Result<String, JsValue> {
    evaluate_json(candidate_json, sessions_json).map_err(|e| JsValue::from_str(&e))
}

/// Busy ranges for the day-view time picker, tagged `professional` or `local`.
#[wasm_bindgen(js_name = "busySlotsForDay")]
pub fn busy_slots_for_day(
    date: &str,
    professional_id: Option<String>,
    local_id: Option<String>,
    sessions_json: &str,
    exclude_id: Option<String>,
) -> Result<String, JsValue> {
    busy_slots_json(
        date,
        professional_id.as_deref(),
        local_id.as_deref(),
        sessions_json,
        exclude_id.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Days of a `YYYY-MM` month with at least one booking, as `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "occupiedDatesForMonth")]
pub fn occupied_dates_for_month(
    month: &str,
    professional_id: Option<String>,
    local_id: Option<String>,
    sessions_json: &str,
) -> Result<String, JsValue> {
    occupied_dates_json(
        month,
        professional_id.as_deref(),
        local_id.as_deref(),
        sessions_json,
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Bookable gaps within the configured opening hours.
#[wasm_bindgen(js_name = "freeSlotsForDay")]
pub fn free_slots_for_day(
    date: &str,
    professional_id: Option<String>,
    local_id: Option<String>,
    sessions_json: &str,
    exclude_id: Option<String>,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    free_slots_json(
        date,
        professional_id.as_deref(),
        local_id.as_deref(),
        sessions_json,
        exclude_id.as_deref(),
        config_json.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Form-level validation: completeness, ordering, and minimum duration.
///
/// Validation failures are reported in the returned JSON (`valid: false`);
/// only malformed JSON raises.
#[wasm_bindgen(js_name = "validateCandidate")]
pub fn validate_candidate(candidate_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    validate_json(candidate_json, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const SESSIONS: &str = r#"[
        {"id": "S1", "title": "Yoga", "date": "2025-06-05",
         "start_time": "09:00", "end_time": "10:00",
         "professional_id": "P1", "local_id": "L1", "state": "SCHEDULED"},
        {"id": "S2", "title": "Spin", "date": "2025-06-20",
         "start_time": "18:00", "end_time": "19:00",
         "professional_id": "P1", "local_id": null, "state": "SCHEDULED"}
    ]"#;

    #[test]
    fn evaluate_reports_both_sources() {
        let candidate = r#"{"date": "2025-06-05", "start_time": "09:30", "end_time": "10:30",
                            "professional_id": "P1", "local_id": "L1"}"#;
        let out: Value = serde_json::from_str(&evaluate_json(candidate, SESSIONS).unwrap()).unwrap();

        assert_eq!(out["has_conflict"], true);
        assert_eq!(out["professional_conflicts"][0]["id"], "S1");
        assert_eq!(out["local_conflicts"][0]["start_time"], "09:00:00");
        assert_eq!(out["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn busy_slots_are_flat_and_tagged() {
        let out: Value = serde_json::from_str(
            &busy_slots_json("2025-06-05", Some("P1"), Some("L1"), SESSIONS, None).unwrap(),
        )
        .unwrap();

        assert_eq!(out.as_array().unwrap().len(), 2);
        assert_eq!(out[0]["source"], "professional");
        assert_eq!(out[1]["source"], "local");
        assert_eq!(out[0]["end"], "10:00:00");
    }

    #[test]
    fn sub_minute_sessions_keep_their_seconds() {
        let sessions = r#"[{"id": "S7", "title": "Check-in", "date": "2025-06-05",
                            "start_time": "09:00:30", "end_time": "09:00:50",
                            "professional_id": "P1", "local_id": "L1"}]"#;

        let busy: Value = serde_json::from_str(
            &busy_slots_json("2025-06-05", Some("P1"), None, sessions, None).unwrap(),
        )
        .unwrap();
        assert_eq!(busy[0]["start"], "09:00:30");
        assert_eq!(busy[0]["end"], "09:00:50");

        let candidate = r#"{"date": "2025-06-05", "start_time": "09:00:40", "end_time": "09:30",
                            "professional_id": "P1"}"#;
        let out: Value = serde_json::from_str(&evaluate_json(candidate, sessions).unwrap()).unwrap();
        assert_eq!(out["professional_conflicts"][0]["start_time"], "09:00:30");
        assert_eq!(out["professional_conflicts"][0]["end_time"], "09:00:50");
        assert_eq!(out["messages"][0], "Professional busy: Check-in (09:00:30-09:00:50)");
    }

    #[test]
    fn session_until_midnight_ends_at_24() {
        let sessions = r#"[{"id": "S8", "title": "Late", "date": "2025-06-05",
                            "start_time": "23:00", "end_time": "2025-06-06T00:00:00",
                            "professional_id": "P1"}]"#;
        let busy: Value = serde_json::from_str(
            &busy_slots_json("2025-06-05", Some("P1"), None, sessions, None).unwrap(),
        )
        .unwrap();
        assert_eq!(busy[0]["start"], "23:00:00");
        assert_eq!(busy[0]["end"], "24:00:00");
    }

    #[test]
    fn empty_ids_from_js_mean_unset() {
        let out = busy_slots_json("2025-06-05", Some(""), Some(""), SESSIONS, Some("")).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn occupied_dates_are_iso_strings() {
        let out = occupied_dates_json("2025-06", Some("P1"), None, SESSIONS).unwrap();
        assert_eq!(out, r#"["2025-06-05","2025-06-20"]"#);
    }

    #[test]
    fn bad_month_is_an_error() {
        let err = occupied_dates_json("June", Some("P1"), None, SESSIONS).unwrap_err();
        assert!(err.contains("Invalid month"));
    }

    #[test]
    fn free_slots_use_config_window() {
        let config = r#"{"day_start": "08:00", "day_end": "12:00", "min_duration_minutes": 45}"#;
        let out: Value = serde_json::from_str(
            &free_slots_json("2025-06-05", Some("P1"), None, SESSIONS, None, Some(config)).unwrap(),
        )
        .unwrap();

        assert_eq!(out.as_array().unwrap().len(), 2);
        assert_eq!(out[0]["start"], "08:00:00");
        assert_eq!(out[1]["duration_minutes"], 120);
    }

    #[test]
    fn validation_failure_is_data_not_error() {
        let candidate = r#"{"date": "2025-06-05", "start_time": "09:00", "end_time": "09:10",
                            "professional_id": "P1"}"#;
        let out: Value = serde_json::from_str(&validate_json(candidate, None).unwrap()).unwrap();

        assert_eq!(out["valid"], false);
        assert!(out["error"].as_str().unwrap().contains("minimum is 30"));
    }

    #[test]
    fn malformed_sessions_json_is_reported() {
        let err = evaluate_json("{}", "not json").unwrap_err();
        assert!(err.starts_with("Invalid sessions JSON"));
    }
}
