//! Property-based tests for the overlap primitive and conflict evaluation.
//!
//! These hold for any well-formed day of bookings, not just the hand-picked
//! scenarios in `conflict_tests.rs`.

use chrono::{NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;
use session_guard::{
    busy_slots_for_day, evaluate, CandidateSession, ExistingSession, SessionState, TimeInterval,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn time_from_minutes(minutes: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
}

/// A valid interval with 5-minute granularity inside one day.
fn arb_interval() -> impl Strategy<Value = TimeInterval> {
    (0u32..287, 1u32..=48).prop_map(|(start_step, len_steps)| {
        let start = start_step * 5;
        let end = (start + len_steps * 5).min(24 * 60 - 1);
        TimeInterval::new(time_from_minutes(start), time_from_minutes(end)).unwrap()
    })
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Scheduled),
        Just(SessionState::Ongoing),
        Just(SessionState::Completed),
        Just(SessionState::Cancelled),
        Just(SessionState::Rescheduled),
    ]
}

fn arb_professional() -> impl Strategy<Value = String> {
    prop_oneof![Just("P1".to_string()), Just("P2".to_string())]
}

fn arb_local() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("L1".to_string())),
        Just(Some("L2".to_string())),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (5u32..=6).prop_map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
}

fn arb_sessions() -> impl Strategy<Value = Vec<ExistingSession>> {
    prop::collection::vec(
        (arb_interval(), arb_state(), arb_professional(), arb_local(), arb_date()),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (interval, state, professional_id, local_id, date))| ExistingSession {
                id: format!("S{}", i),
                title: format!("Session {}", i),
                date,
                start_time: interval.start(),
                end_time: interval.end(),
                professional_id,
                local_id,
                state,
            })
            .collect()
    })
}

fn arb_candidate() -> impl Strategy<Value = CandidateSession> {
    (
        arb_interval(),
        arb_professional(),
        arb_local(),
        prop::option::of(0usize..12),
    )
        .prop_map(|(interval, professional_id, local_id, exclude)| CandidateSession {
            date: NaiveDate::from_ymd_opt(2025, 6, 5),
            start_time: Some(interval.start()),
            end_time: Some(interval.end()),
            professional_id: Some(professional_id),
            local_id,
            exclude_id: exclude.map(|i| format!("S{}", i)),
        })
}

/// Straight reading of the conflict rule, one predicate per session, used as
/// the oracle for `evaluate`.
fn reference_conflicts(
    candidate: &CandidateSession,
    existing: &[ExistingSession],
) -> (Vec<String>, Vec<String>) {
    let (start, end) = (candidate.start_time.unwrap(), candidate.end_time.unwrap());
    let clashes = |s: &&ExistingSession| {
        s.state != SessionState::Cancelled
            && Some(s.date) == candidate.date
            && candidate.exclude_id.as_deref() != Some(s.id.as_str())
            && s.start_time < s.end_time
            && s.start_time < end
            && start < s.end_time
    };
    let professional = existing
        .iter()
        .filter(clashes)
        .filter(|s| Some(&s.professional_id) == candidate.professional_id.as_ref())
        .map(|s| s.id.clone())
        .collect();
    let local = existing
        .iter()
        .filter(clashes)
        .filter(|s| candidate.local_id.is_some() && s.local_id == candidate.local_id)
        .map(|s| s.id.clone())
        .collect();
    (professional, local)
}

fn ids(sessions: &[ExistingSession]) -> Vec<String> {
    sessions.iter().map(|s| s.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn overlap_is_symmetric(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.overlap_with(&b), b.overlap_with(&a));
    }

    #[test]
    fn interval_overlaps_itself(a in arb_interval()) {
        prop_assert!(a.overlaps(&a));
    }

    #[test]
    fn touching_intervals_do_not_overlap(a in arb_interval(), len in 1u32..=60) {
        let start = a.end();
        let end_minutes = (start.hour() * 60 + start.minute() + len).min(24 * 60 - 1);
        if let Some(b) = TimeInterval::new(start, time_from_minutes(end_minutes)) {
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }
    }

    #[test]
    fn excluded_session_never_reported(
        candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        let result = evaluate(&candidate, &existing);
        if let Some(excluded) = candidate.exclude_id.as_deref() {
            prop_assert!(result.professional_conflicts.iter().all(|s| s.id != excluded));
            prop_assert!(result.local_conflicts.iter().all(|s| s.id != excluded));
        }
    }

    #[test]
    fn cancelled_sessions_never_reported(
        candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        let result = evaluate(&candidate, &existing);
        prop_assert!(result.professional_conflicts.iter().all(|s| s.is_active()));
        prop_assert!(result.local_conflicts.iter().all(|s| s.is_active()));

        let date = candidate.date.unwrap();
        let slots = busy_slots_for_day(
            date,
            candidate.professional_id.as_deref(),
            candidate.local_id.as_deref(),
            &existing,
            None,
        );
        for slot in &slots {
            let session = existing.iter().find(|s| s.id == slot.session_id).unwrap();
            prop_assert!(session.is_active());
        }
    }

    #[test]
    fn virtual_candidate_has_no_local_conflicts(
        mut candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        candidate.local_id = None;
        prop_assert!(evaluate(&candidate, &existing).local_conflicts.is_empty());
    }

    #[test]
    fn every_reported_conflict_really_overlaps(
        candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        let requested = candidate.interval().unwrap();
        let result = evaluate(&candidate, &existing);
        for s in result.professional_conflicts.iter().chain(&result.local_conflicts) {
            prop_assert_eq!(Some(s.date), candidate.date);
            prop_assert!(s.interval().unwrap().overlaps(&requested));
        }
        for s in &result.professional_conflicts {
            prop_assert_eq!(Some(&s.professional_id), candidate.professional_id.as_ref());
        }
        for s in &result.local_conflicts {
            prop_assert_eq!(&s.local_id, &candidate.local_id);
        }
    }

    #[test]
    fn evaluation_is_idempotent(
        candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        prop_assert_eq!(evaluate(&candidate, &existing), evaluate(&candidate, &existing));
    }

    #[test]
    fn evaluation_matches_reference_filter(
        candidate in arb_candidate(),
        existing in arb_sessions(),
    ) {
        let result = evaluate(&candidate, &existing);
        let (professional, local) = reference_conflicts(&candidate, &existing);
        prop_assert_eq!(ids(&result.professional_conflicts), professional);
        prop_assert_eq!(ids(&result.local_conflicts), local);
    }
}
