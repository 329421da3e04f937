//! Detect double-booking of a professional or a local.
//!
//! Compares a candidate session against already-booked sessions on the same day.
//! Adjacent sessions (one ends exactly when the other starts) are NOT conflicts.
//! The check is advisory: the backend still performs the authoritative check
//! when the session is written.

use chrono::NaiveDate;
use serde::Serialize;

use crate::interval::TimeInterval;
use crate::session::{CandidateSession, ExistingSession};

/// Sessions that collide with a candidate, split by what is double-booked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictResult {
    /// Active sessions of the same professional overlapping the candidate.
    pub professional_conflicts: Vec<ExistingSession>,
    /// Active sessions at the same local overlapping the candidate.
    /// Always empty for virtual candidates.
    pub local_conflicts: Vec<ExistingSession>,
}

impl ConflictResult {
    pub fn has_conflict(&self) -> bool {
        !self.professional_conflicts.is_empty() || !self.local_conflicts.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.professional_conflicts.len() + self.local_conflicts.len()
    }

    /// One human-readable line per conflict, professional conflicts first.
    pub fn describe(&self) -> Vec<String> {
        let professional = self
            .professional_conflicts
            .iter()
            .map(|s| describe_session("Professional busy", s));
        let local = self
            .local_conflicts
            .iter()
            .map(|s| describe_session("Local occupied", s));
        professional.chain(local).collect()
    }
}

fn describe_session(prefix: &str, session: &ExistingSession) -> String {
    let range = session
        .interval()
        .map(|i| i.to_string())
        .unwrap_or_else(|| format!("{}-{}", session.start_time, session.end_time));
    let title = if session.title.is_empty() {
        session.id.as_str()
    } else {
        session.title.as_str()
    };
    format!("{}: {} ({})", prefix, title, range)
}

/// Evaluate a candidate session against existing bookings.
///
/// A session is a conflict when it is active (not cancelled), falls on the
/// candidate's date, is not the session being edited (`exclude_id`), and its
/// interval overlaps the candidate's: `a.start < b.end && b.start < a.end`.
///
/// Local conflicts are only computed when the candidate has a local; virtual
/// sessions never conflict on location. Output keeps the order of `existing`.
///
/// An incomplete candidate (no date, missing or inverted times) yields an
/// empty result rather than a phantom conflict.
pub fn evaluate(candidate: &CandidateSession, existing: &[ExistingSession]) -> ConflictResult {
    let (Some(date), Some(interval)) = (candidate.date, candidate.interval()) else {
        tracing::debug!("candidate incomplete or inverted; skipping conflict check");
        return ConflictResult::default();
    };

    let mut result = ConflictResult::default();

    let professional = candidate.professional_id.as_deref();
    let local = candidate.local_id.as_deref();
    let exclude = candidate.exclude_id.as_deref();

    for (session, booked) in bookable_on(existing, date, professional, local, exclude) {
        if !booked.overlaps(&interval) {
            continue;
        }
        if professional.is_some_and(|p| session.is_for_professional(p)) {
            result.professional_conflicts.push(session.clone());
        }
        if local.is_some_and(|l| session.is_at_local(l)) {
            result.local_conflicts.push(session.clone());
        }
    }

    tracing::debug!(
        %date,
        candidate = %interval,
        professional = result.professional_conflicts.len(),
        local = result.local_conflicts.len(),
        "evaluated session conflicts"
    );

    result
}

/// Minutes of `session` that fall inside the candidate's requested range.
///
/// Returns 0 when either side has no valid interval or they do not overlap.
pub fn overlap_minutes(candidate: &CandidateSession, session: &ExistingSession) -> i64 {
    match (candidate.interval(), session.interval()) {
        (Some(a), Some(b)) => a.overlap_with(&b).map_or(0, |o| o.duration_minutes()),
        _ => 0,
    }
}

/// Sessions of `professional_id` or at `local_id` that still hold their slot
/// on `date`, paired with their interval.
///
/// Drops cancelled sessions, the session named by `exclude_id`, and corrupt
/// rows whose end is not after their start. Only rows that belong to the
/// professional or the local are checked for corruption.
pub(crate) fn bookable_on<'a>(
    existing: &'a [ExistingSession],
    date: NaiveDate,
    professional_id: Option<&'a str>,
    local_id: Option<&'a str>,
    exclude_id: Option<&'a str>,
) -> impl Iterator<Item = (&'a ExistingSession, TimeInterval)> + 'a {
    existing
        .iter()
        .filter(move |s| s.is_active() && s.date == date)
        .filter(move |s| exclude_id != Some(s.id.as_str()))
        .filter(move |s| is_relevant(s, professional_id, local_id))
        .filter_map(valid_interval)
}

/// Whether `session` books the given professional or local.
pub(crate) fn is_relevant(
    session: &ExistingSession,
    professional_id: Option<&str>,
    local_id: Option<&str>,
) -> bool {
    professional_id.is_some_and(|p| session.is_for_professional(p))
        || local_id.is_some_and(|l| session.is_at_local(l))
}

/// Pair a session with its interval, logging and skipping corrupt rows.
pub(crate) fn valid_interval(session: &ExistingSession) -> Option<(&ExistingSession, TimeInterval)> {
    match session.interval() {
        Some(interval) => Some((session, interval)),
        None => {
            tracing::warn!(
                session_id = %session.id,
                start = %session.start_time,
                end = %session.end_time,
                "skipping session whose end is not after its start"
            );
            None
        }
    }
}
