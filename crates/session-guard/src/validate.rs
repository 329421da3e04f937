//! Form-level checks on a candidate before it is evaluated or submitted.

use crate::config::GuardConfig;
use crate::error::{GuardError, Result};
use crate::interval::TimeInterval;
use crate::session::CandidateSession;

/// Check that a candidate is complete, ordered, and long enough.
///
/// Returns the candidate's interval on success. A missing professional is
/// reported here even though [`crate::evaluate`] tolerates it.
///
/// # Errors
/// - `MissingField` if the date, either time, or the professional is absent.
/// - `InvalidInterval` if the end is not after the start.
/// - `DurationTooShort` if the session is shorter than `config.min_duration_minutes`.
pub fn validate_candidate(
    candidate: &CandidateSession,
    config: &GuardConfig,
) -> Result<TimeInterval> {
    if candidate.date.is_none() {
        return Err(GuardError::MissingField("date"));
    }
    let start = candidate
        .start_time
        .ok_or(GuardError::MissingField("start_time"))?;
    let end = candidate
        .end_time
        .ok_or(GuardError::MissingField("end_time"))?;
    if candidate.professional_id.is_none() {
        return Err(GuardError::MissingField("professional_id"));
    }

    let interval =
        TimeInterval::booking(start, end).ok_or(GuardError::InvalidInterval { start, end })?;

    let minutes = interval.duration_minutes();
    if minutes < i64::from(config.min_duration_minutes) {
        return Err(GuardError::DurationTooShort {
            minutes,
            minimum: config.min_duration_minutes,
        });
    }

    Ok(interval)
}
