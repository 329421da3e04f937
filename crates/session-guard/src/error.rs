//! Error types for session-guard parsing and validation.

use chrono::NaiveTime;
use thiserror::Error;

/// Errors raised while parsing wire input or validating a candidate.
///
/// Conflict evaluation itself never fails; these only come out of the
/// parsing, validation, and configuration paths.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Start time {start} must be before end time {end}")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    #[error("Session lasts {minutes} minutes, minimum is {minimum}")]
    DurationTooShort { minutes: i64, minimum: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
