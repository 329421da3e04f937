//! Session records as they arrive from the booking backend and the form layer.
//!
//! Time fields on the wire may be a bare time of day (`"09:30"`), a naive
//! datetime (`"2025-06-05T09:30:00"`), or an RFC 3339 datetime. Only the
//! wall-clock time is kept; callers normalize timezones before handing data in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GuardError, Result};
use crate::interval::TimeInterval;

/// Lifecycle state of a booked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
    Rescheduled,
}

impl SessionState {
    /// Cancelled sessions free their slot; every other state keeps it booked.
    pub fn is_active(self) -> bool {
        self != SessionState::Cancelled
    }
}

/// A previously scheduled session, fetched from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingSession {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "wire::date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "wire::time")]
    pub start_time: NaiveTime,
    #[serde(deserialize_with = "wire::time")]
    pub end_time: NaiveTime,
    #[serde(deserialize_with = "wire::id")]
    pub professional_id: String,
    /// `None` means the session is held virtually.
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub local_id: Option<String>,
    #[serde(default)]
    pub state: SessionState,
}

impl ExistingSession {
    /// The booked range, or `None` when the row is corrupt (`end <= start`).
    /// An `end_time` of `00:00` closes the session at midnight.
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::booking(self.start_time, self.end_time)
    }

    pub fn is_virtual(&self) -> bool {
        self.local_id.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_for_professional(&self, professional_id: &str) -> bool {
        self.professional_id == professional_id
    }

    pub fn is_at_local(&self, local_id: &str) -> bool {
        self.local_id.as_deref() == Some(local_id)
    }
}

/// The session being created or edited.
///
/// Every field is optional because the form may be half filled in; an
/// incomplete candidate never produces conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSession {
    #[serde(default, deserialize_with = "wire::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::opt_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "wire::opt_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub professional_id: Option<String>,
    /// `None` for a virtual session.
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub local_id: Option<String>,
    /// Id of the session being edited, so it never conflicts with itself.
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub exclude_id: Option<String>,
}

impl CandidateSession {
    /// The requested range, or `None` if a time is missing or out of order.
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::booking(self.start_time?, self.end_time?)
    }

    pub fn is_virtual(&self) -> bool {
        self.local_id.is_none()
    }
}

/// Parse a wall-clock time from any of the accepted wire shapes.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let s = raw.trim();

    for fmt in ["%H:%M:%S%.f", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(time);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local().time());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.time());
        }
    }

    Err(GuardError::InvalidTime(raw.to_string()))
}

/// Parse a calendar date (`YYYY-MM-DD`), ignoring a trailing time component
/// introduced by `T` or a space.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    let date_part = match s.get(10..11) {
        None => s,
        Some("T") | Some(" ") => &s[..10],
        Some(_) => return Err(GuardError::InvalidDate(raw.to_string())),
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| GuardError::InvalidDate(raw.to_string()))
}

/// Serde adapters for the lenient wire formats.
mod wire {
    use super::*;

    /// Backend ids show up as either strings or integers.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(s) => s,
                RawId::Number(n) => n.to_string(),
            }
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        RawId::deserialize(d).map(String::from)
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<String>, D::Error> {
        let raw = Option::<RawId>::deserialize(d)?;
        Ok(raw.map(String::from).filter(|s| !s.is_empty()))
    }

    pub fn time<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }

    pub fn opt_time<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_time_of_day(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }

    pub fn opt_date<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => {
                parse_date(&raw).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}
