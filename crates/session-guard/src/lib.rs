//! # session-guard
//!
//! Double-booking detection and availability views for session scheduling.
//!
//! Given a candidate session (date, time range, professional, optional local)
//! and the sessions already booked, session-guard reports which bookings collide
//! with it and what the day and month look like for the booking calendar. All
//! functions are pure: they never perform I/O and never mutate their inputs.
//! Results are advisory; the backend performs the authoritative check on write.
//!
//! ## Modules
//!
//! - [`interval`]: Half-open time ranges and the overlap test
//! - [`session`]: Existing and candidate session records, wire parsing
//! - [`conflict`]: Professional and local conflict detection
//! - [`availability`]: Busy slots per day, occupied days per month, free slots
//! - [`validate`]: Candidate completeness, ordering, and minimum duration
//! - [`config`]: Shared booking rules
//! - [`error`]: Error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod session;
pub mod validate;

pub use availability::{
    busy_slots_for_day, free_slots_for_day, occupied_dates_for_month, BusySlot, CalendarMonth,
    FreeSlot, SlotSource,
};
pub use config::GuardConfig;
pub use conflict::{evaluate, overlap_minutes, ConflictResult};
pub use error::GuardError;
pub use interval::TimeInterval;
pub use session::{CandidateSession, ExistingSession, SessionState};
pub use validate::validate_candidate;
