//! `session-guard` CLI: check double-bookings and availability from JSON exports.
//!
//! ## Usage
//!
//! ```sh
//! # Check a candidate against booked sessions (stdin → stdout)
//! echo '{"candidate": {...}, "sessions": [...]}' | session-guard check
//!
//! # Validate the candidate first and exit with status 2 on a conflict
//! session-guard check --validate --fail-on-conflict -i request.json
//!
//! # Busy slots of a professional and a local on one day
//! session-guard busy --date 2025-06-05 --professional P1 --local L1 -i sessions.json
//!
//! # Days of June with at least one booking
//! session-guard occupied --month 2025-06 --professional P1 -i sessions.json
//!
//! # Free gaps within opening hours from a config file
//! session-guard --config rules.json free --date 2025-06-05 --professional P1 -i sessions.json
//! ```
//!
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use session_guard::session::parse_date;
use session_guard::{CalendarMonth, CandidateSession, ExistingSession, GuardConfig};
use std::io::{self, Read, Write};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status when `--fail-on-conflict` is set and a conflict was found.
const CONFLICT_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "session-guard",
    version,
    about = "Session double-booking and availability checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with booking rules (minimum duration, opening hours)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log evaluation details to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a candidate session for professional and local conflicts
    Check {
        /// Input file with `{"candidate": ..., "sessions": [...]}` (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Reject incomplete, inverted, or too-short candidates before checking
        #[arg(long)]
        validate: bool,
        /// Exit with status 2 when a conflict is found
        #[arg(long)]
        fail_on_conflict: bool,
    },
    /// List busy slots of a professional and/or local on one day
    Busy {
        #[command(flatten)]
        day: DayArgs,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List days of a month with at least one booking
    Occupied {
        /// Month as YYYY-MM
        #[arg(long)]
        month: CalendarMonth,
        /// Professional id
        #[arg(long)]
        professional: Option<String>,
        /// Local id
        #[arg(long)]
        local: Option<String>,
        /// Input file with a JSON array of sessions (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List free gaps within opening hours on one day
    Free {
        #[command(flatten)]
        day: DayArgs,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(clap::Args)]
struct DayArgs {
    /// Day as YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// Professional id
    #[arg(long)]
    professional: Option<String>,
    /// Local id
    #[arg(long)]
    local: Option<String>,
    /// Id of the session being edited
    #[arg(long)]
    exclude: Option<String>,
    /// Input file with a JSON array of sessions (stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
}

/// Input document for `check`.
#[derive(Deserialize)]
struct CheckRequest {
    candidate: CandidateSession,
    #[serde(default)]
    sessions: Vec<ExistingSession>,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    has_conflict: bool,
    conflict_count: usize,
    professional_conflicts: &'a [ExistingSession],
    local_conflicts: &'a [ExistingSession],
    messages: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => GuardConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => GuardConfig::default(),
    };

    match cli.command {
        Commands::Check {
            input,
            output,
            validate,
            fail_on_conflict,
        } => {
            let raw = read_input(input.as_deref())?;
            let request: CheckRequest =
                serde_json::from_str(&raw).context("Failed to parse check request JSON")?;

            if validate {
                session_guard::validate_candidate(&request.candidate, &config)
                    .context("Candidate session is not valid")?;
            }

            tracing::debug!(count = request.sessions.len(), "loaded sessions");
            let result = session_guard::evaluate(&request.candidate, &request.sessions);
            let report = CheckReport {
                has_conflict: result.has_conflict(),
                conflict_count: result.conflict_count(),
                professional_conflicts: &result.professional_conflicts,
                local_conflicts: &result.local_conflicts,
                messages: result.describe(),
            };
            write_json(output.as_deref(), &report)?;

            if fail_on_conflict && result.has_conflict() {
                io::stdout().flush().context("Failed to flush stdout")?;
                process::exit(CONFLICT_EXIT_CODE);
            }
        }
        Commands::Busy { day, output } => {
            let (date, sessions) = load_day(&day)?;
            let slots = session_guard::busy_slots_for_day(
                date,
                day.professional.as_deref(),
                day.local.as_deref(),
                &sessions,
                day.exclude.as_deref(),
            );
            write_json(output.as_deref(), &slots)?;
        }
        Commands::Occupied {
            month,
            professional,
            local,
            input,
            output,
        } => {
            let sessions = read_sessions(input.as_deref())?;
            let dates = session_guard::occupied_dates_for_month(
                month,
                professional.as_deref(),
                local.as_deref(),
                &sessions,
            );
            write_json(output.as_deref(), &dates)?;
        }
        Commands::Free { day, output } => {
            let (date, sessions) = load_day(&day)?;
            let window = config.opening_hours()?;
            let slots = session_guard::free_slots_for_day(
                date,
                day.professional.as_deref(),
                day.local.as_deref(),
                &sessions,
                day.exclude.as_deref(),
                window,
                i64::from(config.min_duration_minutes),
            );
            write_json(output.as_deref(), &slots)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("session_guard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_day(day: &DayArgs) -> Result<(NaiveDate, Vec<ExistingSession>)> {
    let date = parse_date(&day.date).with_context(|| format!("Invalid --date: {}", day.date))?;
    let sessions = read_sessions(day.input.as_deref())?;
    Ok((date, sessions))
}

fn read_sessions(path: Option<&str>) -> Result<Vec<ExistingSession>> {
    let raw = read_input(path)?;
    let sessions: Vec<ExistingSession> =
        serde_json::from_str(&raw).context("Failed to parse sessions JSON")?;
    tracing::debug!(count = sessions.len(), "loaded sessions");
    Ok(sessions)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}
