//! Shift lifecycle and clock-in/out eligibility.
//!
//! Every function takes the current instant explicitly. The time zone carried by that
//! instant is the zone in which the shift's calendar date and times of day are read,
//! so the same shift evaluates identically for API handlers, tests and any other caller.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Location, Shift};
use crate::error::AppError;

/// How long before a shift boundary the matching clock action becomes available.
pub const CLOCK_WINDOW_LEAD_MINUTES: i64 = 5;

fn clock_window_lead() -> Duration {
    Duration::minutes(CLOCK_WINDOW_LEAD_MINUTES)
}

/// Derived temporal state of a shift. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftStatus::Scheduled => write!(f, "Scheduled"),
            ShiftStatus::InProgress => write!(f, "In Progress"),
            ShiftStatus::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockAction {
    In,
    Out,
}

/// Absolute start and end of a shift in a concrete time zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftWindow<Z: TimeZone> {
    pub start: DateTime<Z>,
    pub end: DateTime<Z>,
}

impl<Z: TimeZone> ShiftWindow<Z> {
    pub fn resolve(shift: &Shift, zone: &Z) -> Self {
        let start = localize(zone, shift.date.and_time(shift.start_time));
        let mut end = localize(zone, shift.date.and_time(shift.finish_time));
        // A start pushed forward out of a DST gap can overtake an end that was not.
        if end <= start {
            end = start.clone() + (shift.finish_time - shift.start_time);
        }
        Self { start, end }
    }

    /// Both ends are inclusive: a shift is in progress at exactly its start and its end.
    pub fn status_at(&self, now: &DateTime<Z>) -> ShiftStatus {
        if now < &self.start {
            ShiftStatus::Scheduled
        } else if now <= &self.end {
            ShiftStatus::InProgress
        } else {
            ShiftStatus::Completed
        }
    }

    /// First instant at which `action` is allowed by the clock window.
    pub fn opens_at(&self, action: ClockAction) -> DateTime<Z> {
        let boundary = match action {
            ClockAction::In => self.start.clone(),
            ClockAction::Out => self.end.clone(),
        };
        boundary - clock_window_lead()
    }
}

// Ambiguous wall times take the earlier instant; wall times skipped by a DST jump
// move forward by an hour.
fn localize<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> DateTime<Z> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| zone.from_utc_datetime(&local))
}

pub fn evaluate_status<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> ShiftStatus {
    ShiftWindow::resolve(shift, &now.timezone()).status_at(now)
}

/// Explains why clock-in is refused, or `Ok(())` when it is allowed.
pub fn check_clock_in<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> Result<(), AppError> {
    if shift.is_clocked_in {
        return Err(AppError::Conflict("Already clocked in".to_string()));
    }
    // One pair of clock timestamps per shift: a finished cycle is final.
    if shift.clock_out_time.is_some() {
        return Err(AppError::Conflict(
            "Shift has already been clocked in and out".to_string(),
        ));
    }

    let window = ShiftWindow::resolve(shift, &now.timezone());
    if window.status_at(now) == ShiftStatus::Completed {
        return Err(AppError::invalid_state(
            "Cannot clock in to a completed shift",
        ));
    }

    let opens_at = window.opens_at(ClockAction::In);
    if now.date_naive() != shift.date {
        let message = "Cannot clock in on a different day than the shift";
        return Err(if now < &opens_at {
            AppError::invalid_state_until(message, opens_at.with_timezone(&Utc))
        } else {
            AppError::invalid_state(message)
        });
    }

    if now < &opens_at {
        return Err(AppError::invalid_state_until(
            format!(
                "Cannot clock in more than {} minutes before shift start time (available in {})",
                CLOCK_WINDOW_LEAD_MINUTES,
                format_duration(ceil_minutes(
                    opens_at.clone().signed_duration_since(now.clone())
                ))
            ),
            opens_at.with_timezone(&Utc),
        ));
    }

    Ok(())
}

/// Explains why clock-out is refused, or `Ok(())` when it is allowed.
pub fn check_clock_out<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> Result<(), AppError> {
    if !shift.is_clocked_in {
        return Err(AppError::Conflict("Not clocked in".to_string()));
    }

    let opens_at = ShiftWindow::resolve(shift, &now.timezone()).opens_at(ClockAction::Out);
    if now < &opens_at {
        return Err(AppError::invalid_state_until(
            format!(
                "Cannot clock out more than {} minutes before shift end time (available in {})",
                CLOCK_WINDOW_LEAD_MINUTES,
                format_duration(ceil_minutes(
                    opens_at.clone().signed_duration_since(now.clone())
                ))
            ),
            opens_at.with_timezone(&Utc),
        ));
    }

    Ok(())
}

pub fn can_clock_in<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> bool {
    check_clock_in(shift, now).is_ok()
}

pub fn can_clock_out<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> bool {
    check_clock_out(shift, now).is_ok()
}

/// Time left until the clock window for `action` opens; zero once it has opened.
pub fn time_until_eligible<Z: TimeZone>(
    shift: &Shift,
    now: &DateTime<Z>,
    action: ClockAction,
) -> Duration {
    let opens_at = ShiftWindow::resolve(shift, &now.timezone()).opens_at(action);
    opens_at
        .signed_duration_since(now.clone())
        .max(Duration::zero())
}

/// Whole minutes until the shift ends, never negative.
pub fn minutes_remaining<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> i64 {
    let end = ShiftWindow::resolve(shift, &now.timezone()).end;
    end.signed_duration_since(now.clone()).num_minutes().max(0)
}

fn ceil_minutes(duration: Duration) -> i64 {
    let whole = duration.num_minutes();
    let minutes = if duration > Duration::minutes(whole) {
        whole + 1
    } else {
        whole
    };
    minutes.max(0)
}

/// Renders minutes as `Xh Ym`.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Worked time between two clock instants, rounded half up to whole minutes.
/// `None` when `clock_out` precedes `clock_in`.
pub fn worked_minutes(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> Option<i64> {
    let elapsed_ms = clock_out.signed_duration_since(clock_in).num_milliseconds();
    (elapsed_ms >= 0).then(|| (elapsed_ms + 30_000) / 60_000)
}

pub fn clock_in<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> Result<Shift, AppError> {
    check_clock_in(shift, now)?;

    let at = now.with_timezone(&Utc);
    let mut updated = shift.clone();
    updated.clock_in_time = Some(at);
    updated.is_clocked_in = true;
    updated.updated_at = at;

    Ok(updated)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockOutcome {
    pub shift: Shift,
    pub minutes_worked: i64,
    /// Set when the recorded clock-in was missing or later than the clock-out.
    pub skew_detected: bool,
}

pub fn clock_out<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> Result<ClockOutcome, AppError> {
    check_clock_out(shift, now)?;

    let at = now.with_timezone(&Utc);
    let worked = shift
        .clock_in_time
        .and_then(|clock_in| worked_minutes(clock_in, at));
    let skew_detected = worked.is_none();

    if skew_detected {
        log::warn!(
            "Shift {} clocked out at {} before its recorded clock-in {:?}; worked time set to 0",
            shift.id,
            at,
            shift.clock_in_time
        );
    }

    let mut updated = shift.clone();
    updated.clock_out_time = Some(at);
    updated.is_clocked_in = false;
    updated.total_hours_worked = worked.unwrap_or(0);
    updated.updated_at = at;

    Ok(ClockOutcome {
        minutes_worked: updated.total_hours_worked,
        shift: updated,
        skew_detected,
    })
}

/// A shift as presented to clients, with its derived state evaluated at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftView {
    #[serde(flatten)]
    pub shift: Shift,
    pub status: ShiftStatus,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    pub minutes_remaining: i64,
    /// The location the shift points at, when it could be looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ShiftView {
    pub fn at<Z: TimeZone>(shift: Shift, now: &DateTime<Z>) -> Self {
        Self {
            status: evaluate_status(&shift, now),
            can_clock_in: can_clock_in(&shift, now),
            can_clock_out: can_clock_out(&shift, now),
            minutes_remaining: minutes_remaining(&shift, now),
            location: None,
            shift,
        }
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockWindow {
    pub shift_id: Uuid,
    pub status: ShiftStatus,
    pub is_clocked_in: bool,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    pub clock_in_opens_at: DateTime<Utc>,
    pub clock_out_opens_at: DateTime<Utc>,
    pub clock_in_available_in_minutes: i64,
    pub clock_out_available_in_minutes: i64,
    pub clock_in_available_in: String,
    pub clock_out_available_in: String,
}

impl ClockWindow {
    pub fn at<Z: TimeZone>(shift: &Shift, now: &DateTime<Z>) -> Self {
        let window = ShiftWindow::resolve(shift, &now.timezone());
        let in_minutes = ceil_minutes(time_until_eligible(shift, now, ClockAction::In));
        let out_minutes = ceil_minutes(time_until_eligible(shift, now, ClockAction::Out));

        Self {
            shift_id: shift.id,
            status: window.status_at(now),
            is_clocked_in: shift.is_clocked_in,
            can_clock_in: can_clock_in(shift, now),
            can_clock_out: can_clock_out(shift, now),
            clock_in_opens_at: window.opens_at(ClockAction::In).with_timezone(&Utc),
            clock_out_opens_at: window.opens_at(ClockAction::Out).with_timezone(&Utc),
            clock_in_available_in_minutes: in_minutes,
            clock_out_available_in_minutes: out_minutes,
            clock_in_available_in: format_duration(in_minutes),
            clock_out_available_in: format_duration(out_minutes),
        }
    }
}
