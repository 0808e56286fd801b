use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub title: String,
    pub role: String,
    pub type_of_shift: Vec<String>,
    pub owner_user_id: Uuid,
    pub location_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub finish_time: NaiveTime,
    pub num_of_shifts_per_day: i32,
    pub clock_in_time: Option<DateTime<Utc>>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub is_clocked_in: bool,
    /// Worked time in whole minutes, written by clock-out only.
    pub total_hours_worked: i64,
    /// Bumped by the store on every successful save.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn new(owner_user_id: Uuid, input: NewShift, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            role: input.role,
            type_of_shift: input.type_of_shift,
            owner_user_id,
            location_id: input.location_id,
            date: input.date,
            start_time: input.start_time,
            finish_time: input.finish_time,
            num_of_shifts_per_day: input.num_of_shifts_per_day,
            clock_in_time: None,
            clock_out_time: None,
            is_clocked_in: false,
            total_hours_worked: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_user_id == user_id
    }
}

/// A fully validated shift definition, ready to become a [`Shift`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub title: String,
    pub role: String,
    pub type_of_shift: Vec<String>,
    pub location_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub finish_time: NaiveTime,
    pub num_of_shifts_per_day: i32,
}

/// Raw shift fields as submitted by a client. Used both for creation, where the
/// required fields must be present, and as a partial patch for updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    pub title: Option<String>,
    pub role: Option<String>,
    pub type_of_shift: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub num_of_shifts_per_day: Option<i32>,
    pub location_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftUpdateItem {
    pub id: Option<String>,
    #[serde(flatten)]
    pub changes: ShiftInput,
}

impl ShiftInput {
    /// Validates a creation request. `today` is the current date in the shift time zone.
    pub fn into_new_shift(self, today: NaiveDate) -> Result<NewShift, AppError> {
        let title = non_blank(self.title);
        let role = non_blank(self.role);
        let start_time = non_blank(self.start_time);
        let finish_time = non_blank(self.finish_time);
        let location_id = non_blank(self.location_id);
        let date = non_blank(self.date);

        let (title, role, start_time, finish_time, location_id, date) =
            match (title, role, start_time, finish_time, location_id, date) {
                (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) => (a, b, c, d, e, f),
                (a, b, c, d, e, f) => {
                    let missing: Vec<&str> = [
                        ("title", a.is_none()),
                        ("role", b.is_none()),
                        ("startTime", c.is_none()),
                        ("finishTime", d.is_none()),
                        ("locationId", e.is_none()),
                        ("date", f.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();

                    return Err(AppError::Validation(format!(
                        "Missing required fields: {}",
                        missing.join(", ")
                    )));
                }
            };

        let start_time = parse_time_of_day("startTime", &start_time)?;
        let finish_time = parse_time_of_day("finishTime", &finish_time)?;
        ensure_finish_after_start(start_time, finish_time)?;

        let date = parse_date(&date)?;
        ensure_not_past(date, today)?;

        let num_of_shifts_per_day = self.num_of_shifts_per_day.unwrap_or(1);
        ensure_positive_count(num_of_shifts_per_day)?;

        Ok(NewShift {
            title,
            role,
            type_of_shift: dedup_tags(self.type_of_shift.unwrap_or_default()),
            location_id: parse_id("location", &location_id)?,
            date,
            start_time,
            finish_time,
            num_of_shifts_per_day,
        })
    }

    /// Applies the present fields onto `shift` and re-validates the result.
    /// Clock fields, owner and identity are never touched.
    pub fn apply_to(&self, shift: &Shift, today: NaiveDate) -> Result<Shift, AppError> {
        let mut updated = shift.clone();

        if let Some(title) = &self.title {
            updated.title = required_text("title", title)?;
        }
        if let Some(role) = &self.role {
            updated.role = required_text("role", role)?;
        }
        if let Some(tags) = &self.type_of_shift {
            updated.type_of_shift = dedup_tags(tags.clone());
        }
        if let Some(start) = &self.start_time {
            updated.start_time = parse_time_of_day("startTime", start)?;
        }
        if let Some(finish) = &self.finish_time {
            updated.finish_time = parse_time_of_day("finishTime", finish)?;
        }
        if let Some(count) = self.num_of_shifts_per_day {
            ensure_positive_count(count)?;
            updated.num_of_shifts_per_day = count;
        }
        if let Some(location_id) = &self.location_id {
            updated.location_id = parse_id("location", location_id)?;
        }
        if let Some(date) = &self.date {
            let date = parse_date(date)?;
            ensure_not_past(date, today)?;
            updated.date = date;
        }

        ensure_finish_after_start(updated.start_time, updated.finish_time)?;

        Ok(updated)
    }

    pub fn changes_location(&self, shift: &Shift) -> bool {
        self.location_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<Uuid>().ok())
            .is_some_and(|id| id != shift.location_id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

// Keeps first occurrence order; blank tags are dropped.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

/// Parses an identifier taken from a path, query string or body.
pub fn parse_id(kind: &str, raw: &str) -> Result<Uuid, AppError> {
    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid {} ID", kind)))
}

/// Parses a 24h `HH:MM` time of day. `HH:MM:SS` is accepted as well.
pub fn parse_time_of_day(field: &str, raw: &str) -> Result<NaiveTime, AppError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("{} must be a time in HH:MM format", field)))
}

/// Accepts a calendar date (`YYYY-MM-DD`) or an RFC 3339 timestamp, of which only the
/// date as written is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("date must be a calendar date (YYYY-MM-DD)".to_string()))
}

fn ensure_finish_after_start(start: NaiveTime, finish: NaiveTime) -> Result<(), AppError> {
    if finish <= start {
        return Err(AppError::Validation(
            "Finish time must be after start time".to_string(),
        ));
    }
    Ok(())
}

fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if date < today {
        return Err(AppError::Validation("Date cannot be in the past".to_string()));
    }
    Ok(())
}

fn ensure_positive_count(count: i32) -> Result<(), AppError> {
    if count < 1 {
        return Err(AppError::Validation(
            "numOfShiftsPerDay must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Serde adapter rendering a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
