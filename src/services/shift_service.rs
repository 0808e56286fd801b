use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::database::models::{parse_id, Shift, ShiftInput, ShiftUpdateItem};
use crate::database::repositories::{LocationDirectory, ShiftStore};
use crate::error::AppError;
use crate::services::shift_clock::{self, ClockOutcome, ClockWindow, ShiftStatus};

const CONCURRENT_MODIFICATION: &str = "Shift was modified by another request; reload and try again";

/// Shift CRUD and clock actions on top of the storage ports.
///
/// Each mutation reads a shift, decides against the instant it was handed, and writes
/// back conditionally on the version it read. A lost write is re-evaluated against the
/// fresh record so the caller gets the reason it would now be refused.
#[derive(Clone)]
pub struct ShiftService {
    shifts: Arc<dyn ShiftStore>,
    locations: Arc<dyn LocationDirectory>,
}

impl ShiftService {
    pub fn new(shifts: Arc<dyn ShiftStore>, locations: Arc<dyn LocationDirectory>) -> Self {
        Self { shifts, locations }
    }

    pub async fn create_shift(
        &self,
        owner_user_id: Uuid,
        input: ShiftInput,
        now: &DateTime<Tz>,
    ) -> Result<Shift, AppError> {
        let new_shift = input.into_new_shift(now.date_naive())?;
        self.ensure_location_exists(new_shift.location_id).await?;

        let shift = Shift::new(owner_user_id, new_shift, now.with_timezone(&Utc));
        let saved = self.shifts.insert(&shift).await?;

        log::info!(
            "Shift {} created for user {} on {} {}-{}",
            saved.id,
            owner_user_id,
            saved.date,
            saved.start_time.format("%H:%M"),
            saved.finish_time.format("%H:%M")
        );
        Ok(saved)
    }

    pub async fn get_shift(&self, shift_id: Uuid, user_id: Uuid) -> Result<Shift, AppError> {
        self.load_owned(shift_id, user_id).await
    }

    pub async fn list_shifts(&self, owner_user_id: Uuid) -> Result<Vec<Shift>, AppError> {
        Ok(self.shifts.find_by_owner(owner_user_id).await?)
    }

    /// Edits scheduling fields. Only allowed before the shift starts and before anyone
    /// has clocked in.
    pub async fn update_shift(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        input: &ShiftInput,
        now: &DateTime<Tz>,
    ) -> Result<Shift, AppError> {
        let shift = self.load_owned(shift_id, user_id).await?;
        ensure_editable(&shift, now, "edited")?;

        let mut updated = input.apply_to(&shift, now.date_naive())?;
        if input.changes_location(&shift) {
            self.ensure_location_exists(updated.location_id).await?;
        }
        updated.updated_at = now.with_timezone(&Utc);

        match self.shifts.save_if_version(&updated, shift.version).await? {
            Some(saved) => {
                log::info!("Shift {} updated by user {}", saved.id, user_id);
                Ok(saved)
            }
            None => {
                log::warn!("Update of shift {} lost a concurrent write", shift_id);
                Err(AppError::Conflict(CONCURRENT_MODIFICATION.to_string()))
            }
        }
    }

    pub async fn delete_shift(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        now: &DateTime<Tz>,
    ) -> Result<(), AppError> {
        let shift = self.load_owned(shift_id, user_id).await?;
        ensure_editable(&shift, now, "deleted")?;

        if !self.shifts.delete_if_version(shift.id, shift.version).await? {
            log::warn!("Delete of shift {} lost a concurrent write", shift_id);
            return Err(AppError::Conflict(CONCURRENT_MODIFICATION.to_string()));
        }

        log::info!("Shift {} deleted by user {}", shift_id, user_id);
        Ok(())
    }

    pub async fn clock_in(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        now: &DateTime<Tz>,
    ) -> Result<Shift, AppError> {
        let shift = self.load_for_clock(shift_id, user_id).await?;
        let updated = shift_clock::clock_in(&shift, now)?;

        match self.shifts.save_if_version(&updated, shift.version).await? {
            Some(saved) => {
                log::info!(
                    "User {} clocked in to shift {} at {}",
                    user_id,
                    shift_id,
                    now.to_rfc3339()
                );
                Ok(saved)
            }
            None => {
                log::warn!("Clock-in for shift {} lost a concurrent write", shift_id);
                let current = self.load_for_clock(shift_id, user_id).await?;
                shift_clock::check_clock_in(&current, now)?;
                Err(AppError::Conflict(CONCURRENT_MODIFICATION.to_string()))
            }
        }
    }

    pub async fn clock_out(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        now: &DateTime<Tz>,
    ) -> Result<ClockOutcome, AppError> {
        let shift = self.load_for_clock(shift_id, user_id).await?;
        let outcome = shift_clock::clock_out(&shift, now)?;

        match self.shifts.save_if_version(&outcome.shift, shift.version).await? {
            Some(saved) => {
                log::info!(
                    "User {} clocked out of shift {} after {}",
                    user_id,
                    shift_id,
                    shift_clock::format_duration(outcome.minutes_worked)
                );
                Ok(ClockOutcome {
                    shift: saved,
                    ..outcome
                })
            }
            None => {
                log::warn!("Clock-out for shift {} lost a concurrent write", shift_id);
                let current = self.load_for_clock(shift_id, user_id).await?;
                shift_clock::check_clock_out(&current, now)?;
                Err(AppError::Conflict(CONCURRENT_MODIFICATION.to_string()))
            }
        }
    }

    pub async fn clock_window(
        &self,
        shift_id: Uuid,
        user_id: Uuid,
        now: &DateTime<Tz>,
    ) -> Result<ClockWindow, AppError> {
        let shift = self.load_owned(shift_id, user_id).await?;
        Ok(ClockWindow::at(&shift, now))
    }

    /// Creates each shift independently; one failing item does not stop the rest.
    pub async fn bulk_create(
        &self,
        owner_user_id: Uuid,
        inputs: Vec<ShiftInput>,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Result<Shift, AppError>>, AppError> {
        ensure_not_empty(inputs.len())?;

        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.create_shift(owner_user_id, input, now).await);
        }
        Ok(results)
    }

    pub async fn bulk_update(
        &self,
        user_id: Uuid,
        items: Vec<ShiftUpdateItem>,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Result<Shift, AppError>>, AppError> {
        ensure_not_empty(items.len())?;

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = match item.id.as_deref() {
                None => Err(AppError::Validation("Shift ID is required".to_string())),
                Some(raw) => match parse_id("shift", raw) {
                    Ok(shift_id) => self.update_shift(shift_id, user_id, &item.changes, now).await,
                    Err(e) => Err(e),
                },
            };
            results.push(result);
        }
        Ok(results)
    }

    // Shifts owned by someone else are reported as missing.
    async fn load_owned(&self, shift_id: Uuid, user_id: Uuid) -> Result<Shift, AppError> {
        self.shifts
            .find_by_id(shift_id)
            .await?
            .filter(|shift| shift.is_owned_by(user_id))
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
    }

    async fn load_for_clock(&self, shift_id: Uuid, user_id: Uuid) -> Result<Shift, AppError> {
        let shift = self
            .shifts
            .find_by_id(shift_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        if !shift.is_owned_by(user_id) {
            log::warn!(
                "User {} attempted a clock action on shift {} owned by {}",
                user_id,
                shift_id,
                shift.owner_user_id
            );
            return Err(AppError::Forbidden(
                "You can only clock in or out of your own shifts".to_string(),
            ));
        }

        Ok(shift)
    }

    async fn ensure_location_exists(&self, location_id: Uuid) -> Result<(), AppError> {
        match self.locations.find_by_id(location_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation("Location not found".to_string())),
        }
    }
}

fn ensure_editable(shift: &Shift, now: &DateTime<Tz>, action: &str) -> Result<(), AppError> {
    let status = shift_clock::evaluate_status(shift, now);
    if status != ShiftStatus::Scheduled || shift.clock_in_time.is_some() {
        return Err(AppError::invalid_state(format!(
            "Only scheduled shifts that have not been clocked in can be {} (status: {})",
            action, status
        )));
    }
    Ok(())
}

fn ensure_not_empty(count: usize) -> Result<(), AppError> {
    if count == 0 {
        return Err(AppError::Validation(
            "Shifts array is required and must not be empty".to_string(),
        ));
    }
    Ok(())
}
