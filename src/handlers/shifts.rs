use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Location, Shift, ShiftInput, ShiftUpdateItem};
use crate::error::AppError;
use crate::handlers::shared::{parse_id, ApiResponse};
use crate::services::auth::Claims;
use crate::services::shift_clock::{format_duration, ShiftView};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub shifts: Option<Vec<ShiftInput>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub shifts: Option<Vec<ShiftUpdateItem>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BulkSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub results: Vec<BulkItemResult>,
    pub summary: BulkSummary,
}

impl BulkResponse {
    fn from_results(results: Vec<BulkItemResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        let summary = BulkSummary {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        };
        Self { results, summary }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutResponse {
    #[serde(flatten)]
    pub shift: ShiftView,
    pub minutes_worked: i64,
    pub worked: String,
}

// GET /api/shifts?userId=
pub async fn get_shifts(
    state: web::Data<AppState>,
    claims: Claims,
    query: web::Query<ShiftsQuery>,
) -> Result<HttpResponse, AppError> {
    let raw = query
        .user_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId query parameter is required".to_string()))?;
    let user_id = parse_id("user", raw)?;

    if user_id != claims.user_id() {
        return Err(AppError::Forbidden(
            "You can only list your own shifts".to_string(),
        ));
    }

    let now = state.clock.now();
    let locations = locations_by_id(&state).await?;
    let shifts: Vec<ShiftView> = state
        .shift_service
        .list_shifts(user_id)
        .await?
        .into_iter()
        .map(|shift| {
            let location = locations.get(&shift.location_id).cloned();
            ShiftView::at(shift, &now).with_location(location)
        })
        .collect();

    Ok(ApiResponse::ok(shifts))
}

// POST /api/shifts
pub async fn create_shift(
    state: web::Data<AppState>,
    claims: Claims,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    let now = state.clock.now();
    let shift = state
        .shift_service
        .create_shift(claims.user_id(), input.into_inner(), &now)
        .await?;

    Ok(ApiResponse::created(
        present(&state, shift, &now).await?,
        "Shift created successfully",
    ))
}

pub async fn get_shift(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    let shift = state
        .shift_service
        .get_shift(shift_id, claims.user_id())
        .await?;

    Ok(ApiResponse::ok(present(&state, shift, &now).await?))
}

pub async fn update_shift(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    let shift = state
        .shift_service
        .update_shift(shift_id, claims.user_id(), &input, &now)
        .await?;

    Ok(ApiResponse::ok_with_message(
        present(&state, shift, &now).await?,
        "Shift updated successfully",
    ))
}

pub async fn delete_shift(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    state
        .shift_service
        .delete_shift(shift_id, claims.user_id(), &now)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Shift deleted successfully",
    )))
}

pub async fn get_clock_window(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    let window = state
        .shift_service
        .clock_window(shift_id, claims.user_id(), &now)
        .await?;

    Ok(ApiResponse::ok(window))
}

pub async fn clock_in(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    let shift = state
        .shift_service
        .clock_in(shift_id, claims.user_id(), &now)
        .await?;

    Ok(ApiResponse::ok_with_message(
        present(&state, shift, &now).await?,
        "Clocked in successfully",
    ))
}

pub async fn clock_out(
    state: web::Data<AppState>,
    claims: Claims,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shift_id = parse_id("shift", &path)?;
    let now = state.clock.now();
    let outcome = state
        .shift_service
        .clock_out(shift_id, claims.user_id(), &now)
        .await?;

    let worked = format_duration(outcome.minutes_worked);
    let message = format!("Clocked out successfully. Worked {}", worked);

    Ok(ApiResponse::ok_with_message(
        ClockOutResponse {
            shift: present(&state, outcome.shift, &now).await?,
            minutes_worked: outcome.minutes_worked,
            worked,
        },
        &message,
    ))
}

// POST /api/shifts/batch
pub async fn bulk_create_shifts(
    state: web::Data<AppState>,
    claims: Claims,
    body: web::Json<BulkCreateRequest>,
) -> Result<HttpResponse, AppError> {
    let inputs = body.into_inner().shifts.unwrap_or_default();
    let now = state.clock.now();
    let outcomes = state
        .shift_service
        .bulk_create(claims.user_id(), inputs, &now)
        .await?;
    let locations = locations_by_id(&state).await?;

    let results = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| item_result(Some(index), None, outcome, &now, &locations))
        .collect();
    let response = BulkResponse::from_results(results);
    let message = format!(
        "{} of {} shifts created",
        response.summary.successful, response.summary.total
    );

    Ok(ApiResponse::ok_with_message(response, &message))
}

// PUT /api/shifts/batch
pub async fn bulk_update_shifts(
    state: web::Data<AppState>,
    claims: Claims,
    body: web::Json<BulkUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let items = body.into_inner().shifts.unwrap_or_default();
    let ids: Vec<Option<String>> = items.iter().map(|item| item.id.clone()).collect();
    let now = state.clock.now();
    let outcomes = state
        .shift_service
        .bulk_update(claims.user_id(), items, &now)
        .await?;
    let locations = locations_by_id(&state).await?;

    let results = ids
        .into_iter()
        .zip(outcomes)
        .map(|(id, outcome)| item_result(None, id, outcome, &now, &locations))
        .collect();
    let response = BulkResponse::from_results(results);
    let message = format!(
        "{} of {} shifts updated",
        response.summary.successful, response.summary.total
    );

    Ok(ApiResponse::ok_with_message(response, &message))
}

// Evaluates the shift at `now` and embeds its location.
async fn present(
    state: &AppState,
    shift: Shift,
    now: &DateTime<Tz>,
) -> Result<ShiftView, AppError> {
    let location = state.locations.find_by_id(shift.location_id).await?;
    Ok(ShiftView::at(shift, now).with_location(location))
}

async fn locations_by_id(state: &AppState) -> Result<HashMap<Uuid, Location>, AppError> {
    let locations = state.locations.list_all().await?;
    Ok(locations
        .into_iter()
        .map(|location| (location.id, location))
        .collect())
}

fn item_result(
    index: Option<usize>,
    id: Option<String>,
    outcome: Result<Shift, AppError>,
    now: &DateTime<Tz>,
    locations: &HashMap<Uuid, Location>,
) -> BulkItemResult {
    match outcome {
        Ok(shift) => {
            let location = locations.get(&shift.location_id).cloned();
            BulkItemResult {
                index,
                id,
                success: true,
                shift: Some(ShiftView::at(shift, now).with_location(location)),
                error: None,
            }
        }
        Err(e) => BulkItemResult {
            index,
            id,
            success: false,
            shift: None,
            error: Some(e.to_string()),
        },
    }
}
