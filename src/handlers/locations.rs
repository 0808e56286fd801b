use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::AppState;

// GET /api/locations
pub async fn get_locations(
    state: web::Data<AppState>,
    _claims: Claims,
) -> Result<HttpResponse, AppError> {
    let locations = state.locations.list_all().await?;

    Ok(ApiResponse::ok(locations))
}
