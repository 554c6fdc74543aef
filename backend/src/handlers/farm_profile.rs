//! HTTP handlers for the farm profile

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::farm_profile::{FarmProfile, SaveFarmProfileInput};
use crate::services::FarmProfileService;
use crate::AppState;

/// Get the current user's farm profile
pub async fn get_farm_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<FarmProfile>> {
    let service = FarmProfileService::new(state.db);
    let profile = service.get(current_user.0.user_id).await?;
    Ok(Json(profile))
}

/// Create or replace the current user's farm profile
pub async fn save_farm_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SaveFarmProfileInput>,
) -> AppResult<Json<FarmProfile>> {
    let service = FarmProfileService::new(state.db);
    let profile = service.save(current_user.0.user_id, input).await?;
    Ok(Json(profile))
}
