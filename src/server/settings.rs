use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::AppState;
use crate::error::{ApiError, StoreContext};
use crate::models::{SettingsUpdate, SiteSettings};

/// Public settings. The admin access code is never part of this document.
pub async fn get(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    let stored = state
        .settings
        .load()
        .await
        .context("Failed to load settings")?;
    Ok(Json(stored.public))
}

pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SiteSettings>, ApiError> {
    let Json(update) = payload?;
    let settings = state
        .settings
        .update(update)
        .await
        .context("Failed to update settings")?;
    Ok(Json(settings))
}
