//! POS menu sync endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::error::{ApiError, StoreContext};
use crate::models::MenuSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    success: bool,
    message: &'static str,
    items_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    status: &'static str,
    items_count: i64,
    last_modified: Option<DateTime<Utc>>,
}

/// Replaces the whole menu with the pushed snapshot. The credential is
/// checked before the body is looked at, and nothing is written unless both
/// lists are present.
pub async fn sync_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<MenuSnapshot>, JsonRejection>,
) -> Result<Json<SyncResponse>, ApiError> {
    state.credentials.check_sync(&headers)?;

    let invalid = || ApiError::Validation("Invalid payload".into());
    let Json(snapshot) = payload.map_err(|_| invalid())?;
    let (Some(categories), Some(items)) = (snapshot.categories, snapshot.items) else {
        return Err(invalid());
    };

    let outcome = state
        .menu_sync
        .replace(&categories, &items)
        .await
        .context("Failed to sync menu")?;

    tracing::info!(
        "Menu synced: {} categories, {} items ({} descriptions preserved)",
        outcome.categories,
        outcome.items,
        outcome.preserved_descriptions
    );

    Ok(Json(SyncResponse {
        success: true,
        message: "Menu synced successfully",
        items_count: items.len(),
    }))
}

pub async fn sync_status(State(state): State<AppState>) -> Result<Json<SyncStatus>, ApiError> {
    let items_count = state
        .menu
        .count_items()
        .await
        .context("Failed to read sync status")?;
    let last_modified = state
        .menu_sync
        .last_synced_at()
        .await
        .context("Failed to read sync status")?;

    Ok(Json(SyncStatus {
        status: "ready",
        items_count,
        last_modified,
    }))
}
