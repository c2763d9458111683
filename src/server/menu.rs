use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{AppState, Deleted};
use crate::error::{ApiError, StoreContext};
use crate::models::{ExternalId, Menu, MenuItem, MenuItemUpdate, NewMenuItem};

pub async fn list(State(state): State<AppState>) -> Result<Json<Menu>, ApiError> {
    let menu = state.menu.menu().await.context("Failed to load menu")?;
    Ok(Json(menu))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewMenuItem>, JsonRejection>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    let Json(new_item) = payload?;
    let item = state
        .menu
        .create_item(&new_item.into_menu_item())
        .await
        .context("Failed to create menu item")?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MenuItemUpdate>, JsonRejection>,
) -> Result<Json<MenuItem>, ApiError> {
    let Json(update) = payload?;
    state
        .menu
        .update_item(&ExternalId::new(id), &update)
        .await
        .context("Failed to update menu item")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Menu item not found".into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state
        .menu
        .delete_item(&ExternalId::new(id))
        .await
        .context("Failed to delete menu item")?;
    Ok(Json(Deleted::new("Menu item deleted")))
}
