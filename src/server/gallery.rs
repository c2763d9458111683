use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{AppState, Deleted};
use crate::error::{ApiError, StoreContext};
use crate::models::{ExternalId, GalleryImage, GalleryImageUpdate, NewGalleryImage};

#[derive(Serialize)]
pub struct GalleryResponse {
    images: Vec<GalleryImage>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<GalleryResponse>, ApiError> {
    let images = state.gallery.list().await.context("Failed to load gallery")?;
    Ok(Json(GalleryResponse { images }))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewGalleryImage>, JsonRejection>,
) -> Result<(StatusCode, Json<GalleryImage>), ApiError> {
    let Json(new_image) = payload?;
    let image = state
        .gallery
        .create(&new_image.into_image())
        .await
        .context("Failed to create gallery image")?;
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GalleryImageUpdate>, JsonRejection>,
) -> Result<Json<GalleryImage>, ApiError> {
    let Json(update) = payload?;
    state
        .gallery
        .update(&ExternalId::new(id), &update)
        .await
        .context("Failed to update gallery image")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state
        .gallery
        .delete(&ExternalId::new(id))
        .await
        .context("Failed to delete gallery image")?;
    Ok(Json(Deleted::new("Gallery image deleted")))
}
