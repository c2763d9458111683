use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{AppState, Deleted};
use crate::error::{ApiError, StoreContext};
use crate::models::{ExternalId, NewReview, Review, ReviewUpdate};

#[derive(Serialize)]
pub struct SubmittedReview {
    message: &'static str,
    review: Review,
}

/// Approved reviews for the public site.
pub async fn list_approved(State(state): State<AppState>) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state
        .reviews
        .list_approved()
        .await
        .context("Failed to load reviews")?;
    Ok(Json(reviews))
}

/// Every review, including those awaiting moderation.
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state
        .reviews
        .list_all()
        .await
        .context("Failed to load reviews")?;
    Ok(Json(reviews))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmittedReview>), ApiError> {
    let Json(submission) = payload?;
    let review = state
        .reviews
        .create(&submission.into_review())
        .await
        .context("Failed to submit review")?;

    Ok((
        StatusCode::CREATED,
        Json(SubmittedReview {
            message: "Review submitted",
            review,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReviewUpdate>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let Json(update) = payload?;
    state
        .reviews
        .update(&ExternalId::new(id), &update)
        .await
        .context("Failed to update review")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Review not found".into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state
        .reviews
        .delete(&ExternalId::new(id))
        .await
        .context("Failed to delete review")?;
    Ok(Json(Deleted::new("Review deleted")))
}
