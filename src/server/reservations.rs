use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{AppState, Deleted};
use crate::error::{ApiError, StoreContext};
use crate::models::{ExternalId, NewReservation, Reservation, ReservationStatusUpdate};

#[derive(Serialize)]
pub struct ReservationsResponse {
    reservations: Vec<Reservation>,
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ReservationsResponse>, ApiError> {
    let reservations = state
        .reservations
        .list()
        .await
        .context("Failed to load reservations")?;
    Ok(Json(ReservationsResponse { reservations }))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewReservation>, JsonRejection>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let Json(booking) = payload?;
    let reservation = state
        .reservations
        .create(&booking.into_reservation())
        .await
        .context("Failed to create reservation")?;

    tracing::info!(
        "New reservation for {} guests on {} {}",
        reservation.guests,
        reservation.date,
        reservation.time
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Only the status can change after a booking is made.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReservationStatusUpdate>, JsonRejection>,
) -> Result<Json<Reservation>, ApiError> {
    let Json(update) = payload?;
    state
        .reservations
        .update_status(&ExternalId::new(id), update.status)
        .await
        .context("Failed to update reservation")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Reservation not found".into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state
        .reservations
        .delete(&ExternalId::new(id))
        .await
        .context("Failed to delete reservation")?;
    Ok(Json(Deleted::new("Reservation deleted")))
}
