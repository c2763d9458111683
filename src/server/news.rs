use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{AppState, Deleted};
use crate::error::{ApiError, StoreContext};
use crate::models::{ExternalId, NewNewsArticle, NewsArticle, NewsArticleUpdate};

#[derive(Serialize)]
pub struct NewsResponse {
    articles: Vec<NewsArticle>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<NewsResponse>, ApiError> {
    let articles = state.news.list().await.context("Failed to load news")?;
    Ok(Json(NewsResponse { articles }))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewNewsArticle>, JsonRejection>,
) -> Result<(StatusCode, Json<NewsArticle>), ApiError> {
    let Json(new_article) = payload?;
    let article = state
        .news
        .create(&new_article.into_article())
        .await
        .context("Failed to create news article")?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewsArticleUpdate>, JsonRejection>,
) -> Result<Json<NewsArticle>, ApiError> {
    let Json(update) = payload?;
    state
        .news
        .update(&ExternalId::new(id), &update)
        .await
        .context("Failed to update news")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    state
        .news
        .delete(&ExternalId::new(id))
        .await
        .context("Failed to delete article")?;
    Ok(Json(Deleted::new("Article deleted")))
}
