//! HTTP surface: public content API, admin routes, POS sync and the
//! single-page app fallback.

mod auth;
mod gallery;
mod menu;
mod news;
mod rate_limit;
mod reservations;
mod reviews;
mod settings;
mod sync;

pub use auth::{Credentials, SYNC_SECRET_HEADER};
pub use rate_limit::ApiRateLimiter;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::RateLimitConfig;
use crate::db::{
    GalleryRepository, MenuRepository, MenuSync, NewsRepository, ReservationRepository,
    ReviewRepository, SettingsRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub menu: MenuRepository,
    pub menu_sync: MenuSync,
    pub gallery: GalleryRepository,
    pub reservations: ReservationRepository,
    pub news: NewsRepository,
    pub reviews: ReviewRepository,
    pub settings: SettingsRepository,
    pub credentials: Arc<Credentials>,
    pub limiter: Arc<ApiRateLimiter>,
}

impl AppState {
    pub fn new(pool: SqlitePool, credentials: Credentials, limits: &RateLimitConfig) -> Self {
        Self {
            menu: MenuRepository::new(pool.clone()),
            menu_sync: MenuSync::new(pool.clone()),
            gallery: GalleryRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            news: NewsRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
            credentials: Arc::new(credentials),
            limiter: Arc::new(ApiRateLimiter::new(limits)),
        }
    }
}

/// Body returned by every delete, whether or not the row existed.
#[derive(Debug, Serialize)]
pub struct Deleted {
    message: &'static str,
}

impl Deleted {
    fn new(message: &'static str) -> Self {
        Self { message }
    }
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/api/menu", get(menu::list))
        .route("/api/gallery", get(gallery::list))
        .route("/api/reservations", post(reservations::create))
        .route("/api/news", get(news::list))
        .route("/api/reviews", get(reviews::list_approved).post(reviews::create))
        .route("/api/settings", get(settings::get))
        .route("/api/sync-menu", post(sync::sync_menu))
        .route("/api/sync-status", get(sync::sync_status));

    // Admin routes (bearer token required)
    let admin_routes = Router::new()
        .route("/api/menu", post(menu::create))
        .route("/api/menu/{id}", put(menu::update).delete(menu::delete))
        .route("/api/gallery", post(gallery::create))
        .route(
            "/api/gallery/{id}",
            put(gallery::update).delete(gallery::delete),
        )
        .route("/api/reservations", get(reservations::list))
        .route(
            "/api/reservations/{id}",
            put(reservations::update).delete(reservations::delete),
        )
        .route("/api/news", post(news::create))
        .route("/api/news/{id}", put(news::update).delete(news::delete))
        .route("/api/reviews/all", get(reviews::list_all))
        .route(
            "/api/reviews/{id}",
            put(reviews::update).delete(reviews::delete),
        )
        .route("/api/settings", put(settings::update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let api = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ));

    // Anything that is not an API route or a static asset gets the app shell
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(api)
        .fallback_service(spa)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
