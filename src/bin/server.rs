//! Krua Tayai web server
//!
//! Serves the restaurant site's JSON API and the single-page front-end.
//!
//! # Configuration
//!
//! Environment variables (override the config file):
//! - `KRUA_PORT`: Port to listen on (default: 3000)
//! - `KRUA_DATABASE_PATH`: SQLite database file
//! - `KRUA_STATIC_DIR`: Directory with the built front-end (default: public)
//! - `KRUA_ADMIN_SECRET`: Bearer token for admin routes
//! - `KRUA_SYNC_SECRET`: Value the POS sends in `x-sync-secret`
//! - `KRUA_CONFIG`: Path to config file (default: ~/.config/kruatayai/config.yaml)
//!
//! # Config File Format
//!
//! ```yaml
//! database_path: /var/lib/kruatayai/site.db
//! port: 3000
//! static_dir: /srv/kruatayai/public
//! admin_secret: "change-me"
//! sync_secret: "pos-shared-secret"
//! rate_limit:
//!   max_requests: 100
//!   window_secs: 900
//! ```

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kruatayai::config::Config;
use kruatayai::db::init_db;
use kruatayai::server::{build_router, AppState, Credentials};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kruatayai=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(None)?;

    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }
    tracing::info!("Database: {}", config.database_path.value.display());
    tracing::info!("Static files: {}", config.static_dir.value.display());

    if config.admin_secret.value.is_none() {
        tracing::warn!("No admin secret configured - all admin requests will be rejected");
    }
    if config.sync_secret.value.is_none() {
        tracing::warn!("No sync secret configured - all POS sync requests will be rejected");
    }

    let pool = init_db(&config.database_path.value).await?;

    let credentials = Credentials::new(
        config.admin_secret.value.clone(),
        config.sync_secret.value.clone(),
    );
    let state = AppState::new(pool, credentials, &config.rate_limit);
    let app = build_router(state, &config.static_dir.value);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
