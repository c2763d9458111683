use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::error::ApiError;

pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

/// Shared secrets for the two credentialed surfaces. An unset secret
/// matches nothing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub admin_secret: Option<String>,
    pub sync_secret: Option<String>,
}

impl Credentials {
    pub fn new(admin_secret: Option<String>, sync_secret: Option<String>) -> Self {
        Self {
            admin_secret,
            sync_secret,
        }
    }

    /// `Authorization: Bearer <admin secret>`, compared exactly.
    pub fn check_admin(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        match (token, self.admin_secret.as_deref()) {
            (Some(token), Some(secret)) if token == secret => Ok(()),
            _ => Err(ApiError::Unauthorized("Unauthorized: Admin access required")),
        }
    }

    pub fn check_sync(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let provided = headers
            .get(SYNC_SECRET_HEADER)
            .map(|h| h.as_bytes());

        match (provided, self.sync_secret.as_deref()) {
            (Some(provided), Some(secret)) if provided == secret.as_bytes() => Ok(()),
            _ => Err(ApiError::Unauthorized("Unauthorized")),
        }
    }
}

/// Rejects the request before it reaches an admin handler unless it
/// carries the admin bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.credentials.check_admin(request.headers())?;
    Ok(next.run(request).await)
}
