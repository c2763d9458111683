use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, ExternalId};

/// Name used when a guest leaves the name field blank ("customer").
pub const ANONYMOUS_REVIEWER: &str = "ลูกค้า";

const DEFAULT_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ExternalId,
    pub name: String,
    pub rating: i64,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub approved: bool,
    #[serde(rename = "date", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Public review submission. Anything the guest sends about approval is
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReview {
    pub name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl NewReview {
    /// Builds an unapproved review with HTML-escaped free text.
    pub fn into_review(self) -> Review {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_REVIEWER.to_string());

        Review {
            id: ExternalId::generate(),
            name: sanitize(&name),
            rating: self.rating.unwrap_or(DEFAULT_RATING),
            comment: sanitize(self.comment.as_deref().unwrap_or_default()),
            approved: false,
            created_at: Utc::now(),
        }
    }
}

/// Admin moderation payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    pub approved: Option<bool>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub name: Option<String>,
}

/// Neutralizes markup so stored text renders as text.
pub fn sanitize(input: &str) -> String {
    html_escape::encode_text(input).into_owned()
}
