use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, ExternalId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: ExternalId,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Publish date.
    pub date: NaiveDate,
    #[serde(default = "default_published", deserialize_with = "nullable::or_true")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsArticle {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl NewNewsArticle {
    pub fn into_article(self) -> NewsArticle {
        NewsArticle {
            id: ExternalId::generate(),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image: self.image,
            date: self.date.unwrap_or_else(|| Utc::now().date_naive()),
            is_published: self.is_published.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticleUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub date: Option<NaiveDate>,
    pub is_published: Option<bool>,
}
