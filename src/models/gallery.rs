use serde::{Deserialize, Serialize};

use super::{nullable, ExternalId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: ExternalId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    /// Display position, ascending.
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGalleryImage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub order: Option<i64>,
}

impl NewGalleryImage {
    pub fn into_image(self) -> GalleryImage {
        GalleryImage {
            id: ExternalId::generate(),
            title: self.title,
            description: self.description,
            url: self.url,
            order: self.order.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub order: Option<i64>,
}
