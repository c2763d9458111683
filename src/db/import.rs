//! One-shot import of the legacy JSON data files into the store.
//!
//! Each file is optional. Rows that already exist are left alone, settings
//! keys are overwritten, and the whole import commits or rolls back as one
//! transaction.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings_repo;
use crate::models::{GalleryImage, MenuCategory, MenuItem, NewsArticle, Reservation, Review};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Data directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Import failed, nothing was written: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct MenuFile {
    categories: Vec<MenuCategory>,
    items: Vec<MenuItem>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct GalleryFile {
    images: Vec<GalleryImage>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ReservationsFile {
    reservations: Vec<Reservation>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct NewsFile {
    articles: Vec<NewsArticle>,
}

/// Rows inserted per table. Rows skipped because they already existed are
/// not counted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub categories: u64,
    pub items: u64,
    pub gallery_images: u64,
    pub reservations: u64,
    pub news_articles: u64,
    pub reviews: u64,
    pub settings: u64,
    pub skipped_files: Vec<String>,
    /// Settings keys left out because their value has the wrong shape.
    pub skipped_settings: Vec<String>,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Menu categories: {}", self.categories)?;
        writeln!(f, "Menu items:      {}", self.items)?;
        writeln!(f, "Gallery images:  {}", self.gallery_images)?;
        writeln!(f, "Reservations:    {}", self.reservations)?;
        writeln!(f, "News articles:   {}", self.news_articles)?;
        writeln!(f, "Reviews:         {}", self.reviews)?;
        write!(f, "Settings keys:   {}", self.settings)?;
        if !self.skipped_files.is_empty() {
            write!(f, "\nSkipped:         {}", self.skipped_files.join(", "))?;
        }
        if !self.skipped_settings.is_empty() {
            write!(
                f,
                "\nSkipped settings: {}",
                self.skipped_settings.join(", ")
            )?;
        }
        Ok(())
    }
}

pub struct DataImporter {
    pool: SqlitePool,
}

impl DataImporter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn import_dir(&self, dir: &Path) -> Result<ImportReport, ImportError> {
        if !dir.is_dir() {
            return Err(ImportError::MissingDirectory(dir.to_path_buf()));
        }

        let mut report = ImportReport::default();

        let menu: Option<MenuFile> = read_json(dir, "menu.json", &mut report).await;
        let gallery: Option<GalleryFile> = read_json(dir, "gallery.json", &mut report).await;
        let reservations: Option<ReservationsFile> =
            read_json(dir, "reservations.json", &mut report).await;
        let news: Option<NewsFile> = read_json(dir, "news.json", &mut report).await;
        let reviews: Option<Vec<Review>> = read_json(dir, "reviews.json", &mut report).await;
        let settings: Option<Map<String, Value>> =
            read_json(dir, "settings.json", &mut report).await;

        let mut tx = self.pool.begin().await?;

        if let Some(menu) = menu {
            for category in &menu.categories {
                report.categories += insert_category(&mut tx, category).await?;
            }
            for item in &menu.items {
                report.items += insert_item(&mut tx, item).await?;
            }
        }

        if let Some(gallery) = gallery {
            for image in &gallery.images {
                report.gallery_images += insert_gallery_image(&mut tx, image).await?;
            }
        }

        if let Some(file) = reservations {
            for reservation in &file.reservations {
                report.reservations += insert_reservation(&mut tx, reservation).await?;
            }
        }

        if let Some(news) = news {
            for article in &news.articles {
                report.news_articles += insert_article(&mut tx, article).await?;
            }
        }

        for review in reviews.iter().flatten() {
            report.reviews += insert_review(&mut tx, review).await?;
        }

        for (key, value) in settings.iter().flatten() {
            if let Err(e) = settings_repo::check_section(key, value) {
                tracing::warn!("Skipping setting '{}' from settings.json: {}", key, e);
                report.skipped_settings.push(key.clone());
                continue;
            }
            settings_repo::upsert(&mut tx, key, value).await?;
            report.settings += 1;
        }

        tx.commit().await?;

        tracing::info!(
            "Imported {} items, {} gallery images, {} reservations, {} articles, {} reviews",
            report.items,
            report.gallery_images,
            report.reservations,
            report.news_articles,
            report.reviews
        );

        Ok(report)
    }
}

async fn read_json<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    report: &mut ImportReport,
) -> Option<T> {
    let path = dir.join(file);

    let parsed = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Could not read {}, skipping: {}", path.display(), e);
            report.skipped_files.push(file.to_string());
            None
        }
    }
}

async fn insert_category(
    conn: &mut SqliteConnection,
    category: &MenuCategory,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO menu_categories (id, name, icon) VALUES (?, ?, ?)")
            .bind(category.id.as_str())
            .bind(&category.name)
            .bind(&category.icon)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

async fn insert_item(conn: &mut SqliteConnection, item: &MenuItem) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO menu_items (id, name, category_id, price, description, image, is_popular, is_available)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id.as_str())
    .bind(&item.name)
    .bind(item.category.as_ref().map(|c| c.as_str()))
    .bind(item.price)
    .bind(&item.description)
    .bind(&item.image)
    .bind(item.is_popular)
    .bind(item.is_available)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_gallery_image(
    conn: &mut SqliteConnection,
    image: &GalleryImage,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO gallery_images (id, title, description, url, display_order) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(image.id.as_str())
    .bind(&image.title)
    .bind(&image.description)
    .bind(&image.url)
    .bind(image.order)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_reservation(
    conn: &mut SqliteConnection,
    r: &Reservation,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO reservations (id, name, phone, email, reservation_date, reservation_time, guests, notes, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(r.id.as_str())
    .bind(&r.name)
    .bind(&r.phone)
    .bind(&r.email)
    .bind(r.date.to_string())
    .bind(&r.time)
    .bind(r.guests)
    .bind(&r.notes)
    .bind(r.status.to_string())
    .bind(r.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_article(
    conn: &mut SqliteConnection,
    article: &NewsArticle,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO news_articles (id, title, excerpt, content, image, publish_date, is_published)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(article.id.as_str())
    .bind(&article.title)
    .bind(&article.excerpt)
    .bind(&article.content)
    .bind(&article.image)
    .bind(article.date.to_string())
    .bind(article.is_published)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

async fn insert_review(conn: &mut SqliteConnection, review: &Review) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO reviews (id, name, rating, comment, approved, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(review.id.as_str())
    .bind(&review.name)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.approved)
    .bind(review.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
