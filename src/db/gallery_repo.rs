use sqlx::SqlitePool;

use crate::models::{ExternalId, GalleryImage, GalleryImageUpdate};

#[derive(Clone)]
pub struct GalleryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct GalleryRow {
    id: String,
    title: Option<String>,
    description: Option<String>,
    url: String,
    display_order: i64,
}

impl From<GalleryRow> for GalleryImage {
    fn from(row: GalleryRow) -> Self {
        GalleryImage {
            id: ExternalId::new(row.id),
            title: row.title,
            description: row.description,
            url: row.url,
            order: row.display_order,
        }
    }
}

impl GalleryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<GalleryImage>, sqlx::Error> {
        let rows: Vec<GalleryRow> =
            sqlx::query_as("SELECT * FROM gallery_images ORDER BY display_order ASC, rowid ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, image: &GalleryImage) -> Result<GalleryImage, sqlx::Error> {
        sqlx::query(
            "INSERT INTO gallery_images (id, title, description, url, display_order) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(image.id.as_str())
        .bind(&image.title)
        .bind(&image.description)
        .bind(&image.url)
        .bind(image.order)
        .execute(&self.pool)
        .await?;

        Ok(image.clone())
    }

    pub async fn update(
        &self,
        id: &ExternalId,
        update: &GalleryImageUpdate,
    ) -> Result<Option<GalleryImage>, sqlx::Error> {
        let row: Option<GalleryRow> = sqlx::query_as(
            r#"
            UPDATE gallery_images
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                url = COALESCE(?, url),
                display_order = COALESCE(?, display_order)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.url)
        .bind(update.order)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: &ExternalId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
