use sqlx::SqlitePool;

use super::parse_timestamp;
use crate::models::{sanitize, ExternalId, Review, ReviewUpdate};

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: String,
    name: String,
    rating: i64,
    comment: String,
    approved: bool,
    created_at: String,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ExternalId::new(row.id),
            name: row.name,
            rating: row.rating,
            comment: row.comment,
            approved: row.approved,
            created_at: parse_timestamp(&row.created_at),
        }
    }
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Approved reviews only, newest first. This is what the public site shows.
    pub async fn list_approved(&self) -> Result<Vec<Review>, sqlx::Error> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT * FROM reviews WHERE approved = 1 ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<Review>, sqlx::Error> {
        let rows: Vec<ReviewRow> =
            sqlx::query_as("SELECT * FROM reviews ORDER BY created_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(&self, review: &Review) -> Result<Review, sqlx::Error> {
        sqlx::query(
            "INSERT INTO reviews (id, name, rating, comment, approved, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(review.id.as_str())
        .bind(&review.name)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.approved)
        .bind(review.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(review.clone())
    }

    /// Moderation update. Replacement text is escaped the same way guest
    /// submissions are.
    pub async fn update(
        &self,
        id: &ExternalId,
        update: &ReviewUpdate,
    ) -> Result<Option<Review>, sqlx::Error> {
        let row: Option<ReviewRow> = sqlx::query_as(
            r#"
            UPDATE reviews
            SET approved = COALESCE(?, approved),
                rating = COALESCE(?, rating),
                comment = COALESCE(?, comment),
                name = COALESCE(?, name)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(update.approved)
        .bind(update.rating)
        .bind(update.comment.as_deref().map(sanitize))
        .bind(update.name.as_deref().map(sanitize))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: &ExternalId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_db;
    use crate::models::NewReview;

    fn submission(name: &str, comment: &str) -> Review {
        NewReview {
            name: Some(name.to_string()),
            rating: Some(4),
            comment: Some(comment.to_string()),
        }
        .into_review()
    }

    #[tokio::test]
    async fn test_new_reviews_are_hidden_until_approved() {
        let db = setup_db().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let review = repo.create(&submission("Nok", "Delicious")).await.unwrap();

        assert!(repo.list_approved().await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        let update = ReviewUpdate {
            approved: Some(true),
            ..Default::default()
        };
        let approved = repo.update(&review.id, &update).await.unwrap().unwrap();
        assert!(approved.approved);
        assert_eq!(approved.comment, "Delicious");

        let public = repo.list_approved().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, review.id);
    }

    #[tokio::test]
    async fn test_moderated_comment_is_escaped() {
        let db = setup_db().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let review = repo.create(&submission("Nok", "ok")).await.unwrap();
        let update = ReviewUpdate {
            comment: Some("<b>edited</b>".into()),
            ..Default::default()
        };
        let updated = repo.update(&review.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.comment, "&lt;b&gt;edited&lt;/b&gt;");
        assert_eq!(updated.rating, 4);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let db = setup_db().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let result = repo
            .update(&ExternalId::from(9), &ReviewUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
