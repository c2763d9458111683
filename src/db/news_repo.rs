use sqlx::SqlitePool;

use super::parse_date;
use crate::models::{ExternalId, NewsArticle, NewsArticleUpdate};

#[derive(Clone)]
pub struct NewsRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct NewsRow {
    id: String,
    title: String,
    excerpt: Option<String>,
    content: Option<String>,
    image: Option<String>,
    publish_date: String,
    is_published: bool,
}

impl NewsRow {
    fn into_article(self) -> Result<NewsArticle, sqlx::Error> {
        Ok(NewsArticle {
            date: parse_date(&self.publish_date)?,
            id: ExternalId::new(self.id),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image: self.image,
            is_published: self.is_published,
        })
    }
}

impl NewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All articles, drafts included, most recent publish date first.
    pub async fn list(&self) -> Result<Vec<NewsArticle>, sqlx::Error> {
        let rows: Vec<NewsRow> =
            sqlx::query_as("SELECT * FROM news_articles ORDER BY publish_date DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(NewsRow::into_article).collect()
    }

    pub async fn create(&self, article: &NewsArticle) -> Result<NewsArticle, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO news_articles (id, title, excerpt, content, image, publish_date, is_published)
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
        .execute(&self.pool)
        .await?;

        Ok(article.clone())
    }

    pub async fn update(
        &self,
        id: &ExternalId,
        update: &NewsArticleUpdate,
    ) -> Result<Option<NewsArticle>, sqlx::Error> {
        let row: Option<NewsRow> = sqlx::query_as(
            r#"
            UPDATE news_articles
            SET title = COALESCE(?, title),
                excerpt = COALESCE(?, excerpt),
                content = COALESCE(?, content),
                image = COALESCE(?, image),
                publish_date = COALESCE(?, publish_date),
                is_published = COALESCE(?, is_published)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.excerpt)
        .bind(&update.content)
        .bind(&update.image)
        .bind(update.date.map(|d| d.to_string()))
        .bind(update.is_published)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(NewsRow::into_article).transpose()
    }

    pub async fn delete(&self, id: &ExternalId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM news_articles WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
