use sqlx::SqlitePool;

use crate::models::{ExternalId, Menu, MenuCategory, MenuItem, MenuItemUpdate};

#[derive(Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    icon: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    name: String,
    category_id: Option<String>,
    price: i64,
    description: String,
    image: Option<String>,
    is_popular: bool,
    is_available: bool,
}

impl From<CategoryRow> for MenuCategory {
    fn from(row: CategoryRow) -> Self {
        MenuCategory {
            id: ExternalId::new(row.id),
            name: row.name,
            icon: row.icon,
        }
    }
}

impl From<ItemRow> for MenuItem {
    fn from(row: ItemRow) -> Self {
        MenuItem {
            id: ExternalId::new(row.id),
            name: row.name,
            category: row.category_id.map(ExternalId::new),
            price: row.price,
            description: row.description,
            image: row.image,
            is_popular: row.is_popular,
            is_available: row.is_available,
        }
    }
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Categories and items in insertion order, which after a sync is the
    /// order the POS sent them in.
    pub async fn menu(&self) -> Result<Menu, sqlx::Error> {
        let categories: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, icon FROM menu_categories ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        let items: Vec<ItemRow> = sqlx::query_as("SELECT * FROM menu_items ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(Menu {
            categories: categories.into_iter().map(Into::into).collect(),
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn get_item(&self, id: &ExternalId) -> Result<Option<MenuItem>, sqlx::Error> {
        let row: Option<ItemRow> = sqlx::query_as("SELECT * FROM menu_items WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn create_item(&self, item: &MenuItem) -> Result<MenuItem, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, category_id, price, description, image, is_popular, is_available)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.name)
        .bind(item.category.as_ref().map(ExternalId::as_str))
        .bind(item.price)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.is_popular)
        .bind(item.is_available)
        .execute(&self.pool)
        .await?;

        self.get_item(&item.id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Applies the provided fields in place. Returns `None` if no item has
    /// this id.
    pub async fn update_item(
        &self,
        id: &ExternalId,
        update: &MenuItemUpdate,
    ) -> Result<Option<MenuItem>, sqlx::Error> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            UPDATE menu_items
            SET name = COALESCE(?, name),
                category_id = COALESCE(?, category_id),
                price = COALESCE(?, price),
                description = COALESCE(?, description),
                image = COALESCE(?, image),
                is_popular = COALESCE(?, is_popular),
                is_available = COALESCE(?, is_available)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(update.category.as_ref().map(ExternalId::as_str))
        .bind(update.price)
        .bind(&update.description)
        .bind(&update.image)
        .bind(update.is_popular)
        .bind(update.is_available)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn delete_item(&self, id: &ExternalId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_items(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_db, TestDb};
    use crate::models::NewMenuItem;

    async fn setup_repo() -> (TestDb, MenuRepository) {
        let db = setup_db().await;
        let repo = MenuRepository::new(db.pool.clone());
        (db, repo)
    }

    fn new_item(json: &str) -> MenuItem {
        serde_json::from_str::<NewMenuItem>(json)
            .unwrap()
            .into_menu_item()
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let (_db, repo) = setup_repo().await;

        let item = new_item(
            r#"{"id": 10, "name": "Tom Yum", "category": "soup", "price": 120,
                "description": "Hot and sour", "isPopular": true}"#,
        );
        let created = repo.create_item(&item).await.unwrap();
        assert_eq!(created, item);

        let fetched = repo.get_item(&ExternalId::from(10)).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Tom Yum");
        assert_eq!(fetched.category, Some(ExternalId::from("soup")));
        assert!(fetched.is_popular);
        assert!(fetched.is_available);
    }

    #[tokio::test]
    async fn test_update_keeps_unspecified_fields() {
        let (_db, repo) = setup_repo().await;

        let item = new_item(r#"{"id": 1, "name": "Pad Thai", "price": 60, "description": "Classic"}"#);
        repo.create_item(&item).await.unwrap();

        let update = MenuItemUpdate {
            price: Some(75),
            ..Default::default()
        };
        let updated = repo
            .update_item(&ExternalId::from(1), &update)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 75);
        assert_eq!(updated.name, "Pad Thai");
        assert_eq!(updated.description, "Classic");
    }

    #[tokio::test]
    async fn test_update_missing_item_returns_none() {
        let (_db, repo) = setup_repo().await;

        let update = MenuItemUpdate {
            name: Some("Ghost".into()),
            ..Default::default()
        };
        let result = repo.update_item(&ExternalId::from(404), &update).await.unwrap();

        assert!(result.is_none());
        assert_eq!(repo.count_items().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_db, repo) = setup_repo().await;

        let item = new_item(r#"{"id": 1, "name": "Pad Thai"}"#);
        repo.create_item(&item).await.unwrap();

        repo.delete_item(&item.id).await.unwrap();
        repo.delete_item(&item.id).await.unwrap();

        assert!(repo.get_item(&item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_menu_lists_in_insertion_order() {
        let (_db, repo) = setup_repo().await;

        for (id, name) in [(30, "C"), (4, "A"), (100, "B")] {
            let item = MenuItem {
                id: ExternalId::from(id),
                ..new_item(&format!(r#"{{"name": "{}"}}"#, name))
            };
            repo.create_item(&item).await.unwrap();
        }

        let menu = repo.menu().await.unwrap();
        let names: Vec<&str> = menu.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert!(menu.categories.is_empty());
    }
}
