//! Full-replace menu synchronization.
//!
//! The POS pushes a complete snapshot of categories and items. Inside a
//! single transaction the current menu is deleted and the snapshot inserted,
//! except that item descriptions curated on the website are carried over.
//! Syncs are serialized through an async mutex so two snapshots can never
//! interleave their delete and insert phases.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::parse_timestamp;
use crate::models::{ExternalId, MenuCategory, SyncItem};

/// Result of a committed sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub categories: usize,
    pub items: usize,
    /// Items whose curated description survived the sync.
    pub preserved_descriptions: usize,
    pub synced_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MenuSync {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

/// Non-empty descriptions present before the sync, keyed by normalized id.
struct CuratedDescriptions(HashMap<ExternalId, String>);

impl CuratedDescriptions {
    fn from_rows(rows: Vec<(String, Option<String>)>) -> Self {
        let map = rows
            .into_iter()
            .filter_map(|(id, description)| match description {
                Some(d) if !d.is_empty() => Some((ExternalId::new(id), d)),
                _ => None,
            })
            .collect();
        Self(map)
    }

    /// Curated text wins; otherwise the POS description, or empty.
    fn resolve(&self, item: &SyncItem) -> (String, bool) {
        match self.0.get(&item.id) {
            Some(curated) => (curated.clone(), true),
            None => (item.description.clone().unwrap_or_default(), false),
        }
    }
}

impl MenuSync {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Replaces the whole menu with the snapshot. On any error the
    /// transaction is rolled back and the previous menu is left intact.
    pub async fn replace(
        &self,
        categories: &[MenuCategory],
        items: &[SyncItem],
    ) -> Result<SyncOutcome, sqlx::Error> {
        let _guard = self.writer.lock().await;

        let mut tx = self.pool.begin().await?;

        match Self::apply(&mut *tx, categories, items).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Menu sync rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn apply(
        conn: &mut SqliteConnection,
        categories: &[MenuCategory],
        items: &[SyncItem],
    ) -> Result<SyncOutcome, sqlx::Error> {
        let existing: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT id, description FROM menu_items")
                .fetch_all(&mut *conn)
                .await?;
        let curated = CuratedDescriptions::from_rows(existing);

        // Items first, categories second
        sqlx::query("DELETE FROM menu_items")
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM menu_categories")
            .execute(&mut *conn)
            .await?;

        for category in categories {
            sqlx::query("INSERT OR REPLACE INTO menu_categories (id, name, icon) VALUES (?, ?, ?)")
                .bind(category.id.as_str())
                .bind(&category.name)
                .bind(&category.icon)
                .execute(&mut *conn)
                .await?;
        }

        let mut preserved = 0;
        for item in items {
            let (description, was_curated) = curated.resolve(item);
            if was_curated {
                preserved += 1;
            }

            // Duplicate ids in one snapshot: the later entry wins
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO menu_items (id, name, category_id, price, description, image, is_popular, is_available)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id.as_str())
            .bind(&item.name)
            .bind(item.category().map(ExternalId::as_str))
            .bind(item.price.unwrap_or(0))
            .bind(&description)
            .bind(&item.image)
            .bind(item.is_popular.unwrap_or(false))
            .bind(item.is_available.unwrap_or(true))
            .execute(&mut *conn)
            .await?;
        }

        let synced_at = Utc::now();
        sqlx::query(
            "INSERT INTO menu_sync_runs (synced_at, categories_count, items_count) VALUES (?, ?, ?)",
        )
        .bind(synced_at.to_rfc3339())
        .bind(categories.len() as i64)
        .bind(items.len() as i64)
        .execute(&mut *conn)
        .await?;

        Ok(SyncOutcome {
            categories: categories.len(),
            items: items.len(),
            preserved_descriptions: preserved,
            synced_at,
        })
    }

    /// Time of the last committed sync, if any.
    pub async fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT synced_at FROM menu_sync_runs ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(ts,)| parse_timestamp(&ts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_db, TestDb};
    use crate::db::MenuRepository;
    use crate::models::{Menu, MenuItemUpdate, NewMenuItem};

    struct TestContext {
        sync: MenuSync,
        menu: MenuRepository,
        _db: TestDb,
    }

    async fn setup() -> TestContext {
        let db = setup_db().await;
        TestContext {
            sync: MenuSync::new(db.pool.clone()),
            menu: MenuRepository::new(db.pool.clone()),
            _db: db,
        }
    }

    fn category(id: &str, name: &str) -> MenuCategory {
        MenuCategory {
            id: ExternalId::from(id),
            name: name.to_string(),
            icon: Some("🍜".to_string()),
        }
    }

    async fn seed_item(ctx: &TestContext, id: i64, description: &str) {
        let new: NewMenuItem = serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Item {}", id),
            "description": description,
        }))
        .unwrap();
        ctx.menu.create_item(&new.into_menu_item()).await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_into_empty_store() {
        let ctx = setup().await;

        let items = vec![serde_json::from_str::<SyncItem>(
            r#"{"id": 1, "name": "Pad Thai", "category_id": "c1", "price": 60, "is_available": true}"#,
        )
        .unwrap()];

        let outcome = ctx
            .sync
            .replace(&[category("c1", "Main")], &items)
            .await
            .unwrap();
        assert_eq!(outcome.items, 1);
        assert_eq!(outcome.categories, 1);
        assert_eq!(outcome.preserved_descriptions, 0);

        let menu = ctx.menu.menu().await.unwrap();
        assert_eq!(menu.categories, vec![category("c1", "Main")]);
        assert_eq!(menu.items.len(), 1);

        let item = &menu.items[0];
        assert_eq!(item.id, ExternalId::from(1));
        assert_eq!(item.name, "Pad Thai");
        assert_eq!(item.category, Some(ExternalId::from("c1")));
        assert_eq!(item.price, 60);
        assert_eq!(item.description, "");
        assert!(!item.is_popular);
        assert!(item.is_available);
    }

    #[tokio::test]
    async fn test_curated_description_survives_sync() {
        let ctx = setup().await;
        seed_item(&ctx, 1, "Grandma's recipe").await;

        let items = vec![SyncItem::new(1, "Pad Thai").with_price(65)];
        let outcome = ctx.sync.replace(&[], &items).await.unwrap();
        assert_eq!(outcome.preserved_descriptions, 1);

        let item = ctx.menu.get_item(&ExternalId::from(1)).await.unwrap().unwrap();
        assert_eq!(item.description, "Grandma's recipe");
        assert_eq!(item.price, 65);
        assert_eq!(item.name, "Pad Thai");
    }

    #[tokio::test]
    async fn test_curated_description_beats_incoming_description() {
        let ctx = setup().await;
        seed_item(&ctx, 1, "Grandma's recipe").await;

        let items = vec![SyncItem::new(1, "Pad Thai").with_description("POS text")];
        ctx.sync.replace(&[], &items).await.unwrap();

        let item = ctx.menu.get_item(&ExternalId::from(1)).await.unwrap().unwrap();
        assert_eq!(item.description, "Grandma's recipe");
    }

    #[tokio::test]
    async fn test_empty_description_is_not_curated() {
        let ctx = setup().await;
        seed_item(&ctx, 1, "").await;

        let items = vec![
            SyncItem::new(1, "Pad Thai").with_description("From POS"),
            SyncItem::new(2, "Som Tum"),
        ];
        ctx.sync.replace(&[], &items).await.unwrap();

        let menu = ctx.menu.menu().await.unwrap();
        assert_eq!(menu.items[0].description, "From POS");
        assert_eq!(menu.items[1].description, "");
    }

    #[tokio::test]
    async fn test_string_and_numeric_ids_match() {
        let ctx = setup().await;
        seed_item(&ctx, 7, "Curated").await;

        let items: Vec<SyncItem> =
            serde_json::from_str(r#"[{"id": "7", "name": "Khao Soi"}]"#).unwrap();
        ctx.sync.replace(&[], &items).await.unwrap();

        let item = ctx.menu.get_item(&ExternalId::from(7)).await.unwrap().unwrap();
        assert_eq!(item.description, "Curated");
    }

    #[tokio::test]
    async fn test_description_edited_between_syncs_is_kept() {
        let ctx = setup().await;

        let items = vec![SyncItem::new(1, "Pad Thai").with_description("POS v1")];
        ctx.sync.replace(&[], &items).await.unwrap();

        let edit = MenuItemUpdate {
            description: Some("Edited by admin".into()),
            ..Default::default()
        };
        ctx.menu
            .update_item(&ExternalId::from(1), &edit)
            .await
            .unwrap()
            .unwrap();

        let items = vec![SyncItem::new(1, "Pad Thai").with_description("POS v2")];
        ctx.sync.replace(&[], &items).await.unwrap();

        let item = ctx.menu.get_item(&ExternalId::from(1)).await.unwrap().unwrap();
        assert_eq!(item.description, "Edited by admin");
    }

    #[tokio::test]
    async fn test_sync_replaces_everything() {
        let ctx = setup().await;

        ctx.sync
            .replace(
                &[category("c1", "Main"), category("c2", "Drinks")],
                &[SyncItem::new(1, "A"), SyncItem::new(2, "B")],
            )
            .await
            .unwrap();

        ctx.sync
            .replace(&[category("c3", "Dessert")], &[SyncItem::new(3, "C")])
            .await
            .unwrap();

        let menu = ctx.menu.menu().await.unwrap();
        assert_eq!(menu.categories.len(), 1);
        assert_eq!(menu.categories[0].id, ExternalId::from("c3"));
        assert_eq!(menu.items.len(), 1);
        assert_eq!(menu.items[0].id, ExternalId::from(3));
    }

    #[tokio::test]
    async fn test_empty_snapshot_clears_menu() {
        let ctx = setup().await;
        seed_item(&ctx, 1, "Curated").await;

        let outcome = ctx.sync.replace(&[], &[]).await.unwrap();
        assert_eq!(outcome.items, 0);
        assert_eq!(ctx.menu.menu().await.unwrap(), Menu::default());
    }

    #[tokio::test]
    async fn test_duplicate_ids_last_wins() {
        let ctx = setup().await;

        let items = vec![
            SyncItem::new(1, "First").with_price(10),
            SyncItem::new(1, "Second").with_price(20),
        ];
        ctx.sync.replace(&[], &items).await.unwrap();

        let menu = ctx.menu.menu().await.unwrap();
        assert_eq!(menu.items.len(), 1);
        assert_eq!(menu.items[0].name, "Second");
        assert_eq!(menu.items[0].price, 20);
    }

    #[tokio::test]
    async fn test_failure_mid_transaction_rolls_back() {
        let ctx = setup().await;

        ctx.sync
            .replace(
                &[category("c1", "Main")],
                &[SyncItem::new(1, "Pad Thai").with_category("c1")],
            )
            .await
            .unwrap();
        let before = ctx.menu.menu().await.unwrap();
        let last_sync = ctx.sync.last_synced_at().await.unwrap();

        // Categories insert fine; the nameless item violates NOT NULL
        let mut broken = SyncItem::new(2, "placeholder");
        broken.name = None;
        let result = ctx
            .sync
            .replace(
                &[category("c9", "New")],
                &[SyncItem::new(3, "Ok"), broken],
            )
            .await;
        assert!(result.is_err());

        assert_eq!(ctx.menu.menu().await.unwrap(), before);
        assert_eq!(ctx.sync.last_synced_at().await.unwrap(), last_sync);
    }

    #[tokio::test]
    async fn test_last_synced_at_recorded() {
        let ctx = setup().await;
        assert!(ctx.sync.last_synced_at().await.unwrap().is_none());

        let outcome = ctx.sync.replace(&[], &[SyncItem::new(1, "A")]).await.unwrap();

        let recorded = ctx.sync.last_synced_at().await.unwrap().unwrap();
        assert_eq!(recorded.timestamp(), outcome.synced_at.timestamp());
    }

    #[tokio::test]
    async fn test_concurrent_syncs_do_not_interleave() {
        let ctx = setup().await;

        let first: Vec<SyncItem> = (1..=50).map(|i| SyncItem::new(i, "first")).collect();
        let second: Vec<SyncItem> = (100..=120).map(|i| SyncItem::new(i, "second")).collect();

        let sync_a = ctx.sync.clone();
        let sync_b = ctx.sync.clone();
        let a = tokio::spawn(async move { sync_a.replace(&[], &first).await });
        let b = tokio::spawn(async move { sync_b.replace(&[], &second).await });

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let menu = ctx.menu.menu().await.unwrap();
        let all_first = menu.items.iter().all(|i| i.name == "first");
        let all_second = menu.items.iter().all(|i| i.name == "second");
        assert!(all_first || all_second);
        assert!(menu.items.len() == 50 || menu.items.len() == 21);
    }

    #[test]
    fn test_resolve_prefers_curated() {
        let curated = CuratedDescriptions::from_rows(vec![
            ("1".into(), Some("Curated".into())),
            ("2".into(), Some(String::new())),
            ("3".into(), None),
        ]);

        let (desc, kept) = curated.resolve(&SyncItem::new(1, "A").with_description("POS"));
        assert_eq!((desc.as_str(), kept), ("Curated", true));

        let (desc, kept) = curated.resolve(&SyncItem::new(2, "B").with_description("POS"));
        assert_eq!((desc.as_str(), kept), ("POS", false));

        let (desc, kept) = curated.resolve(&SyncItem::new(3, "C"));
        assert_eq!((desc.as_str(), kept), ("", false));
    }
}
