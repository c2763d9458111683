use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use super::{nullable, ExternalId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: ExternalId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A menu item as served to the website.
///
/// Structural fields (name, category, price, image, flags) are owned by the
/// POS; `description` is owned by the website admin and survives syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: ExternalId,
    pub name: String,
    #[serde(default)]
    pub category: Option<ExternalId>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: i64,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub is_popular: bool,
    #[serde(default = "default_available", deserialize_with = "nullable::or_true")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Full menu as returned by `GET /api/menu`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// Admin payload for creating a menu item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    #[serde(default)]
    pub id: Option<ExternalId>,
    pub name: String,
    #[serde(default)]
    pub category: Option<ExternalId>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_popular: Option<bool>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl NewMenuItem {
    pub fn into_menu_item(self) -> MenuItem {
        MenuItem {
            id: self.id.unwrap_or_else(ExternalId::generate),
            name: self.name,
            category: self.category,
            price: self.price.unwrap_or(0),
            description: self.description.unwrap_or_default(),
            image: self.image,
            is_popular: self.is_popular.unwrap_or(false),
            is_available: self.is_available.unwrap_or(true),
        }
    }
}

/// Admin payload for updating a menu item. Absent or null fields keep
/// their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub category: Option<ExternalId>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_popular: Option<bool>,
    pub is_available: Option<bool>,
}

/// One item of a POS snapshot.
///
/// `name` stays optional here: a nameless item is rejected by the store
/// during the sync transaction, which rolls the whole snapshot back.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncItem {
    pub id: ExternalId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<ExternalId>,
    #[serde(default)]
    pub category: Option<ExternalId>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_popular: Option<bool>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl SyncItem {
    pub fn new(id: impl Into<ExternalId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            category_id: None,
            category: None,
            price: None,
            description: None,
            image: None,
            is_popular: None,
            is_available: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<ExternalId>) -> Self {
        self.category_id = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `category_id` wins over `category` when both are sent.
    pub fn category(&self) -> Option<&ExternalId> {
        self.category_id.as_ref().or(self.category.as_ref())
    }
}

/// Body of `POST /api/sync-menu`. Both lists are required, either may be
/// empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuSnapshot {
    #[serde(default)]
    pub categories: Option<Vec<MenuCategory>>,
    #[serde(default)]
    pub items: Option<Vec<SyncItem>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawPrice {
    fn into_minor_units(self) -> Result<i64, String> {
        match self {
            RawPrice::Int(n) => Ok(n),
            RawPrice::Float(f) if f.is_finite() => Ok(f.round() as i64),
            RawPrice::Float(f) => Err(format!("invalid price {}", f)),
            RawPrice::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f.round() as i64))
                    .map_err(|_| format!("invalid price '{}'", s))
            }
        }
    }
}

fn deserialize_optional_price<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawPrice>::deserialize(deserializer)?
        .map(RawPrice::into_minor_units)
        .transpose()
        .map_err(de::Error::custom)
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_price(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_uses_frontend_keys() {
        let item = MenuItem {
            id: ExternalId::from(1),
            name: "Pad Thai".into(),
            category: Some("c1".into()),
            price: 60,
            description: String::new(),
            image: None,
            is_popular: true,
            is_available: false,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["category"], "c1");
        assert_eq!(json["isPopular"], true);
        assert_eq!(json["isAvailable"], false);
        assert!(json.get("is_popular").is_none());
    }

    #[test]
    fn test_sync_item_accepts_either_category_key() {
        let a: SyncItem =
            serde_json::from_str(r#"{"id": 1, "name": "A", "category_id": "c1"}"#).unwrap();
        let b: SyncItem =
            serde_json::from_str(r#"{"id": 2, "name": "B", "category": "c2"}"#).unwrap();
        let both: SyncItem = serde_json::from_str(
            r#"{"id": 3, "name": "C", "category": "old", "category_id": "new"}"#,
        )
        .unwrap();

        assert_eq!(a.category(), Some(&ExternalId::from("c1")));
        assert_eq!(b.category(), Some(&ExternalId::from("c2")));
        assert_eq!(both.category(), Some(&ExternalId::from("new")));
    }

    #[test]
    fn test_price_coercion() {
        let item: SyncItem =
            serde_json::from_str(r#"{"id": 1, "price": "45"}"#).unwrap();
        assert_eq!(item.price, Some(45));

        let item: SyncItem = serde_json::from_str(r#"{"id": 1, "price": 59.6}"#).unwrap();
        assert_eq!(item.price, Some(60));

        let item: SyncItem = serde_json::from_str(r#"{"id": 1, "price": null}"#).unwrap();
        assert_eq!(item.price, None);

        assert!(serde_json::from_str::<SyncItem>(r#"{"id": 1, "price": "cheap"}"#).is_err());
    }

    #[test]
    fn test_snapshot_missing_lists_are_none() {
        let snapshot: MenuSnapshot = serde_json::from_str(r#"{"categories": []}"#).unwrap();
        assert_eq!(snapshot.categories.map(|c| c.len()), Some(0));
        assert!(snapshot.items.is_none());
    }

    #[test]
    fn test_new_menu_item_defaults() {
        let new: NewMenuItem = serde_json::from_str(r#"{"name": "Som Tum"}"#).unwrap();
        let item = new.into_menu_item();

        assert_eq!(item.name, "Som Tum");
        assert_eq!(item.price, 0);
        assert_eq!(item.description, "");
        assert!(!item.is_popular);
        assert!(item.is_available);
        assert!(!item.id.as_str().is_empty());
    }
}
