use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{SettingsUpdate, SiteSettings, StoredSettings, DEFAULT_ADMIN_CODE};

const ADMIN_CODE_KEY: &str = "adminCode";

/// Settings persisted as one JSON document per top-level section, plus the
/// admin access code under its own key.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Reads the stored settings for display. A section that is unreadable
    /// or no longer matches its typed shape is left out with a warning.
    pub async fn load(&self) -> Result<StoredSettings, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        read_all(&mut conn, SectionErrors::Skip).await
    }

    /// Overlays `update` onto the stored document and returns the public
    /// result. Read, overlay and write happen in a single transaction.
    ///
    /// Fails with a decode error, writing nothing, if any stored section
    /// cannot be decoded: overlaying onto a dropped section would replace
    /// the fields the update does not mention.
    pub async fn update(&self, update: SettingsUpdate) -> Result<SiteSettings, sqlx::Error> {
        let _guard = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;

        let mut stored = read_all(&mut tx, SectionErrors::Fail).await?;
        stored.apply(update);
        write_all(&mut tx, &stored).await?;

        tx.commit().await?;
        Ok(stored.public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionErrors {
    Skip,
    Fail,
}

/// Checks that `value` is a valid stored form of the settings row `key`.
/// Keys that are not known sections are accepted.
pub(crate) fn check_section(key: &str, value: &Value) -> Result<(), serde_json::Error> {
    if key == ADMIN_CODE_KEY {
        return String::deserialize(value).map(|_| ());
    }

    let mut single = Map::new();
    single.insert(key.to_string(), value.clone());
    serde_json::from_value::<SiteSettings>(Value::Object(single)).map(|_| ())
}

async fn read_all(
    conn: &mut SqliteConnection,
    on_error: SectionErrors,
) -> Result<StoredSettings, sqlx::Error> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
        .fetch_all(&mut *conn)
        .await?;

    let mut sections = Map::new();
    let mut admin_code = None;

    for (key, raw) in rows {
        let checked = serde_json::from_str::<Value>(&raw)
            .and_then(|value| check_section(&key, &value).map(|_| value));
        let value = match checked {
            Ok(value) => value,
            Err(e) if on_error == SectionErrors::Skip => {
                tracing::warn!("Ignoring malformed setting '{}': {}", key, e);
                continue;
            }
            Err(e) => {
                tracing::error!("Stored setting '{}' cannot be decoded: {}", key, e);
                return Err(sqlx::Error::Decode(Box::new(e)));
            }
        };

        if key == ADMIN_CODE_KEY {
            admin_code = value.as_str().map(str::to_string);
        } else {
            sections.insert(key, value);
        }
    }

    let public: SiteSettings = serde_json::from_value(Value::Object(sections))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(StoredSettings {
        public,
        admin_code: admin_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_CODE.to_string()),
    })
}

/// Upserts every present section and the admin code. Sections that are
/// `None` are left as stored.
async fn write_all(
    conn: &mut SqliteConnection,
    settings: &StoredSettings,
) -> Result<(), sqlx::Error> {
    let document =
        serde_json::to_value(&settings.public).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let mut entries: Vec<(String, Value)> = match document {
        Value::Object(map) => map.into_iter().collect(),
        _ => Vec::new(),
    };
    entries.push((
        ADMIN_CODE_KEY.to_string(),
        Value::String(settings.admin_code.clone()),
    ));

    for (key, value) in entries {
        upsert(conn, &key, &value).await?;
    }

    Ok(())
}

pub(crate) async fn upsert(
    conn: &mut SqliteConnection,
    key: &str,
    value: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(())
}
