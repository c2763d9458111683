use sqlx::SqlitePool;
use std::str::FromStr;

use super::{parse_date, parse_timestamp};
use crate::models::{ExternalId, Reservation, ReservationStatus};

#[derive(Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: String,
    name: String,
    phone: String,
    email: Option<String>,
    reservation_date: String,
    reservation_time: String,
    guests: i64,
    notes: Option<String>,
    status: String,
    created_at: String,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<Reservation, sqlx::Error> {
        let status = ReservationStatus::from_str(&self.status).unwrap_or_else(|e| {
            tracing::warn!("Reservation {}: {}", self.id, e);
            ReservationStatus::Pending
        });

        Ok(Reservation {
            date: parse_date(&self.reservation_date)?,
            id: ExternalId::new(self.id),
            name: self.name,
            phone: self.phone,
            email: self.email,
            time: self.reservation_time,
            guests: self.guests,
            notes: self.notes,
            status,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Newest booking date first.
    pub async fn list(&self) -> Result<Vec<Reservation>, sqlx::Error> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT * FROM reservations ORDER BY reservation_date DESC, reservation_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }

    pub async fn create(&self, reservation: &Reservation) -> Result<Reservation, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, name, phone, email, reservation_date, reservation_time, guests, notes, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.id.as_str())
        .bind(&reservation.name)
        .bind(&reservation.phone)
        .bind(&reservation.email)
        .bind(reservation.date.to_string())
        .bind(&reservation.time)
        .bind(reservation.guests)
        .bind(&reservation.notes)
        .bind(reservation.status.to_string())
        .bind(reservation.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(reservation.clone())
    }

    /// Returns `None` when no reservation has this id; nothing is written.
    pub async fn update_status(
        &self,
        id: &ExternalId,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let row: Option<ReservationRow> =
            sqlx::query_as("UPDATE reservations SET status = ? WHERE id = ? RETURNING *")
                .bind(status.to_string())
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(ReservationRow::into_reservation).transpose()
    }

    pub async fn delete(&self, id: &ExternalId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM reservations WHERE id = ?")
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
    use crate::models::NewReservation;

    fn booking(date: &str, time: &str) -> Reservation {
        serde_json::from_value::<NewReservation>(serde_json::json!({
            "name": "Somchai",
            "phone": "0812345678",
            "date": date,
            "time": time,
            "guests": 2,
        }))
        .unwrap()
        .into_reservation()
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let db = setup_db().await;
        let repo = ReservationRepository::new(db.pool.clone());

        repo.create(&booking("2026-03-01", "18:00")).await.unwrap();
        repo.create(&booking("2026-03-02", "12:00")).await.unwrap();
        repo.create(&booking("2026-03-01", "20:00")).await.unwrap();

        let list = repo.list().await.unwrap();
        let slots: Vec<(String, String)> = list
            .iter()
            .map(|r| (r.date.to_string(), r.time.clone()))
            .collect();
        assert_eq!(
            slots,
            vec![
                ("2026-03-02".to_string(), "12:00".to_string()),
                ("2026-03-01".to_string(), "20:00".to_string()),
                ("2026-03-01".to_string(), "18:00".to_string()),
            ]
        );
        assert!(list.iter().all(|r| r.status == ReservationStatus::Pending));
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = setup_db().await;
        let repo = ReservationRepository::new(db.pool.clone());

        let created = repo.create(&booking("2026-03-01", "18:00")).await.unwrap();
        let updated = repo
            .update_status(&created.id, ReservationStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, ReservationStatus::Confirmed);
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn test_update_status_missing_changes_nothing() {
        let db = setup_db().await;
        let repo = ReservationRepository::new(db.pool.clone());

        let created = repo.create(&booking("2026-03-01", "18:00")).await.unwrap();

        let result = repo
            .update_status(&ExternalId::from(123), ReservationStatus::Confirmed)
            .await
            .unwrap();
        assert!(result.is_none());

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, created.id);
        assert_eq!(list[0].status, ReservationStatus::Pending);
    }
}
