use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{nullable, ExternalId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!(
                "Invalid reservation status '{}'. Valid options: pending, confirmed, cancelled",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ExternalId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub date: NaiveDate,
    /// Wall-clock time as entered, e.g. "18:30".
    pub time: String,
    pub guests: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub status: ReservationStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Public booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub guests: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewReservation {
    /// New bookings always start as pending.
    pub fn into_reservation(self) -> Reservation {
        Reservation {
            id: ExternalId::generate(),
            name: self.name,
            phone: self.phone,
            email: self.email,
            date: self.date,
            time: self.time,
            guests: self.guests,
            notes: self.notes,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}
