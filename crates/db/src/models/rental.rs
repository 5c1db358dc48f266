//! Rental ledger model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use velo_core::types::{DbId, Timestamp};

/// Status of a rental ledger row. Maps to the `rental_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rental_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Ongoing,
    Completed,
}

impl RentalStatus {
    /// Parse an admin-supplied status string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ongoing" => Some(RentalStatus::Ongoing),
            "completed" => Some(RentalStatus::Completed),
            _ => None,
        }
    }
}

/// A rental row from the `rental_logs` table.
///
/// `end_time` and `duration_minutes` are written exactly once, at
/// completion, and are immutable afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RentalLog {
    pub id: DbId,
    pub user_id: DbId,
    pub bicycle_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_minutes: Option<f64>,
    pub distance_km: Option<f64>,
    pub status: RentalStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_statuses_only() {
        assert_eq!(RentalStatus::parse("ongoing"), Some(RentalStatus::Ongoing));
        assert_eq!(
            RentalStatus::parse("completed"),
            Some(RentalStatus::Completed)
        );
        assert_eq!(RentalStatus::parse("Completed"), None);
        assert_eq!(RentalStatus::parse("paused"), None);
    }
}
