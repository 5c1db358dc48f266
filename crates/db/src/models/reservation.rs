//! Reservation (time-boxed hold) model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use velo_core::types::{DbId, Timestamp};

/// Status of a reservation. Maps to the `reservation_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Expired,
}

/// A reservation row from the `reservations` table.
///
/// Rows are never hard-deleted; they leave the active set by status change
/// or by `expiry_at` lapsing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub user_id: DbId,
    pub bicycle_id: DbId,
    pub reserved_at: Timestamp,
    pub expiry_at: Timestamp,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Whether the hold is still live at `now`.
    ///
    /// Expiry is passive: the invariant only needs to hold at decision
    /// time, so callers evaluate this predicate instead of relying on a
    /// background timer having fired.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.status == ReservationStatus::Pending && now <= self.expiry_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn reservation(status: ReservationStatus) -> Reservation {
        let reserved_at = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();
        Reservation {
            id: 1,
            user_id: 7,
            bicycle_id: 3,
            reserved_at,
            expiry_at: reserved_at + Duration::minutes(10),
            status,
        }
    }

    #[test]
    fn pending_hold_is_active_before_expiry() {
        let res = reservation(ReservationStatus::Pending);
        assert!(res.is_active(res.reserved_at + Duration::minutes(9)));
        assert!(res.is_active(res.expiry_at));
    }

    #[test]
    fn pending_hold_lapses_after_expiry() {
        // Reserved at T with a 10 minute hold: inactive at T+11min.
        let res = reservation(ReservationStatus::Pending);
        assert!(!res.is_active(res.reserved_at + Duration::minutes(11)));
    }

    #[test]
    fn non_pending_holds_are_never_active() {
        for status in [
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Expired,
        ] {
            let res = reservation(status);
            assert!(!res.is_active(res.reserved_at));
        }
    }
}
