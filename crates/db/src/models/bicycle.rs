//! Bicycle inventory model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use velo_core::types::{DbId, Timestamp};

/// Lifecycle status of a bicycle. Maps to the `bicycle_status` Postgres enum.
///
/// `Reserved` is a first-class exclusion: a bicycle held by a pending
/// reservation never matches the `Available` filter of the start transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bicycle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BicycleStatus {
    Available,
    Reserved,
    InUse,
    Offline,
}

/// A bicycle row from the `bicycles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bicycle {
    pub id: DbId,
    pub device_id: String,
    pub status: BicycleStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Bumped by the telemetry webhook and by status transitions.
    pub last_update: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new bicycle (admin).
#[derive(Debug, Deserialize)]
pub struct CreateBicycle {
    pub device_id: String,
    /// Defaults to `available` when omitted.
    pub status: Option<BicycleStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// DTO for updating a bicycle (admin). Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateBicycle {
    pub device_id: Option<String>,
    pub status: Option<BicycleStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Outcome of a guarded bicycle delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteBicycleOutcome {
    Deleted,
    NotFound,
    /// An ongoing rental still references the bicycle.
    HasOngoingRental,
}
