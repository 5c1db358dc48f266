//! Well-known role name constants.
//!
//! These must match the `role` CHECK constraint in
//! `20260715000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_RIDER: &str = "rider";
