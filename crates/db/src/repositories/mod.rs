//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Plain
//! reads and whole-operation helpers accept `&PgPool`; operations that
//! participate in a lifecycle transaction accept `&mut PgConnection` and
//! are only valid while the caller holds the enclosing transaction.

pub mod bicycle_repo;
pub mod rental_repo;
pub mod reservation_repo;
pub mod user_repo;

pub use bicycle_repo::BicycleRepo;
pub use rental_repo::RentalRepo;
pub use reservation_repo::ReservationRepo;
pub use user_repo::UserRepo;
