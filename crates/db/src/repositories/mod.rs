//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod booking_repo;
pub mod facility_repo;
pub mod review_repo;
pub mod sport_repo;
pub mod user_repo;

pub use booking_repo::BookingRepo;
pub use facility_repo::FacilityRepo;
pub use review_repo::ReviewRepo;
pub use sport_repo::SportRepo;
pub use user_repo::UserRepo;
