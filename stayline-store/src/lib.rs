pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod hotel_repo;
pub mod redis_repo;
pub mod transfer_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use events::EventProducer;
pub use hotel_repo::PgHotelRepository;
pub use redis_repo::RedisClient;
pub use transfer_repo::PgTransferRepository;
pub use user_repo::PgUserRepository;

use stayline_core::repository::StoreError;

/// Maps a sqlx failure onto the store taxonomy. Unique-index violations
/// become Duplicate so the API layer can surface them as invalid input.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
