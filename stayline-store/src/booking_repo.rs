use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stayline_core::booking::{Booking, BookingFilter, BookingPatch, NewBooking};
use stayline_core::repository::{BookingRepository, StoreResult};

use crate::store_error;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_date: NaiveDate,
    number_of_nights: i32,
    owner_id: Uuid,
    hotel_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            booking_date: row.booking_date,
            number_of_nights: row.number_of_nights,
            owner_id: row.owner_id,
            hotel_id: row.hotel_id,
            created_at: row.created_at,
        }
    }
}

const BOOKING_COLUMNS: &str = "id, booking_date, number_of_nights, owner_id, hotel_id, created_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, new: NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings (id, booking_date, number_of_nights, owner_id, hotel_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, booking_date, number_of_nights, owner_id, hotel_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.booking_date)
        .bind(new.number_of_nights)
        .bind(new.owner_id)
        .bind(new.hotel_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: BookingFilter) -> StoreResult<Vec<Booking>> {
        // Four filter shapes, one prepared statement each.
        let rows = match (filter.owner_id, filter.hotel_id) {
            (Some(owner), Some(hotel)) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings \
                     WHERE owner_id = $1 AND hotel_id = $2 ORDER BY created_at DESC"
                ))
                .bind(owner)
                .bind(hotel)
                .fetch_all(&self.pool)
                .await
            }
            (Some(owner), None) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings \
                     WHERE owner_id = $1 ORDER BY created_at DESC"
                ))
                .bind(owner)
                .fetch_all(&self.pool)
                .await
            }
            (None, Some(hotel)) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings \
                     WHERE hotel_id = $1 ORDER BY created_at DESC"
                ))
                .bind(hotel)
                .fetch_all(&self.pool)
                .await
            }
            (None, None) => {
                sqlx::query_as::<_, BookingRow>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, patch: BookingPatch) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings \
             SET booking_date = COALESCE($2, booking_date), \
                 number_of_nights = COALESCE($3, number_of_nights) \
             WHERE id = $1 \
             RETURNING id, booking_date, number_of_nights, owner_id, hotel_id, created_at",
        )
        .bind(id)
        .bind(patch.booking_date)
        .bind(patch.number_of_nights)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
