use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stayline_core::hotel::{Hotel, HotelPatch, NewHotel};
use stayline_core::repository::{HotelRepository, StoreResult};

use crate::store_error;

pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    address: String,
    tel: String,
    created_at: DateTime<Utc>,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            address: row.address,
            tel: row.tel,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl HotelRepository for PgHotelRepository {
    async fn create(&self, new: NewHotel) -> StoreResult<Hotel> {
        let row = sqlx::query_as::<_, HotelRow>(
            "INSERT INTO hotels (id, name, address, tel) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, address, tel, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.address)
        .bind(new.tel)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Hotel>> {
        let row = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, address, tel, created_at FROM hotels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, address, tel, created_at FROM hotels ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, patch: HotelPatch) -> StoreResult<Option<Hotel>> {
        let row = sqlx::query_as::<_, HotelRow>(
            "UPDATE hotels \
             SET name = COALESCE($2, name), \
                 address = COALESCE($3, address), \
                 tel = COALESCE($4, tel) \
             WHERE id = $1 \
             RETURNING id, name, address, tel, created_at",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.address)
        .bind(patch.tel)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        // Bookings (and their outstanding transfers) go with the hotel via
        // the ON DELETE CASCADE chain in the schema.
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
