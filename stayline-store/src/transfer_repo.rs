use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stayline_core::booking::Booking;
use stayline_core::repository::{StoreResult, TransferRepository};
use stayline_core::transfer::{ApprovalRole, NewTransfer, Transfer, TransferPatch};

use crate::store_error;

pub struct PgTransferRepository {
    pool: PgPool,
}

impl PgTransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    booking_id: Uuid,
    receiver_approval: bool,
    admin_approval: bool,
    created_at: DateTime<Utc>,
}

impl From<TransferRow> for Transfer {
    fn from(row: TransferRow) -> Self {
        Transfer {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            booking_id: row.booking_id,
            receiver_approval: row.receiver_approval,
            admin_approval: row.admin_approval,
            created_at: row.created_at,
        }
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

const TRANSFER_COLUMNS: &str =
    "id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at";

#[async_trait]
impl TransferRepository for PgTransferRepository {
    async fn create(&self, new: NewTransfer) -> StoreResult<Transfer> {
        // The unique index on booking_id rejects a second outstanding
        // transfer for the same booking.
        let row = sqlx::query_as::<_, TransferRow>(
            "INSERT INTO transfers (id, sender_id, receiver_id, booking_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.sender_id)
        .bind(new.receiver_id)
        .bind(new.booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Transfer>> {
        let row = sqlx::query_as::<_, TransferRow>(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, sender_id: Option<Uuid>) -> StoreResult<Vec<Transfer>> {
        let rows = match sender_id {
            Some(sender) => {
                sqlx::query_as::<_, TransferRow>(&format!(
                    "SELECT {TRANSFER_COLUMNS} FROM transfers \
                     WHERE sender_id = $1 ORDER BY created_at DESC"
                ))
                .bind(sender)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, TransferRow>(&format!(
                    "SELECT {TRANSFER_COLUMNS} FROM transfers ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, patch: TransferPatch) -> StoreResult<Option<Transfer>> {
        let row = sqlx::query_as::<_, TransferRow>(
            "UPDATE transfers \
             SET receiver_id = COALESCE($2, receiver_id), \
                 receiver_approval = COALESCE($3, receiver_approval), \
                 admin_approval = COALESCE($4, admin_approval) \
             WHERE id = $1 \
             RETURNING id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at",
        )
        .bind(id)
        .bind(patch.receiver_id)
        .bind(patch.receiver_approval)
        .bind(patch.admin_approval)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn set_approval(&self, id: Uuid, role: ApprovalRole) -> StoreResult<Option<Transfer>> {
        let sql = match role {
            ApprovalRole::Receiver => {
                "UPDATE transfers SET receiver_approval = TRUE WHERE id = $1 \
                 RETURNING id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at"
            }
            ApprovalRole::Admin => {
                "UPDATE transfers SET admin_approval = TRUE WHERE id = $1 \
                 RETURNING id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at"
            }
        };

        let row = sqlx::query_as::<_, TransferRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn complete_if_approved(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // The conditional delete is the linearization point: exactly one
        // concurrent approver gets the row back and performs the
        // reassignment; everyone else sees None.
        let transfer = sqlx::query_as::<_, TransferRow>(
            "DELETE FROM transfers \
             WHERE id = $1 AND receiver_approval AND admin_approval \
             RETURNING id, sender_id, receiver_id, booking_id, receiver_approval, admin_approval, created_at",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        let Some(transfer) = transfer else {
            tx.rollback().await.map_err(store_error)?;
            return Ok(None);
        };

        // The FK from transfers.booking_id guarantees the booking still
        // exists while the transfer row did.
        let booking = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET owner_id = $1 WHERE id = $2 \
             RETURNING id, booking_date, number_of_nights, owner_id, hotel_id, created_at",
        )
        .bind(transfer.receiver_id)
        .bind(transfer.booking_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        Ok(Some(booking.into()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
