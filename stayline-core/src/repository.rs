use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingFilter, BookingPatch, NewBooking};
use crate::hotel::{Hotel, HotelPatch, NewHotel};
use crate::transfer::{ApprovalRole, NewTransfer, Transfer, TransferPatch};
use crate::user::User;

/// Error taxonomy shared by every store backend. Absence is modelled with
/// Option on the trait methods, not with an error variant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for booking records
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, new: NewBooking) -> StoreResult<Booking>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn list(&self, filter: BookingFilter) -> StoreResult<Vec<Booking>>;

    /// Applies the patch and returns the updated row, or None when the
    /// booking no longer exists.
    async fn update(&self, id: Uuid, patch: BookingPatch) -> StoreResult<Option<Booking>>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for transfer records
#[async_trait]
pub trait TransferRepository: Send + Sync {
    /// Fails with StoreError::Duplicate when an outstanding transfer
    /// already references the same booking.
    async fn create(&self, new: NewTransfer) -> StoreResult<Transfer>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Transfer>>;

    /// All transfers, or only those initiated by `sender_id` when set.
    async fn list(&self, sender_id: Option<Uuid>) -> StoreResult<Vec<Transfer>>;

    async fn update(&self, id: Uuid, patch: TransferPatch) -> StoreResult<Option<Transfer>>;

    /// Sets the approval flag for the given slot and returns the fresh
    /// row, or None when the transfer is already gone.
    async fn set_approval(&self, id: Uuid, role: ApprovalRole) -> StoreResult<Option<Transfer>>;

    /// Atomic completion step: in a single transaction, removes the
    /// transfer iff both approval flags are set and reassigns the booking
    /// to the receiver. Returns the reassigned booking, or None when the
    /// transfer is not fully approved or no longer exists. At most one
    /// concurrent caller observes Some for a given transfer.
    async fn complete_if_approved(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for hotel records
#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Fails with StoreError::Duplicate when the hotel name is taken.
    async fn create(&self, new: NewHotel) -> StoreResult<Hotel>;

    async fn find(&self, id: Uuid) -> StoreResult<Option<Hotel>>;

    async fn list(&self) -> StoreResult<Vec<Hotel>>;

    async fn update(&self, id: Uuid, patch: HotelPatch) -> StoreResult<Option<Hotel>>;

    /// Removes the hotel and, through the schema cascade, its bookings.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for user lookup
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> StoreResult<Option<User>>;
}
