use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_date: NaiveDate,
    pub number_of_nights: i32,
    pub owner_id: Uuid,
    pub hotel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub booking_date: NaiveDate,
    pub number_of_nights: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub booking_date: Option<NaiveDate>,
    pub number_of_nights: Option<i32>,
}

/// Repository input for a new booking; id and created_at are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub booking_date: NaiveDate,
    pub number_of_nights: i32,
    pub owner_id: Uuid,
    pub hotel_id: Uuid,
}

/// Partial update applied by the store; None leaves the column untouched.
/// Ownership is never patched here, it only moves through transfer
/// completion.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub booking_date: Option<NaiveDate>,
    pub number_of_nights: Option<i32>,
}

/// Visibility filter for listing: a regular caller is pinned to their own
/// bookings, an admin may leave owner_id unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingFilter {
    pub owner_id: Option<Uuid>,
    pub hotel_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingRuleError {
    #[error("The booking date should be after today")]
    DateNotAfterToday,

    #[error("Number of nights should be within {min} to {max}")]
    NightsOutOfRange { min: i32, max: i32 },
}

/// Inclusive night-count bounds applied on create and update.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BookingRules {
    #[serde(default = "default_min_nights")]
    pub min_nights: i32,
    #[serde(default = "default_max_nights")]
    pub max_nights: i32,
}

fn default_min_nights() -> i32 {
    1
}

fn default_max_nights() -> i32 {
    3
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            min_nights: default_min_nights(),
            max_nights: default_max_nights(),
        }
    }
}

impl BookingRules {
    pub fn check_nights(&self, nights: i32) -> Result<(), BookingRuleError> {
        if nights < self.min_nights || nights > self.max_nights {
            return Err(BookingRuleError::NightsOutOfRange {
                min: self.min_nights,
                max: self.max_nights,
            });
        }
        Ok(())
    }

    /// The booking date must be strictly later than `today`; the current
    /// day itself is rejected.
    pub fn check_date(&self, booking_date: NaiveDate, today: NaiveDate) -> Result<(), BookingRuleError> {
        if booking_date <= today {
            return Err(BookingRuleError::DateNotAfterToday);
        }
        Ok(())
    }
}
