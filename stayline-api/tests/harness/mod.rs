//! In-process test harness: the real router wired to in-memory
//! repository doubles, plus JWT and request helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Days, NaiveDate, Utc};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use stayline_api::middleware::Claims;
use stayline_api::state::{AppState, AuthConfig};
use stayline_core::booking::{Booking, BookingFilter, BookingPatch, NewBooking};
use stayline_core::hotel::{Hotel, HotelPatch, NewHotel};
use stayline_core::identity::Role;
use stayline_core::repository::{
    BookingRepository, HotelRepository, StoreError, StoreResult, TransferRepository,
    UserRepository,
};
use stayline_core::transfer::{ApprovalRole, NewTransfer, Transfer, TransferPatch};
use stayline_core::user::User;
use stayline_store::app_config::RateLimitConfig;
use stayline_store::{EventProducer, RedisClient};

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    hotels: HashMap<Uuid, Hotel>,
    bookings: HashMap<Uuid, Booking>,
    transfers: HashMap<Uuid, Transfer>,
}

/// Single shared map guarded by one lock, so the completion step is
/// atomic exactly like the Postgres transaction it stands in for.
#[derive(Clone, Default)]
pub struct MemStore(Arc<Mutex<Inner>>);

impl MemStore {
    pub fn seed_user(&self, name: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            role,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    pub fn seed_hotel(&self, name: &str) -> Hotel {
        let hotel = Hotel {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "1 Seaside Road".to_string(),
            tel: "02-111-2222".to_string(),
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    pub fn seed_booking(&self, owner: &User, hotel: &Hotel) -> Booking {
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_date: tomorrow(),
            number_of_nights: 2,
            owner_id: owner.id,
            hotel_id: hotel.id,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().bookings.insert(booking.id, booking.clone());
        booking
    }

    pub fn seed_transfer(&self, sender: &User, receiver: &User, booking: &Booking) -> Transfer {
        let transfer = Transfer {
            id: Uuid::new_v4(),
            sender_id: sender.id,
            receiver_id: receiver.id,
            booking_id: booking.id,
            receiver_approval: false,
            admin_approval: false,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().transfers.insert(transfer.id, transfer.clone());
        transfer
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.0.lock().unwrap().bookings.get(&id).cloned()
    }

    pub fn transfer(&self, id: Uuid) -> Option<Transfer> {
        self.0.lock().unwrap().transfers.get(&id).cloned()
    }
}

#[async_trait]
impl BookingRepository for MemStore {
    async fn create(&self, new: NewBooking) -> StoreResult<Booking> {
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_date: new.booking_date,
            number_of_nights: new.number_of_nights,
            owner_id: new.owner_id,
            hotel_id: new.hotel_id,
            created_at: Utc::now(),
        };
        self.0.lock().unwrap().bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.0.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn list(&self, filter: BookingFilter) -> StoreResult<Vec<Booking>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| filter.owner_id.is_none_or(|o| b.owner_id == o))
            .filter(|b| filter.hotel_id.is_none_or(|h| b.hotel_id == h))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: BookingPatch) -> StoreResult<Option<Booking>> {
        let mut inner = self.0.lock().unwrap();
        let Some(booking) = inner.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(date) = patch.booking_date {
            booking.booking_date = date;
        }
        if let Some(nights) = patch.number_of_nights {
            booking.number_of_nights = nights;
        }
        Ok(Some(booking.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.0.lock().unwrap().bookings.remove(&id).is_some())
    }
}

#[async_trait]
impl TransferRepository for MemStore {
    async fn create(&self, new: NewTransfer) -> StoreResult<Transfer> {
        let mut inner = self.0.lock().unwrap();
        if inner.transfers.values().any(|t| t.booking_id == new.booking_id) {
            return Err(StoreError::Duplicate(format!(
                "a transfer already exists for booking {}",
                new.booking_id
            )));
        }
        let transfer = Transfer {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            booking_id: new.booking_id,
            receiver_approval: false,
            admin_approval: false,
            created_at: Utc::now(),
        };
        inner.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Transfer>> {
        Ok(self.0.lock().unwrap().transfers.get(&id).cloned())
    }

    async fn list(&self, sender_id: Option<Uuid>) -> StoreResult<Vec<Transfer>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .transfers
            .values()
            .filter(|t| sender_id.is_none_or(|s| t.sender_id == s))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: TransferPatch) -> StoreResult<Option<Transfer>> {
        let mut inner = self.0.lock().unwrap();
        let Some(transfer) = inner.transfers.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(receiver_id) = patch.receiver_id {
            transfer.receiver_id = receiver_id;
        }
        if let Some(receiver_approval) = patch.receiver_approval {
            transfer.receiver_approval = receiver_approval;
        }
        if let Some(admin_approval) = patch.admin_approval {
            transfer.admin_approval = admin_approval;
        }
        Ok(Some(transfer.clone()))
    }

    async fn set_approval(&self, id: Uuid, role: ApprovalRole) -> StoreResult<Option<Transfer>> {
        let mut inner = self.0.lock().unwrap();
        let Some(transfer) = inner.transfers.get_mut(&id) else {
            return Ok(None);
        };
        match role {
            ApprovalRole::Receiver => transfer.receiver_approval = true,
            ApprovalRole::Admin => transfer.admin_approval = true,
        }
        Ok(Some(transfer.clone()))
    }

    async fn complete_if_approved(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let mut inner = self.0.lock().unwrap();
        let fully_approved = inner
            .transfers
            .get(&id)
            .is_some_and(|t| t.receiver_approval && t.admin_approval);
        if !fully_approved {
            return Ok(None);
        }
        let transfer = inner.transfers.remove(&id).unwrap();
        let booking = inner
            .bookings
            .get_mut(&transfer.booking_id)
            .expect("transfer references a live booking");
        booking.owner_id = transfer.receiver_id;
        Ok(Some(booking.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.0.lock().unwrap().transfers.remove(&id).is_some())
    }
}

#[async_trait]
impl HotelRepository for MemStore {
    async fn create(&self, new: NewHotel) -> StoreResult<Hotel> {
        let mut inner = self.0.lock().unwrap();
        if inner.hotels.values().any(|h| h.name == new.name) {
            return Err(StoreError::Duplicate(format!("hotel name {:?} is taken", new.name)));
        }
        let hotel = Hotel {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
            tel: new.tel,
            created_at: Utc::now(),
        };
        inner.hotels.insert(hotel.id, hotel.clone());
        Ok(hotel)
    }

    async fn find(&self, id: Uuid) -> StoreResult<Option<Hotel>> {
        Ok(self.0.lock().unwrap().hotels.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Hotel>> {
        Ok(self.0.lock().unwrap().hotels.values().cloned().collect())
    }

    async fn update(&self, id: Uuid, patch: HotelPatch) -> StoreResult<Option<Hotel>> {
        let mut inner = self.0.lock().unwrap();
        let Some(hotel) = inner.hotels.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            hotel.name = name;
        }
        if let Some(address) = patch.address {
            hotel.address = address;
        }
        if let Some(tel) = patch.tel {
            hotel.tel = tel;
        }
        Ok(Some(hotel.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.0.lock().unwrap();
        if inner.hotels.remove(&id).is_none() {
            return Ok(false);
        }
        // Mirror the schema cascade: bookings and their transfers go too.
        let doomed: Vec<Uuid> = inner
            .bookings
            .values()
            .filter(|b| b.hotel_id == id)
            .map(|b| b.id)
            .collect();
        for booking_id in doomed {
            inner.bookings.remove(&booking_id);
            inner.transfers.retain(|_, t| t.booking_id != booking_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemStore {
    async fn find(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.0.lock().unwrap().users.get(&id).cloned())
    }
}

pub struct TestEnv {
    pub store: MemStore,
    pub app: Router,
}

pub async fn test_env() -> TestEnv {
    let store = MemStore::default();

    let redis = RedisClient::new("redis://127.0.0.1:1").await.expect("lazy redis client");
    let events = EventProducer::new("localhost:9092").expect("kafka producer");

    let state = AppState {
        bookings: Arc::new(store.clone()),
        transfers: Arc::new(store.clone()),
        hotels: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
        redis: Arc::new(redis),
        events: Arc::new(events),
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
        booking_rules: Default::default(),
        rate_limit: RateLimitConfig::default(),
    };

    TestEnv {
        store,
        app: stayline_api::app(state),
    }
}

pub fn token_for(user: &User) -> String {
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

pub fn tomorrow() -> NaiveDate {
    Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap()
}

pub fn yesterday() -> NaiveDate {
    Utc::now().date_naive().checked_sub_days(Days::new(1)).unwrap()
}

/// Drives one request through the router and decodes the envelope.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}
