use std::sync::Arc;

use stayline_core::booking::BookingRules;
use stayline_core::repository::{
    BookingRepository, HotelRepository, TransferRepository, UserRepository,
};
use stayline_store::app_config::RateLimitConfig;
use stayline_store::{EventProducer, RedisClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingRepository>,
    pub transfers: Arc<dyn TransferRepository>,
    pub hotels: Arc<dyn HotelRepository>,
    pub users: Arc<dyn UserRepository>,
    pub redis: Arc<RedisClient>,
    pub events: Arc<EventProducer>,
    pub auth: AuthConfig,
    pub booking_rules: BookingRules,
    pub rate_limit: RateLimitConfig,
}
