use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_HOTEL_NAME_LEN: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tel: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHotelRequest {
    pub name: String,
    pub address: String,
    pub tel: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHotelRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub tel: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub tel: String,
}

#[derive(Debug, Clone, Default)]
pub struct HotelPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub tel: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum HotelRuleError {
    #[error("Please add a name")]
    MissingName,

    #[error("Name cannot be more than {MAX_HOTEL_NAME_LEN} characters")]
    NameTooLong,

    #[error("Please add an address")]
    MissingAddress,

    #[error("Please add a telephone number")]
    MissingTel,
}

pub fn check_name(name: &str) -> Result<(), HotelRuleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HotelRuleError::MissingName);
    }
    if name.chars().count() > MAX_HOTEL_NAME_LEN {
        return Err(HotelRuleError::NameTooLong);
    }
    Ok(())
}

pub fn check_address(address: &str) -> Result<(), HotelRuleError> {
    if address.trim().is_empty() {
        return Err(HotelRuleError::MissingAddress);
    }
    Ok(())
}

pub fn check_tel(tel: &str) -> Result<(), HotelRuleError> {
    if tel.trim().is_empty() {
        return Err(HotelRuleError::MissingTel);
    }
    Ok(())
}
