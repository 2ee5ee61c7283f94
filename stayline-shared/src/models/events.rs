use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub hotel_id: Uuid,
    pub owner_id: Uuid,
    pub booking_date: chrono::NaiveDate,
    pub number_of_nights: i32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TransferCompletedEvent {
    pub transfer_id: Uuid,
    pub booking_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TransferRejectedEvent {
    pub transfer_id: Uuid,
    pub booking_id: Uuid,
    pub rejected_by: Uuid,
    pub timestamp: i64,
}
