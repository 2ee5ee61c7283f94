use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use stayline_core::booking::{
    Booking, BookingFilter, BookingPatch, CreateBookingRequest, NewBooking, UpdateBookingRequest,
};
use stayline_core::identity::Caller;
use stayline_shared::models::events::BookingCreatedEvent;
use stayline_shared::pii::MaskedEmail;
use stayline_shared::response::ApiResponse;

use crate::error::ApiError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings))
        .route(
            "/v1/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route(
            "/v1/hotels/{hotel_id}/bookings",
            get(list_hotel_bookings).post(create_booking),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// Admins see everything; everyone else only their own bookings.
fn visibility_filter(caller: &Caller, hotel_id: Option<Uuid>) -> BookingFilter {
    BookingFilter {
        owner_id: (!caller.is_admin()).then_some(caller.id),
        hotel_id,
    }
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = state.bookings.list(visibility_filter(&caller, None)).await?;
    Ok(Json(ApiResponse::list(bookings)))
}

async fn list_hotel_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(hotel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = state.bookings.list(visibility_filter(&caller, Some(hotel_id))).await?;
    Ok(Json(ApiResponse::list(bookings)))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .bookings
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {id}")))?;

    if !caller.can_manage(booking.owner_id) {
        return Err(ApiError::Forbidden("Not authorized to access this booking".to_string()));
    }

    Ok(Json(ApiResponse::data(booking)))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(hotel_id): Path<Uuid>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .hotels
        .find(hotel_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No hotel with the id of {hotel_id}")))?;

    state.booking_rules.check_date(req.booking_date, Utc::now().date_naive())?;
    state.booking_rules.check_nights(req.number_of_nights)?;

    let booking = state
        .bookings
        .create(NewBooking {
            booking_date: req.booking_date,
            number_of_nights: req.number_of_nights,
            owner_id: caller.id,
            hotel_id,
        })
        .await?;

    notify_booking_created(state, booking.clone());

    Ok((StatusCode::CREATED, Json(ApiResponse::data(booking))))
}

/// Best-effort side work after a successful create: owner lookup and event
/// publication. Detached from the request; failures are logged only.
fn notify_booking_created(state: AppState, booking: Booking) {
    tokio::spawn(async move {
        match state.users.find(booking.owner_id).await {
            Ok(Some(user)) => {
                tracing::debug!("booking {} created for {}", booking.id, MaskedEmail(&user.email));
            }
            Ok(None) => {
                tracing::warn!("booking {} created for unknown user {}", booking.id, booking.owner_id);
            }
            Err(e) => {
                tracing::warn!("owner lookup after booking create failed: {}", e);
            }
        }

        let event = BookingCreatedEvent {
            booking_id: booking.id,
            hotel_id: booking.hotel_id,
            owner_id: booking.owner_id,
            booking_date: booking.booking_date,
            number_of_nights: booking.number_of_nights,
            timestamp: Utc::now().timestamp(),
        };
        if let Ok(payload) = serde_json::to_string(&event) {
            let _ = state
                .events
                .publish("booking.created", &booking.id.to_string(), &payload)
                .await;
        }
    });
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .bookings
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {id}")))?;

    if !caller.can_manage(booking.owner_id) {
        return Err(ApiError::Forbidden(format!(
            "User {} is not authorized to update this booking",
            caller.id
        )));
    }

    if let Some(booking_date) = req.booking_date {
        state.booking_rules.check_date(booking_date, Utc::now().date_naive())?;
    }
    if let Some(nights) = req.number_of_nights {
        state.booking_rules.check_nights(nights)?;
    }

    let updated = state
        .bookings
        .update(
            id,
            BookingPatch {
                booking_date: req.booking_date,
                number_of_nights: req.number_of_nights,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {id}")))?;

    Ok(Json(ApiResponse::data(updated)))
}

async fn delete_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .bookings
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {id}")))?;

    if !caller.can_manage(booking.owner_id) {
        return Err(ApiError::Forbidden(format!(
            "User {} is not authorized to delete this booking",
            caller.id
        )));
    }

    state.bookings.delete(id).await?;

    Ok(Json(ApiResponse::data(json!({}))))
}
