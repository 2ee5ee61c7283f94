use axum::{
    extract::{Path, State},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use stayline_core::hotel::{
    self, CreateHotelRequest, HotelPatch, NewHotel, UpdateHotelRequest,
};
use stayline_core::identity::Caller;
use stayline_shared::response::ApiResponse;

use crate::error::ApiError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Reads are public; mutations require an authenticated administrator.
pub fn routes(state: &AppState) -> Router<AppState> {
    let auth = from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route("/v1/hotels", get(list_hotels).post(create_hotel.layer(auth.clone())))
        .route(
            "/v1/hotels/{hotel_id}",
            get(get_hotel)
                .put(update_hotel.layer(auth.clone()))
                .delete(delete_hotel.layer(auth)),
        )
}

fn require_admin(caller: &Caller) -> Result<(), ApiError> {
    if !caller.is_admin() {
        return Err(ApiError::Forbidden("Administrator role required".to_string()));
    }
    Ok(())
}

async fn list_hotels(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let hotels = state.hotels.list().await?;
    Ok(Json(ApiResponse::list(hotels)))
}

async fn get_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let hotel = state
        .hotels
        .find(hotel_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No hotel with the id of {hotel_id}")))?;

    Ok(Json(ApiResponse::data(hotel)))
}

async fn create_hotel(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateHotelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&caller)?;

    hotel::check_name(&req.name)?;
    hotel::check_address(&req.address)?;
    hotel::check_tel(&req.tel)?;

    let created = state
        .hotels
        .create(NewHotel {
            name: req.name,
            address: req.address,
            tel: req.tel,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(created))))
}

async fn update_hotel(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(hotel_id): Path<Uuid>,
    Json(req): Json<UpdateHotelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&caller)?;

    if let Some(name) = &req.name {
        hotel::check_name(name)?;
    }
    if let Some(address) = &req.address {
        hotel::check_address(address)?;
    }
    if let Some(tel) = &req.tel {
        hotel::check_tel(tel)?;
    }

    let updated = state
        .hotels
        .update(
            hotel_id,
            HotelPatch {
                name: req.name,
                address: req.address,
                tel: req.tel,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No hotel with the id of {hotel_id}")))?;

    Ok(Json(ApiResponse::data(updated)))
}

async fn delete_hotel(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(hotel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&caller)?;

    let deleted = state.hotels.delete(hotel_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("No hotel with the id of {hotel_id}")));
    }

    Ok(Json(ApiResponse::data(json!({}))))
}
