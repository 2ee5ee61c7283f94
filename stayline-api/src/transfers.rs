use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use stayline_core::booking::Booking;
use stayline_core::identity::Caller;
use stayline_core::transfer::{
    ApprovalProgress, ApprovalRequest, ApprovalRole, CreateTransferRequest, NewTransfer, Transfer,
    TransferPatch,
};
use stayline_shared::models::events::{TransferCompletedEvent, TransferRejectedEvent};
use stayline_shared::response::ApiResponse;

use crate::error::ApiError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/transfers", get(list_transfers).post(create_transfer))
        .route(
            "/v1/transfers/{id}",
            get(get_transfer).put(update_transfer).delete(delete_transfer),
        )
        .route("/v1/transfers/approve/{id}", put(approve_transfer))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
}

async fn list_transfers(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    // Admins see every transfer; everyone else only the ones they sent.
    let sender = (!caller.is_admin()).then_some(caller.id);
    let transfers = state.transfers.list(sender).await?;
    Ok(Json(ApiResponse::list(transfers)))
}

async fn get_transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transfer = state
        .transfers
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No transfer with the id of {id}")))?;

    let involved = caller.id == transfer.sender_id || caller.id == transfer.receiver_id;
    if !involved && !caller.is_admin() {
        return Err(ApiError::Forbidden("Not authorized to view this transfer".to_string()));
    }

    Ok(Json(ApiResponse::data(transfer)))
}

async fn create_transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateTransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .bookings
        .find(req.booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {}", req.booking_id)))?;

    // Only the current holder may hand a booking off.
    if booking.owner_id != caller.id {
        return Err(ApiError::Forbidden(
            "Only the current owner of the booking may start a transfer".to_string(),
        ));
    }

    // The receiver becomes the owner on completion, so they must exist.
    state
        .users
        .find(req.receiver_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No user with the id of {}", req.receiver_id)))?;

    let transfer = state
        .transfers
        .create(NewTransfer {
            sender_id: caller.id,
            receiver_id: req.receiver_id,
            booking_id: req.booking_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(transfer))))
}

async fn update_transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TransferPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let transfer = state
        .transfers
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No transfer with the id of {id}")))?;

    if !caller.can_manage(transfer.sender_id) {
        return Err(ApiError::Forbidden(format!(
            "User {} is not authorized to update this transfer",
            caller.id
        )));
    }

    let updated = state
        .transfers
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No transfer with the id of {id}")))?;

    Ok(Json(ApiResponse::data(updated)))
}

async fn delete_transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transfer = state
        .transfers
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No transfer with the id of {id}")))?;

    if !caller.can_manage(transfer.sender_id) {
        return Err(ApiError::Forbidden(format!(
            "User {} is not authorized to delete this transfer",
            caller.id
        )));
    }

    state.transfers.delete(id).await?;

    Ok(Json(ApiResponse::data(json!({}))))
}

/// Approval transition. One request records one approval; once both the
/// receiver and an administrator have approved, the booking is handed to
/// the receiver and the transfer record disappears in the same atomic
/// store operation.
async fn approve_transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Response, ApiError> {
    let transfer = state
        .transfers
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No transfer with the id of {id}")))?;

    let Some(role) = ApprovalRole::attribute(&caller, &transfer) else {
        return Err(ApiError::Forbidden(
            "Only the receiver or an administrator may decide on this transfer".to_string(),
        ));
    };

    if !req.is_approved() {
        state.transfers.delete(id).await?;
        notify_transfer_rejected(&state, &transfer, caller.id);
        return Ok(Json(ApiResponse::<()>::message("Rejected and deleted transfer")).into_response());
    }

    // A None here means the record vanished under us (concurrent
    // completion or rejection); fall through and report current state.
    let _ = state.transfers.set_approval(id, role).await?;

    if let Some(booking) = state.transfers.complete_if_approved(id).await? {
        notify_transfer_completed(&state, &transfer, &booking);
        return Ok(Json(ApiResponse::data(booking)).into_response());
    }

    // This request did not complete the handoff: either an approval is
    // still missing, or a concurrent approver beat us to the final step.
    match state.transfers.find(id).await? {
        Some(current) => match current.progress() {
            ApprovalProgress::Waiting(pending) => {
                Ok(Json(ApiResponse::<()>::message(format!("Wait for {pending} approval"))).into_response())
            }
            ApprovalProgress::Ready => {
                // Both approvals landed between our completion attempt and
                // the re-read; try once more, or defer to the racer that
                // already finished.
                match state.transfers.complete_if_approved(id).await? {
                    Some(booking) => {
                        notify_transfer_completed(&state, &transfer, &booking);
                        Ok(Json(ApiResponse::data(booking)).into_response())
                    }
                    None => completed_booking(&state, &transfer).await,
                }
            }
        },
        None => completed_booking(&state, &transfer).await,
    }
}

/// The transfer is gone and this request did not remove it: a concurrent
/// approver finished the handoff. Completion is idempotent, so report the
/// booking as it now stands.
async fn completed_booking(state: &AppState, transfer: &Transfer) -> Result<Response, ApiError> {
    let booking = state
        .bookings
        .find(transfer.booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No booking with the id of {}", transfer.booking_id)))?;

    Ok(Json(ApiResponse::data(booking)).into_response())
}

/// Best-effort rejection event, detached from the response.
fn notify_transfer_rejected(state: &AppState, transfer: &Transfer, rejected_by: Uuid) {
    let events = state.events.clone();
    let event = TransferRejectedEvent {
        transfer_id: transfer.id,
        booking_id: transfer.booking_id,
        rejected_by,
        timestamp: Utc::now().timestamp(),
    };

    tokio::spawn(async move {
        if let Ok(payload) = serde_json::to_string(&event) {
            let _ = events
                .publish("transfer.rejected", &event.transfer_id.to_string(), &payload)
                .await;
        }
    });
}

/// Best-effort completion event, detached from the response.
fn notify_transfer_completed(state: &AppState, transfer: &Transfer, booking: &Booking) {
    let events = state.events.clone();
    let event = TransferCompletedEvent {
        transfer_id: transfer.id,
        booking_id: booking.id,
        sender_id: transfer.sender_id,
        receiver_id: transfer.receiver_id,
        timestamp: Utc::now().timestamp(),
    };

    tokio::spawn(async move {
        if let Ok(payload) = serde_json::to_string(&event) {
            let _ = events
                .publish("transfer.completed", &event.transfer_id.to_string(), &payload)
                .await;
        }
    });
}
