use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stayline_core::identity::{Caller, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims carried by the bearer token: `sub` is the user id, `role`
/// one of "user" | "admin".
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Resolves the caller from the Authorization header and injects an
/// explicit `Caller` into the request extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthenticated("Expected a bearer token".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;

    let id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| ApiError::Unauthenticated("Malformed subject claim".to_string()))?;
    let role = Role::parse(&token_data.claims.role)
        .ok_or_else(|| ApiError::Unauthenticated("Unknown role claim".to_string()))?;

    req.extensions_mut().insert(Caller { id, role });

    Ok(next.run(req).await)
}
