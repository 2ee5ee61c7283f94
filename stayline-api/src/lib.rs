use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use stayline_shared::response::ApiResponse;

pub mod bookings;
pub mod error;
pub mod hotels;
pub mod middleware;
pub mod state;
pub mod transfers;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(bookings::routes(&state))
        .merge(transfers::routes(&state))
        .merge(hotels::routes(&state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    // No peer address when the router is driven without a TCP listener
    // (in-process tests); skip the limiter there.
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().cloned() else {
        return next.run(req).await;
    };

    let key = format!("ratelimit:{}", addr.ip());
    let limit = state.rate_limit.max_requests;
    let window = state.rate_limit.window_seconds;

    match state.redis.check_rate_limit(&key, limit, window).await {
        Ok(true) => next.run(req).await,
        Ok(false) => (
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::<()>::error("Rate limit exceeded")),
        )
            .into_response(),
        Err(_) => next.run(req).await, // Fail open
    }
}
