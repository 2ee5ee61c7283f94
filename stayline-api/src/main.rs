use std::net::SocketAddr;
use std::sync::Arc;

use stayline_api::{app, state::{AppState, AuthConfig}};
use stayline_store::{
    DbClient, EventProducer, PgBookingRepository, PgHotelRepository, PgTransferRepository,
    PgUserRepository, RedisClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stayline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = stayline_store::app_config::Config::load()?;
    tracing::info!("Starting Stayline API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let redis = Arc::new(RedisClient::new(&config.redis.url).await?);
    let events = Arc::new(EventProducer::new(&config.kafka.brokers)?);

    let state = AppState {
        bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        transfers: Arc::new(PgTransferRepository::new(db.pool.clone())),
        hotels: Arc::new(PgHotelRepository::new(db.pool.clone())),
        users: Arc::new(PgUserRepository::new(db.pool.clone())),
        redis,
        events,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        booking_rules: config.booking_rules,
        rate_limit: config.rate_limit.clone(),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
