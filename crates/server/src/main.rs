//! Renthub server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use fred::interfaces::ClientLike;
use renthub_api::{AppState, auth_middleware, router as api_router};
use renthub_common::{Config, RedisCache};
use renthub_core::{
    FavoriteService, HouseService, LandlordService, UserService, ViewingService,
};
use renthub_db::repositories::{
    FavoriteRepository, HouseRepository, LandlordRepository, UserRepository, ViewingRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "renthub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting renthub server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = renthub_db::init(&config).await?;
    info!("Connected to database");

    // Connect to Redis. The cache is best-effort: a failed connection at
    // startup is fatal, but a failing backend at runtime degrades to direct
    // store access.
    let fred_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let redis_client = fred::clients::Client::new(fred_config, None, None, None);
    redis_client.connect();
    redis_client.wait_for_connect().await?;
    let redis_client = Arc::new(redis_client);
    info!("Connected to Redis");

    let cache = Arc::new(RedisCache::new(
        redis_client,
        config.redis.prefix.clone(),
        Duration::from_millis(config.redis.op_timeout_ms),
    ));

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let landlord_repo = LandlordRepository::new(Arc::clone(&db));
    let house_repo = HouseRepository::new(Arc::clone(&db));
    let viewing_repo = ViewingRepository::new(Arc::clone(&db));
    let favorite_repo = FavoriteRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo, &config);
    let landlord_service = LandlordService::new(landlord_repo);
    let house_service = HouseService::new(house_repo.clone(), cache);
    let viewing_service = ViewingService::new(viewing_repo, house_service.clone());
    let favorite_service = FavoriteService::new(favorite_repo, house_repo);

    // Create app state
    let state = AppState {
        user_service,
        landlord_service,
        house_service,
        viewing_service,
        favorite_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
