use axum::{middleware, routing::get, Router};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxifleet::api::middleware::auth::require_auth;
use taxifleet::api::middleware::session::{create_session_layer, AppState};
use taxifleet::config::Config;
use taxifleet::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxifleet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting taxifleet server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Seed the first driver account if configured and needed
    db::bootstrap_admin(&pool, &config).await?;

    // Create session layer
    let session_secret = config.session_secret.expose_secret().as_bytes();
    let session_layer =
        create_session_layer(pool.clone(), session_secret, &config.base_url).await?;
    tracing::info!("Session layer initialized");

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Everything except the home page, login and health check requires a
    // logged-in driver
    let protected = Router::new()
        .merge(taxifleet::api::manufacturers::router())
        .merge(taxifleet::api::cars::router())
        .merge(taxifleet::api::drivers::router())
        .route_layer(middleware::from_fn(require_auth));

    // Build router
    let app = Router::new()
        .route("/health", get(taxifleet::api::health::health_check))
        .merge(taxifleet::api::auth::router())
        .merge(protected)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, cleaning up...");
}
