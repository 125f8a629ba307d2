use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use creature_hunt_backend::{api, config::Config, db::Database, metrics, presence::PresenceCache};

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(Err(_)) => {
            tracing::warn!("FRONTEND_ORIGIN is not a valid header value, allowing any origin");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("creature_hunt_backend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load();
    metrics::register_metrics();

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");
    if config.seed_on_start {
        db.seed(Utc::now()).await.expect("Failed to seed database");
    }
    let db = Arc::new(db);
    let presence = PresenceCache::new(config.presence_ttl);

    let app = api::router(db, presence)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.frontend_origin.as_deref()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Creature hunt backend listening on {addr}");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
