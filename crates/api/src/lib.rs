//! Liquor Sales Forecast API Server
//!
//! REST API serving iterative sales forecasts, holdout analytics and
//! chat-completion narration over a preloaded feature table.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod context;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod telemetry;

pub use config::Settings;
pub use context::AppContext;
pub use error::ApiError;
pub use telemetry::init_logging;

/// Create the application router
pub fn create_router(ctx: Arc<AppContext>, settings: &Settings) -> Router {
    let core = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health))
        .route("/telemetry", get(routes::health::telemetry))
        .route("/predict", post(routes::forecast::predict))
        .route("/compare", post(routes::forecast::compare))
        .route("/metrics", get(routes::analytics::metrics))
        .route("/feature_importance", get(routes::analytics::feature_importance))
        .route("/seasonality", get(routes::analytics::seasonality))
        .route("/analysis/seasonality", get(routes::analytics::seasonality))
        .route("/stores", get(routes::analytics::stores));

    let mut narration = Router::new()
        .route("/api/chat", post(routes::narration::chat))
        .route("/ai_summary", post(routes::narration::ai_summary))
        .route("/ai-summary", post(routes::narration::ai_summary))
        .route(
            "/ai_feature_importance",
            post(routes::narration::ai_feature_importance),
        );

    if settings.rate_limit.enabled {
        match rate_limit::create_governor_config(&settings.rate_limit) {
            Some(config) => narration = narration.layer(GovernorLayer { config }),
            None => warn!("Rate limit quota is zero, narration routes are unlimited"),
        }
    }

    core.merge(narration)
        .route_layer(middleware::from_fn(telemetry::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.server.cors_origins))
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Load artifacts and run the server until ctrl-c
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let mut ctx = AppContext::load(&settings).await?;
    match telemetry::install_recorder() {
        Ok(handle) => ctx = ctx.with_telemetry(handle),
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }

    let app = create_router(Arc::new(ctx), &settings);
    let addr = settings.server.bind_addr();

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
