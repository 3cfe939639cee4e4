//! Application startup and lifecycle management.

use crate::config::{CorsConfig, ToyConfig};
use crate::handlers;
use crate::services::{ListingRepository, ListingStore, MongoDb};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, RequestId, REQUEST_ID_HEADER},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ToyConfig,
    pub store: Arc<dyn ListingStore>,
}

/// Builds the full HTTP surface over the given state.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/searchByToyName/:text",
            get(handlers::search_by_toy_name),
        )
        .route("/toys_category", get(handlers::list_by_category))
        .route("/trending_toys", get(handlers::list_trending))
        .route(
            "/toys",
            get(handlers::list_toys).post(handlers::add_toy),
        )
        .route("/toy/:id", get(handlers::get_toy))
        .route("/my_toys", get(handlers::list_my_toys))
        .route(
            "/my_toys/:id",
            put(handlers::update_my_toy).delete(handlers::delete_my_toy),
        )
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .map_or("-", |id| id.0.as_str());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// `*` cannot be sent together with credentials, so a wildcard is served by
/// echoing the caller's origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    db: MongoDb,
    state: AppState,
}

impl Application {
    /// Connects the store, prepares the collection and binds the listener.
    ///
    /// Index creation and the connectivity ping are best effort: failures are
    /// logged and the server still starts.
    pub async fn build(config: ToyConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb, &config.service_name).await?;

        if let Err(e) = db.initialize_indexes().await {
            tracing::warn!("Continuing without the toy name index: {}", e);
        }

        match db.health_check().await {
            Ok(()) => tracing::info!("Pinged MongoDB deployment: connection established"),
            Err(e) => tracing::warn!("MongoDB ping failed at startup: {}", e),
        }

        let repository = ListingRepository::new(&db);
        let state = AppState {
            config: config.clone(),
            store: Arc::new(repository),
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server running on port {}", port);

        Ok(Self {
            port,
            listener,
            db,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &MongoDb {
        &self.db
    }

    /// Serves until Ctrl-C or SIGTERM, then closes the MongoDB client.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })?;

        self.db.shutdown().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
