use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{CreateReportRequestHandler, ReportLifecycleService};
use domain::{InMemoryReportRequestRepository, ReportRequestRepository};
use persistence::repositories::PgReportRequestRepository;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, report_requests};

/// Backing store for report requests, selected at startup.
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory(InMemoryReportRequestRepository),
}

impl Storage {
    /// Repository port over this backend.
    pub fn repository(&self) -> Arc<dyn ReportRequestRepository> {
        match self {
            Storage::Postgres(pool) => Arc::new(PgReportRequestRepository::new(pool.clone())),
            Storage::Memory(repo) => Arc::new(repo.clone()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Storage::Postgres(_) => "postgres",
            Storage::Memory(_) => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub create_handler: CreateReportRequestHandler,
    pub lifecycle: ReportLifecycleService,
}

impl AppState {
    pub fn new(config: Config, storage: Storage) -> Self {
        let repository = storage.repository();
        Self {
            config: Arc::new(config),
            storage,
            create_handler: CreateReportRequestHandler::new(repository.clone()),
            lifecycle: ReportLifecycleService::new(repository),
        }
    }
}

pub fn create_app(config: Config, storage: Storage) -> Router {
    let state = AppState::new(config, storage);
    let config = state.config.clone();

    let cors = if config.server.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let report_routes = Router::new()
        .route(
            "/api/v1/report-requests",
            post(report_requests::create_report_request),
        )
        .route(
            "/api/v1/report-requests/:id",
            get(report_requests::get_report_request),
        )
        // Worker-facing lifecycle transitions
        .route(
            "/api/v1/report-requests/:id/processing",
            post(report_requests::start_processing),
        )
        .route(
            "/api/v1/report-requests/:id/completion",
            post(report_requests::complete_report_request),
        )
        .route(
            "/api/v1/report-requests/:id/failure",
            post(report_requests::fail_report_request),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(report_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
