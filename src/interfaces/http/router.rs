//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::PosService;
use crate::interfaces::http::common::ErrorBody;
use crate::interfaces::http::modules::admin::{self, AdminState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{self, http_metrics_middleware, MetricsState};
use crate::interfaces::http::modules::pos::{self, PosState};
use crate::interfaces::http::modules::request_id::request_id_middleware;

/// State shared by every route; handlers pick their slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<PosService>,
    pub metrics: PrometheusHandle,
    pub admin_token: Option<Arc<str>>,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(service: Arc<PosService>, metrics: PrometheusHandle) -> Self {
        Self {
            service,
            metrics,
            admin_token: None,
            started_at: Arc::new(Instant::now()),
        }
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.map(Arc::from);
        self
    }
}

impl FromRef<ApiState> for PosState {
    fn from_ref(s: &ApiState) -> Self {
        PosState {
            service: Arc::clone(&s.service),
        }
    }
}

impl FromRef<ApiState> for AdminState {
    fn from_ref(s: &ApiState) -> Self {
        AdminState {
            service: Arc::clone(&s.service),
            token: s.admin_token.clone(),
        }
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        HealthState {
            service: Arc::clone(&s.service),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<ApiState> for MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        MetricsState {
            handle: s.metrics.clone(),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        metrics::handlers::prometheus_metrics,
        pos::handlers::list_pos,
        pos::handlers::get_pos,
        pos::handlers::create_pos,
        pos::handlers::update_pos,
        admin::handlers::reset_pos,
    ),
    components(
        schemas(
            ErrorBody,
            health::handlers::HealthResponse,
            health::handlers::ComponentHealth,
            pos::PosResponse,
            pos::CreatePosRequest,
            pos::UpdatePosRequest,
        )
    ),
    tags(
        (name = "Points of Sale", description = "Campus coffee point-of-sale directory"),
        (name = "Admin", description = "Administrative reset, enabled per deployment"),
        (name = "Health", description = "Liveness and storage reachability"),
        (name = "Monitoring", description = "Prometheus metrics"),
    ),
    info(
        title = "Campus Coffee POS API",
        version = "1.0.0",
        description = "Directory of coffee points of sale across the university campuses",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the complete HTTP application.
///
/// `DELETE /api/admin/pos` is only routed when `admin_reset_enabled` is set.
pub fn create_api_router(state: ApiState, admin_reset_enabled: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut routes = Router::new()
        .route("/api/pos", get(pos::list_pos).post(pos::create_pos))
        .route("/api/pos/{id}", get(pos::get_pos).put(pos::update_pos))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    if admin_reset_enabled {
        let admin_state = AdminState::from_ref(&state);
        routes = routes.route(
            "/api/admin/pos",
            delete(admin::reset_pos).route_layer(middleware::from_fn_with_state(
                admin_state,
                admin::require_admin_token,
            )),
        );
    }

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes.with_state(state))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

// ── Tests ──────────────────────────────────────────────────────
