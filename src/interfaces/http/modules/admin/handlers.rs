//! Administrative reset
//!
//! `DELETE /api/admin/pos` removes every record. The route exists only when
//! reset is enabled in configuration, and when an admin token is configured
//! callers must present it in `X-Admin-Token`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::application::PosService;
use crate::interfaces::http::common::{error_code, ApiError, ErrorBody};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Clone)]
pub struct AdminState {
    pub service: Arc<PosService>,
    pub token: Option<Arc<str>>,
}

/// Rejects requests whose `X-Admin-Token` does not match the configured token.
pub async fn require_admin_token(
    State(state): State<AdminState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = &state.token {
        let presented = request
            .headers()
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        if presented != Some(expected.as_ref()) {
            warn!(path = %request.uri().path(), "Admin request with missing or wrong token");
            let body = ErrorBody::new(error_code::FORBIDDEN, "Admin token required");
            return (StatusCode::FORBIDDEN, Json(body)).into_response();
        }
    }
    next.run(request).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/pos",
    tag = "Admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Admin token, when one is configured")),
    responses(
        (status = 204, description = "All points of sale removed"),
        (status = 403, description = "Missing or wrong admin token", body = ErrorBody)
    )
)]
pub async fn reset_pos(State(state): State<AdminState>) -> Result<StatusCode, ApiError> {
    state.service.clear().await?;
    info!("POS directory reset via admin endpoint");
    Ok(StatusCode::NO_CONTENT)
}
