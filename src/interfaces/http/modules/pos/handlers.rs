//! POS REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreatePosRequest, PosResponse, UpdatePosRequest};
use crate::application::PosService;
use crate::domain::PosId;
use crate::interfaces::http::common::{ApiError, ErrorBody, ValidatedJson};

#[derive(Clone)]
pub struct PosState {
    pub service: Arc<PosService>,
}

#[utoipa::path(
    get,
    path = "/api/pos",
    tag = "Points of Sale",
    responses(
        (status = 200, description = "All points of sale in creation order", body = Vec<PosResponse>)
    )
)]
pub async fn list_pos(State(state): State<PosState>) -> Result<Json<Vec<PosResponse>>, ApiError> {
    let all = state.service.retrieve_all().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/pos/{id}",
    tag = "Points of Sale",
    params(("id" = i32, Path, description = "POS id")),
    responses(
        (status = 200, description = "POS details", body = PosResponse),
        (status = 404, description = "No POS with this id", body = ErrorBody)
    )
)]
pub async fn get_pos(
    State(state): State<PosState>,
    Path(id): Path<PosId>,
) -> Result<Json<PosResponse>, ApiError> {
    let pos = state.service.retrieve_by_id(id).await?;
    Ok(Json(pos.into()))
}

#[utoipa::path(
    post,
    path = "/api/pos",
    tag = "Points of Sale",
    request_body = CreatePosRequest,
    responses(
        (status = 201, description = "POS created", body = PosResponse),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    )
)]
pub async fn create_pos(
    State(state): State<PosState>,
    ValidatedJson(req): ValidatedJson<CreatePosRequest>,
) -> Result<(StatusCode, Json<PosResponse>), ApiError> {
    let candidate = req.into_new_pos()?;
    let pos = state.service.create(candidate).await?;
    Ok((StatusCode::CREATED, Json(pos.into())))
}

#[utoipa::path(
    put,
    path = "/api/pos/{id}",
    tag = "Points of Sale",
    params(("id" = i32, Path, description = "POS id")),
    request_body = UpdatePosRequest,
    responses(
        (status = 200, description = "POS updated", body = PosResponse),
        (status = 400, description = "Malformed JSON", body = ErrorBody),
        (status = 404, description = "No POS with this id", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    )
)]
pub async fn update_pos(
    State(state): State<PosState>,
    Path(id): Path<PosId>,
    ValidatedJson(req): ValidatedJson<UpdatePosRequest>,
) -> Result<Json<PosResponse>, ApiError> {
    let patch = req.into_patch(id)?;
    let pos = state.service.update(id, patch).await?;
    Ok(Json(pos.into()))
}
