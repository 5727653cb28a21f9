use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use common::types::MessageBody;
use models::{Prize, PrizeInput, PrizeUpdate, StatusFilter};
use serde::Deserialize;
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: StatusFilter,
}

fn invalid_body(rejection: JsonRejection) -> JsonApiError {
    warn!(error = %rejection.body_text(), "rejected request body");
    JsonApiError::bad_request("Invalid request body")
}

/// GET /api/prizes[?status=all|available|redeemed]
pub async fn list_prizes(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Prize>>, JsonApiError> {
    let Query(query) = query.map_err(|e| {
        warn!(error = %e.body_text(), "rejected list query");
        JsonApiError::bad_request("Invalid status filter")
    })?;
    Ok(Json(state.prizes.list(query.status).await))
}

/// POST /api/prizes
pub async fn create_prize(
    State(state): State<AppState>,
    body: Result<Json<PrizeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Prize>), JsonApiError> {
    let Json(input) = body.map_err(invalid_body)?;
    let prize = state
        .prizes
        .create(input)
        .await
        .map_err(|e| JsonApiError::from_service(e, "Failed to create prize"))?;
    Ok((StatusCode::CREATED, Json(prize)))
}

/// GET /api/prizes/:id
pub async fn get_prize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prize>, JsonApiError> {
    state.prizes.get_by_id(&id).await.map(Json).ok_or_else(JsonApiError::not_found)
}

/// PATCH /api/prizes/:id; the path id wins over any id in the body.
pub async fn update_prize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PrizeUpdate>, JsonRejection>,
) -> Result<Json<Prize>, JsonApiError> {
    let Json(patch) = body.map_err(invalid_body)?;
    state
        .prizes
        .update(&id, patch)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service(e, "Failed to update prize"))
}

/// DELETE /api/prizes/:id
pub async fn delete_prize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, JsonApiError> {
    match state.prizes.delete(&id).await {
        Ok(true) => Ok(Json(MessageBody::new("Prize deleted successfully"))),
        Ok(false) => Err(JsonApiError::not_found()),
        Err(e) => Err(JsonApiError::from_service(e, "Failed to delete prize")),
    }
}
