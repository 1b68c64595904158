use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Json,
};
use serde_json::Value;

use crate::domain::{BulkDeleted, FavoriteUpdated, LogDeleted, LogQuery, LogRecord};
use crate::error::AppError;
use crate::state::AppState;

// Extractor rejections are folded into `InvalidInput` so every bad request
// is a 400 with the same body shape.

pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<Vec<LogRecord>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    Ok(Json(state.logs.list(&query).await?))
}

pub async fn update_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FavoriteUpdated>, AppError> {
    let Json(body) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    Ok(Json(state.logs.set_favorite(&id, &body).await?))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LogDeleted>, AppError> {
    Ok(Json(state.logs.delete(&id).await?))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BulkDeleted>, AppError> {
    let Json(body) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    Ok(Json(state.logs.bulk_delete(&body).await?))
}
