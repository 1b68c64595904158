use crate::domain::repositories::LogRepository;
use crate::domain::{BulkDeleted, FavoriteUpdated, LogDeleted, LogQuery, LogRecord, MAX_LIMIT};
use crate::error::{AppError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Validates requests and maps them onto the repository.
#[derive(Clone)]
pub struct LogService {
    repository: Arc<dyn LogRepository>,
}

impl LogService {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    /// Turns one realtime frame into a stored record. Frames that are not a
    /// JSON object fail with `AppError::Parse` and nothing is written.
    pub async fn ingest(&self, frame: &str) -> Result<LogRecord> {
        let payload: Map<String, Value> = serde_json::from_str(frame)?;
        let record = LogRecord::from_payload(&payload);
        self.repository.insert(&record).await?;
        tracing::debug!(id = %record.id, app = %record.app_name, "log stored");
        Ok(record)
    }

    pub async fn list(&self, query: &LogQuery) -> Result<Vec<LogRecord>> {
        if query.skip < 0 {
            return Err(AppError::InvalidInput("skip must be >= 0".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&query.limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        self.repository
            .find_page(query.skip as u64, query.limit as u64)
            .await
    }

    pub async fn set_favorite(&self, id: &str, body: &Value) -> Result<FavoriteUpdated> {
        let is_favorite = body
            .get("isFavorite")
            .and_then(Value::as_bool)
            .ok_or_else(|| AppError::InvalidInput("isFavorite must be a boolean".to_string()))?;

        if self.repository.set_favorite(id, is_favorite).await? == 0 {
            return Err(AppError::NotFound(format!("log {id} not found")));
        }
        Ok(FavoriteUpdated {
            id: id.to_string(),
            is_favorite,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<LogDeleted> {
        if self.repository.delete_one(id).await? == 0 {
            return Err(AppError::NotFound(format!("log {id} not found")));
        }
        Ok(LogDeleted {
            id: id.to_string(),
            deleted: true,
        })
    }

    /// Deletes every record named in `ids`. The response echoes the request
    /// list as given, not just the ids that were actually removed.
    pub async fn bulk_delete(&self, body: &Value) -> Result<BulkDeleted> {
        let requested = match body.get("ids") {
            Some(Value::Array(ids)) if !ids.is_empty() => ids,
            _ => {
                return Err(AppError::InvalidInput(
                    "ids must be a non-empty list".to_string(),
                ));
            }
        };

        let ids: Vec<String> = requested
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        let deleted_count = if ids.is_empty() {
            0
        } else {
            self.repository.delete_many(&ids).await?
        };

        if deleted_count == 0 {
            return Err(AppError::NotFound("no matching logs to delete".to_string()));
        }
        Ok(BulkDeleted {
            deleted_count,
            deleted_ids: requested.clone(),
        })
    }
}
