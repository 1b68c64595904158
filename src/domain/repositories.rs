use crate::domain::LogRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Document store holding log records, keyed by `LogRecord::id`.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn insert(&self, record: &LogRecord) -> Result<()>;
    /// Records ordered by `created_at` descending.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<LogRecord>>;
    /// Returns the number of matched records (0 or 1).
    async fn set_favorite(&self, id: &str, is_favorite: bool) -> Result<u64>;
    async fn delete_one(&self, id: &str) -> Result<u64>;
    async fn delete_many(&self, ids: &[String]) -> Result<u64>;
}
