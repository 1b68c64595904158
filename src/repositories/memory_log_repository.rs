use crate::domain::LogRecord;
use crate::domain::repositories::LogRepository;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

/// In-process store for tests and local runs without MongoDB.
#[derive(Default)]
pub struct MemoryLogRepository {
    // Insertion order breaks ties between equal timestamps (newest wins).
    records: RwLock<Vec<LogRecord>>,
}

impl MemoryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogRepository for MemoryLogRepository {
    async fn insert(&self, record: &LogRecord) -> Result<()> {
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<LogRecord>> {
        let records = self.records.read().unwrap();
        let mut sorted: Vec<(usize, &LogRecord)> = records.iter().enumerate().collect();
        sorted.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        Ok(sorted
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn set_favorite(&self, id: &str, is_favorite: bool) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.is_favorite = is_favorite;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: &str) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        match records.iter().position(|r| r.id == id) {
            Some(pos) => {
                records.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|r| !wanted.contains(r.id.as_str()));
        Ok((before - records.len()) as u64)
    }
}
