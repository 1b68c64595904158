use crate::config::Config;
use crate::domain::LogRecord;
use crate::domain::repositories::LogRepository;
use crate::error::Result;
use async_trait::async_trait;
use chrono::DateTime;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Bson, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Deserializer, Serialize};

/// Stored shape of a record. `_id` is left to the server and never read back.
///
/// Older writers stored whatever the client sent, so the display fields are
/// read with the same leniency as inbound frames.
#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    content: String,
    #[serde(rename = "appName", default, deserialize_with = "lenient_text")]
    app_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    time: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "isFavorite", default, deserialize_with = "lenient_bool")]
    is_favorite: bool,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_text"
    )]
    kind: Option<String>,
}

fn bson_text(value: Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::Null | Bson::Undefined => None,
        _ => Some(String::new()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Bson>::deserialize(deserializer)?.and_then(bson_text))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(matches!(Option::<Bson>::deserialize(deserializer)?, Some(Bson::Boolean(true))))
}

impl From<&LogRecord> for LogDocument {
    fn from(record: &LogRecord) -> Self {
        Self {
            id: record.id.clone(),
            content: record.content.clone(),
            app_name: record.app_name.clone(),
            time: record.time.clone(),
            created_at: bson::DateTime::from_millis(record.created_at.timestamp_millis()),
            is_favorite: record.is_favorite,
            kind: record.kind.clone(),
        }
    }
}

impl From<LogDocument> for LogRecord {
    fn from(doc: LogDocument) -> Self {
        Self {
            id: doc.id,
            content: doc.content,
            app_name: doc.app_name,
            time: doc.time,
            created_at: DateTime::from_timestamp_millis(doc.created_at.timestamp_millis())
                .unwrap_or_default(),
            is_favorite: doc.is_favorite,
            kind: doc.kind,
        }
    }
}

pub struct MongoLogRepository {
    collection: Collection<LogDocument>,
}

impl MongoLogRepository {
    /// Opens the configured collection. The driver connects lazily, so this
    /// only fails on a malformed connection string.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let collection = client
            .database(&config.database)
            .collection::<LogDocument>(&config.collection);
        Ok(Self { collection })
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let by_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let by_created = IndexModel::builder().keys(doc! { "createdAt": -1 }).build();
        self.collection.create_indexes([by_id, by_created]).await?;
        Ok(())
    }
}

#[async_trait]
impl LogRepository for MongoLogRepository {
    async fn insert(&self, record: &LogRecord) -> Result<()> {
        self.collection.insert_one(LogDocument::from(record)).await?;
        Ok(())
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<LogRecord>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit as i64)
            .await?;
        let docs: Vec<LogDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(LogRecord::from).collect())
    }

    async fn set_favorite(&self, id: &str, is_favorite: bool) -> Result<u64> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": { "isFavorite": is_favorite } })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, id: &str) -> Result<u64> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }
}
