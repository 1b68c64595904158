use alert_logger::Config;
use alert_logger::domain::repositories::LogRepository;
use alert_logger::domain::{LogRecord, now_millis};
use alert_logger::infrastructure::logging;
use alert_logger::repositories::MongoLogRepository;
use chrono::{DateTime, Duration, Local, Utc};
use clap::Parser;
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

const KINDS: &[&str] = &["Call", "SMS", "App notification"];
const APPS: &[&str] = &["KakaoTalk", "Instagram", "Facebook", "YouTube"];

/// Fills the configured collection with sample logs.
#[derive(Parser, Debug)]
#[command(name = "seed_logs")]
struct Args {
    /// Number of logs to insert
    #[arg(short, long, default_value_t = 200)]
    count: u32,

    /// Seconds between consecutive sample timestamps
    #[arg(short, long, default_value_t = 10)]
    spacing_secs: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::from_env()?;
    let _log_guard = logging::init(None);

    let repo = MongoLogRepository::connect(&config).await?;
    repo.ensure_indexes().await?;
    let mut rng = rand::rng();
    let now = now_millis();

    for i in 0..args.count {
        let created_at = sample_time(now, i, args.spacing_secs)
            .ok_or("--spacing-secs times --count runs past the representable date range")?;
        let record = LogRecord {
            id: Uuid::new_v4().to_string(),
            content: format!("Sample log message {}", i + 1),
            app_name: APPS.choose(&mut rng).copied().unwrap_or_default().to_string(),
            time: created_at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            created_at,
            is_favorite: rng.random_bool(0.5),
            kind: KINDS.choose(&mut rng).map(|k| k.to_string()),
        };
        repo.insert(&record).await?;
    }

    tracing::info!(
        count = args.count,
        database = %config.database,
        collection = %config.collection,
        "sample logs inserted"
    );
    Ok(())
}

/// Timestamp of the `index`-th sample, stepping back `spacing_secs` each time.
fn sample_time(now: DateTime<Utc>, index: u32, spacing_secs: i64) -> Option<DateTime<Utc>> {
    let offset = i64::from(index).checked_mul(spacing_secs)?;
    now.checked_sub_signed(Duration::try_seconds(offset)?)
}
