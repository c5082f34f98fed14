use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use keepsake_db::Database;
use keepsake_sync::{HttpRemoteSource, RecordKind, SyncEngine, SyncService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepsake=info".into()),
        )
        .init();

    // Config
    let feed_url = std::env::var("KEEPSAKE_FEED_URL")
        .unwrap_or_else(|_| "https://derschmachtin.github.io".into());
    let db_path: PathBuf = std::env::var("KEEPSAKE_DB_PATH")
        .unwrap_or_else(|_| "keepsake.db".into())
        .into();
    let sync_timeout_secs: u64 = std::env::var("KEEPSAKE_SYNC_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let db = Arc::new(Database::open(&db_path)?);

    let source = HttpRemoteSource::new(feed_url)?;
    let engine = SyncEngine::new(db.clone(), source)
        .with_timeout(Duration::from_secs(sync_timeout_secs));
    let sync = SyncService::spawn(engine);

    // Refresh both kinds; a failed sync degrades to whatever is cached.
    for kind in [RecordKind::Messages, RecordKind::Timeline] {
        match sync.request(kind).await {
            Ok(outcome) if outcome.changed > 0 => {
                info!("Synced {}: {} records updated", kind, outcome.changed)
            }
            Ok(_) => info!("{} already up to date", kind),
            Err(e) => warn!("Sync failed for {}: {} - using local data", kind, e),
        }
    }

    match db.todays_message()? {
        Some(message) => {
            println!("Today's message ({}):", message.category);
            println!("  {}", message.text);
            db.unlock_todays_message()?;
        }
        None => println!("No message for today."),
    }

    let events = db.all_timeline_events()?;
    if events.is_empty() {
        println!("\nTimeline is empty.");
    } else {
        println!("\nTimeline:");
        for event in &events {
            println!("  {} [{}] {}", event.date, event.category, event.title);
            if !event.description.is_empty() {
                println!("      {}", event.description);
            }
            let photos = event.photo_paths();
            if !photos.is_empty() {
                println!("      {} photo(s)", photos.len());
            }
        }
    }

    Ok(())
}
