use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                text        TEXT NOT NULL,
                category    TEXT NOT NULL,
                unlock_date TEXT NOT NULL,
                unlocked    INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_messages_unlock_date
                ON messages(unlock_date);

            CREATE TABLE timeline_events (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                event_date  TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                photos      TEXT NOT NULL DEFAULT '',
                category    TEXT NOT NULL
            );

            CREATE INDEX idx_timeline_events_date
                ON timeline_events(event_date);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}
