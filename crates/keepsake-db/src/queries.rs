use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use keepsake_types::{Category, Message, MessageRecord, TimelineEvent, TimelineRecord, today};

use crate::Database;

impl Database {
    // -- Messages --

    /// Append a message row. Duplicates are not rejected; the feed is
    /// trusted to carry one message per date.
    pub fn insert_message(&self, record: &MessageRecord) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (text, category, unlock_date) VALUES (?1, ?2, ?3)",
                rusqlite::params![record.text, record.category.as_str(), record.unlock_date],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// First message whose unlock date matches, if any. Duplicate dates are
    /// possible; the lowest row id wins.
    pub fn message_for_date(&self, date: NaiveDate) -> Result<Option<Message>> {
        self.with_conn(|conn| query_message_for_date(conn, date))
    }

    pub fn todays_message(&self) -> Result<Option<Message>> {
        self.message_for_date(today())
    }

    pub fn all_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(query_all_messages)
    }

    pub fn has_message_for_date(&self, date: NaiveDate) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE unlock_date = ?1",
                [date],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Mark every message for the given date as unlocked. Returns rows updated.
    pub fn unlock_messages_for(&self, date: NaiveDate) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET unlocked = 1 WHERE unlock_date = ?1",
                [date],
            )?;
            Ok(updated)
        })
    }

    pub fn unlock_todays_message(&self) -> Result<usize> {
        self.unlock_messages_for(today())
    }

    pub fn clear_all_messages(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM messages", [])?;
            Ok(())
        })
    }

    /// Replace the whole messages table with the given records, atomically.
    /// Either the new rows land or the old ones stay. Returns rows inserted.
    pub fn replace_all_messages(&self, records: &[MessageRecord]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM messages", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO messages (text, category, unlock_date) VALUES (?1, ?2, ?3)",
                )?;
                for record in records {
                    stmt.execute(rusqlite::params![
                        record.text,
                        record.category.as_str(),
                        record.unlock_date
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
    }

    // -- Timeline events --

    pub fn insert_timeline_event(&self, record: &TimelineRecord) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO timeline_events (event_date, title, description, photos, category)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    record.date,
                    record.title,
                    record.description,
                    record.photos,
                    record.category.as_str()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn all_timeline_events(&self) -> Result<Vec<TimelineEvent>> {
        self.with_conn(query_all_timeline_events)
    }

    /// Logical uniqueness check for events: the (date, title) pair. Not
    /// enforced by the schema, only by callers that choose to ask.
    pub fn has_timeline_event_for_date_and_title(
        &self,
        date: NaiveDate,
        title: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM timeline_events WHERE event_date = ?1 AND title = ?2",
                rusqlite::params![date, title],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn clear_all_timeline_events(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM timeline_events", [])?;
            Ok(())
        })
    }

    pub fn replace_all_timeline_events(&self, records: &[TimelineRecord]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM timeline_events", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO timeline_events (event_date, title, description, photos, category)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for record in records {
                    stmt.execute(rusqlite::params![
                        record.date,
                        record.title,
                        record.description,
                        record.photos,
                        record.category.as_str()
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
    }
}

fn query_message_for_date(conn: &Connection, date: NaiveDate) -> Result<Option<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, category, unlock_date, unlocked FROM messages
         WHERE unlock_date = ?1 ORDER BY id LIMIT 1",
    )?;

    let row = stmt.query_row([date], message_from_row).optional()?;
    Ok(row)
}

fn query_all_messages(conn: &Connection) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, category, unlock_date, unlocked FROM messages
         ORDER BY unlock_date ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([], message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_all_timeline_events(conn: &Connection) -> Result<Vec<TimelineEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, event_date, title, description, photos, category FROM timeline_events
         ORDER BY event_date ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(TimelineEvent {
                id: row.get(0)?,
                date: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                photos: row.get(4)?,
                category: Category::parse(&row.get::<_, String>(5)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        category: Category::parse(&row.get::<_, String>(2)?),
        unlock_date: row.get(3)?,
        unlocked: row.get(4)?,
    })
}
