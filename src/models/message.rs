use rusqlite::{Connection, params};
use serde::Serialize;

/// A directed note between principals. Append-only: there is deliberately no
/// update or delete function in this module.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub receiver_id: i64,
    pub body: String,
    pub sent_on: String,
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get("id")?,
        sender_id: row.get("sender_id")?,
        sender_name: row.get("sender_name")?,
        receiver_id: row.get("receiver_id")?,
        body: row.get("body")?,
        sent_on: row.get("sent_on")?,
    })
}

pub fn create(
    conn: &Connection,
    sender_id: i64,
    sender_name: &str,
    receiver_id: i64,
    body: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO messages (sender_id, sender_name, receiver_id, body) \
         VALUES (?1, ?2, ?3, ?4)",
        params![sender_id, sender_name, receiver_id, body],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_for_receiver(conn: &Connection, receiver_id: i64) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_id, sender_name, receiver_id, body, sent_on \
         FROM messages WHERE receiver_id = ?1 ORDER BY sent_on DESC",
    )?;
    let rows = stmt.query_map(params![receiver_id], row_to_message)?;
    rows.collect()
}

pub fn list_for_sender(conn: &Connection, sender_id: i64) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_id, sender_name, receiver_id, body, sent_on \
         FROM messages WHERE sender_id = ?1 ORDER BY sent_on DESC",
    )?;
    let rows = stmt.query_map(params![sender_id], row_to_message)?;
    rows.collect()
}
