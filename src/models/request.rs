use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

/// A generic approval-workflow record. Created by students or faculty,
/// decided once by admin/HOD (or the targeted faculty), immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: i64,
    pub requester_id: i64,
    pub target_id: Option<i64>,
    pub request_type: String,
    pub description: String,
    pub status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

const SELECT_REQUEST: &str = "\
    SELECT r.id, r.requester_id, r.target_id, r.request_type, r.description, \
           r.status, r.review_notes, r.reviewed_by, r.reviewed_at, \
           r.created_at, r.updated_at \
    FROM requests r";

fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<Request> {
    Ok(Request {
        id: row.get("id")?,
        requester_id: row.get("requester_id")?,
        target_id: row.get("target_id")?,
        request_type: row.get("request_type")?,
        description: row.get("description")?,
        status: row.get("status")?,
        review_notes: row.get("review_notes")?,
        reviewed_by: row.get("reviewed_by")?,
        reviewed_at: row.get("reviewed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[derive(Debug, Deserialize)]
pub struct NewRequest {
    pub request_type: String,
    pub description: String,
    pub target_id: Option<i64>,
}

pub fn create(conn: &Connection, requester_id: i64, new: &NewRequest) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO requests (requester_id, target_id, request_type, description) \
         VALUES (?1, ?2, ?3, ?4)",
        params![requester_id, new.target_id, new.request_type, new.description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Request>> {
    let sql = format!("{SELECT_REQUEST} WHERE r.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_request)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn list_for_requester(conn: &Connection, requester_id: i64) -> rusqlite::Result<Vec<Request>> {
    let sql = format!("{SELECT_REQUEST} WHERE r.requester_id = ?1 ORDER BY r.created_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![requester_id], row_to_request)?;
    rows.collect()
}

/// Requests addressed to a specific principal (mentor decisions).
pub fn list_targeted_at(conn: &Connection, target_id: i64) -> rusqlite::Result<Vec<Request>> {
    let sql = format!("{SELECT_REQUEST} WHERE r.target_id = ?1 ORDER BY r.created_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![target_id], row_to_request)?;
    rows.collect()
}

/// Requests whose requester belongs to a department, resolved through the
/// requester's linked student or faculty record.
pub fn list_for_department(conn: &Connection, department: &str) -> rusqlite::Result<Vec<Request>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.requester_id, r.target_id, r.request_type, r.description, \
                r.status, r.review_notes, r.reviewed_by, r.reviewed_at, \
                r.created_at, r.updated_at \
         FROM requests r \
         JOIN principals p ON r.requester_id = p.id \
         LEFT JOIN students s ON p.student_id = s.id \
         LEFT JOIN faculty f ON p.faculty_id = f.id \
         WHERE COALESCE(s.department, f.department) = ?1 \
         ORDER BY r.created_at DESC",
    )?;
    let rows = stmt.query_map(params![department], row_to_request)?;
    rows.collect()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Request>> {
    let sql = format!("{SELECT_REQUEST} ORDER BY r.created_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![], row_to_request)?;
    rows.collect()
}

/// Transition a pending request to approved/rejected. Returns false when the
/// request was already decided — the status guard in the WHERE clause makes
/// the check-and-set atomic.
pub fn decide(
    conn: &Connection,
    id: i64,
    reviewer_id: i64,
    approve: bool,
    review_notes: Option<&str>,
) -> rusqlite::Result<bool> {
    let status = if approve { "approved" } else { "rejected" };
    let changed = conn.execute(
        "UPDATE requests SET status = ?1, review_notes = ?2, reviewed_by = ?3, \
             reviewed_at = strftime('%Y-%m-%dT%H:%M:%S','now'), \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?4 AND status = 'pending'",
        params![status, review_notes, reviewer_id, id],
    )?;
    Ok(changed > 0)
}
