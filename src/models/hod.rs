use rusqlite::{Connection, params};
use serde::Serialize;

/// An HOD appointment window. The open-ended row (no `end_date`) is the
/// department's current HOD; the partial unique index on `department`
/// guarantees at most one.
#[derive(Debug, Clone, Serialize)]
pub struct HodRecord {
    pub id: i64,
    pub faculty_id: i64,
    pub department: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

fn row_to_hod(row: &rusqlite::Row<'_>) -> rusqlite::Result<HodRecord> {
    Ok(HodRecord {
        id: row.get("id")?,
        faculty_id: row.get("faculty_id")?,
        department: row.get("department")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    })
}

const SELECT_HOD: &str =
    "SELECT id, faculty_id, department, start_date, end_date FROM hod_records";

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<HodRecord>> {
    let sql = format!("{SELECT_HOD} WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_hod)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// The current (open-ended) HOD record for a department, if any.
pub fn current_for_department(
    conn: &Connection,
    department: &str,
) -> rusqlite::Result<Option<HodRecord>> {
    let sql = format!("{SELECT_HOD} WHERE department = ?1 AND end_date IS NULL");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![department], row_to_hod)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// The open-ended HOD record held by a faculty member, if any. This is what
/// makes a faculty "acting HOD"; its `department` — not the faculty's own —
/// is the one that scopes their authority.
pub fn active_for_faculty(
    conn: &Connection,
    faculty_id: i64,
) -> rusqlite::Result<Option<HodRecord>> {
    let sql = format!("{SELECT_HOD} WHERE faculty_id = ?1 AND end_date IS NULL");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![faculty_id], row_to_hod)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Appoint a new HOD for a department, closing the previous open record in
/// the same transaction. The departing HOD's window ends the day the new one
/// starts.
pub fn appoint(
    conn: &mut Connection,
    faculty_id: i64,
    department: &str,
    start_date: &str,
) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE hod_records SET end_date = ?1 WHERE department = ?2 AND end_date IS NULL",
        params![start_date, department],
    )?;
    tx.execute(
        "INSERT INTO hod_records (faculty_id, department, start_date) VALUES (?1, ?2, ?3)",
        params![faculty_id, department, start_date],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// Close an HOD appointment without a successor.
pub fn close(conn: &Connection, id: i64, end_date: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE hod_records SET end_date = ?1 WHERE id = ?2 AND end_date IS NULL",
        params![end_date, id],
    )?;
    Ok(())
}
