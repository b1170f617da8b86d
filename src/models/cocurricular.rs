use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CoCurricular {
    pub id: i64,
    pub student_id: i64,
    pub semester: i64,
    pub event_date: String,
    pub event_details: String,
    pub participation_details: String,
    pub awards: String,
}

#[derive(Debug, Deserialize)]
pub struct CoCurricularForm {
    pub semester: i64,
    pub event_date: String,
    pub event_details: String,
    #[serde(default)]
    pub participation_details: String,
    #[serde(default)]
    pub awards: String,
}

fn row_to_cocurricular(row: &rusqlite::Row<'_>) -> rusqlite::Result<CoCurricular> {
    Ok(CoCurricular {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        semester: row.get("semester")?,
        event_date: row.get("event_date")?,
        event_details: row.get("event_details")?,
        participation_details: row.get("participation_details")?,
        awards: row.get("awards")?,
    })
}

pub fn list_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<CoCurricular>> {
    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester, event_date, event_details, \
                participation_details, awards \
         FROM cocurriculars WHERE student_id = ?1 ORDER BY semester, event_date",
    )?;
    let rows = stmt.query_map(params![student_id], row_to_cocurricular)?;
    rows.collect()
}

pub fn create(conn: &Connection, student_id: i64, form: &CoCurricularForm) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO cocurriculars (student_id, semester, event_date, event_details, \
             participation_details, awards) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student_id,
            form.semester,
            form.event_date,
            form.event_details,
            form.participation_details,
            form.awards,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, id: i64, student_id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM cocurriculars WHERE id = ?1 AND student_id = ?2",
        params![id, student_id],
    )?;
    Ok(changed > 0)
}
