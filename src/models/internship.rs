use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Internship {
    pub id: i64,
    pub student_id: i64,
    pub semester: i64,
    pub kind: String,
    pub organisation: String,
    pub stipend: f64,
    pub duration: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct InternshipForm {
    pub semester: i64,
    pub kind: String,
    pub organisation: String,
    #[serde(default)]
    pub stipend: f64,
    pub duration: String,
    pub location: String,
}

fn row_to_internship(row: &rusqlite::Row<'_>) -> rusqlite::Result<Internship> {
    Ok(Internship {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        semester: row.get("semester")?,
        kind: row.get("kind")?,
        organisation: row.get("organisation")?,
        stipend: row.get("stipend")?,
        duration: row.get("duration")?,
        location: row.get("location")?,
    })
}

pub fn list_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<Internship>> {
    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester, kind, organisation, stipend, duration, location \
         FROM internships WHERE student_id = ?1 ORDER BY semester, id",
    )?;
    let rows = stmt.query_map(params![student_id], row_to_internship)?;
    rows.collect()
}

pub fn create(conn: &Connection, student_id: i64, form: &InternshipForm) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO internships (student_id, semester, kind, organisation, stipend, duration, location) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            student_id,
            form.semester,
            form.kind,
            form.organisation,
            form.stipend,
            form.duration,
            form.location,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update an internship owned by the student. The ownership guard is part of
/// the WHERE clause; returns false when the row is missing or not theirs.
pub fn update(
    conn: &Connection,
    id: i64,
    student_id: i64,
    form: &InternshipForm,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE internships SET semester = ?1, kind = ?2, organisation = ?3, \
             stipend = ?4, duration = ?5, location = ?6, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?7 AND student_id = ?8",
        params![
            form.semester,
            form.kind,
            form.organisation,
            form.stipend,
            form.duration,
            form.location,
            id,
            student_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64, student_id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM internships WHERE id = ?1 AND student_id = ?2",
        params![id, student_id],
    )?;
    Ok(changed > 0)
}
