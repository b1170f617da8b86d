use rusqlite::{Connection, params};

/// The Faculty → Student mentoring list is the single source of truth for
/// the mentorship relation. The Student → mentor direction (`mentor_of`) is
/// derived from it, never stored twice. UNIQUE(student_id) in the schema
/// keeps a student with at most one active mentor.

/// Student ids mentored by a faculty member.
pub fn mentee_ids(conn: &Connection, faculty_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT student_id FROM mentorships WHERE faculty_id = ?1 ORDER BY student_id",
    )?;
    let rows = stmt.query_map(params![faculty_id], |row| row.get(0))?;
    rows.collect()
}

/// The faculty id currently mentoring a student, if any. Derived read.
pub fn mentor_of(conn: &Connection, student_id: i64) -> rusqlite::Result<Option<i64>> {
    let mut stmt =
        conn.prepare("SELECT faculty_id FROM mentorships WHERE student_id = ?1")?;
    let mut rows = stmt.query_map(params![student_id], |row| row.get::<_, i64>(0))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn is_mentor(conn: &Connection, faculty_id: i64, student_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM mentorships WHERE faculty_id = ?1 AND student_id = ?2",
        params![faculty_id, student_id],
        |row| row.get::<_, i64>(0).map(|n| n > 0),
    )
}

/// Assign (or move) a student to a mentor. The UPSERT keeps the
/// single-active-mentor invariant: reassignment replaces the old row.
pub fn assign(conn: &Connection, faculty_id: i64, student_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO mentorships (faculty_id, student_id) VALUES (?1, ?2) \
         ON CONFLICT(student_id) DO UPDATE SET faculty_id = excluded.faculty_id, \
             created_at = strftime('%Y-%m-%dT%H:%M:%S','now')",
        params![faculty_id, student_id],
    )?;
    Ok(())
}

pub fn remove(conn: &Connection, student_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM mentorships WHERE student_id = ?1",
        params![student_id],
    )?;
    Ok(())
}
