use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub minor1: f64,
    pub mid_exam: f64,
    pub minor2: f64,
    pub end_exam: f64,
    pub total: f64,
    pub conducted_hours: i64,
    pub attended_hours: i64,
    pub attendance_percentage: f64,
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Semester {
    pub id: i64,
    pub student_id: i64,
    pub semester: i64,
    pub sgpa: f64,
    pub cgpa: f64,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
pub struct NewSubject {
    pub subject_name: String,
    pub subject_code: String,
    #[serde(default)]
    pub minor1: f64,
    #[serde(default)]
    pub mid_exam: f64,
    #[serde(default)]
    pub minor2: f64,
    #[serde(default)]
    pub end_exam: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub conducted_hours: i64,
    #[serde(default)]
    pub attended_hours: i64,
    #[serde(default)]
    pub attendance_percentage: f64,
    #[serde(default)]
    pub remarks: String,
}

fn row_to_subject(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get("id")?,
        subject_name: row.get("subject_name")?,
        subject_code: row.get("subject_code")?,
        minor1: row.get("minor1")?,
        mid_exam: row.get("mid_exam")?,
        minor2: row.get("minor2")?,
        end_exam: row.get("end_exam")?,
        total: row.get("total")?,
        conducted_hours: row.get("conducted_hours")?,
        attended_hours: row.get("attended_hours")?,
        attendance_percentage: row.get("attendance_percentage")?,
        remarks: row.get("remarks")?,
    })
}

pub fn subjects_for_semester(conn: &Connection, semester_id: i64) -> rusqlite::Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        "SELECT id, subject_name, subject_code, minor1, mid_exam, minor2, end_exam, \
                total, conducted_hours, attended_hours, attendance_percentage, remarks \
         FROM subjects WHERE semester_id = ?1 ORDER BY subject_code",
    )?;
    let rows = stmt.query_map(params![semester_id], row_to_subject)?;
    rows.collect()
}

/// All semester records for a student, each with its subjects, in semester order.
pub fn list_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<Semester>> {
    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester, sgpa, cgpa \
         FROM semesters WHERE student_id = ?1 ORDER BY semester",
    )?;
    let bare: Vec<(i64, i64, i64, f64, f64)> = stmt
        .query_map(params![student_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut semesters = Vec::with_capacity(bare.len());
    for (id, student_id, semester, sgpa, cgpa) in bare {
        semesters.push(Semester {
            id,
            student_id,
            semester,
            sgpa,
            cgpa,
            subjects: subjects_for_semester(conn, id)?,
        });
    }
    Ok(semesters)
}

/// Create or refresh a student's record for one semester.
pub fn upsert(
    conn: &Connection,
    student_id: i64,
    semester: i64,
    sgpa: f64,
    cgpa: f64,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO semesters (student_id, semester, sgpa, cgpa) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(student_id, semester) DO UPDATE SET sgpa = excluded.sgpa, cgpa = excluded.cgpa",
        params![student_id, semester, sgpa, cgpa],
    )?;
    conn.query_row(
        "SELECT id FROM semesters WHERE student_id = ?1 AND semester = ?2",
        params![student_id, semester],
        |row| row.get(0),
    )
}

pub fn add_subject(conn: &Connection, semester_id: i64, subject: &NewSubject) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO subjects (semester_id, subject_name, subject_code, minor1, mid_exam, \
             minor2, end_exam, total, conducted_hours, attended_hours, \
             attendance_percentage, remarks) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            semester_id,
            subject.subject_name,
            subject.subject_code,
            subject.minor1,
            subject.mid_exam,
            subject.minor2,
            subject.end_exam,
            subject.total,
            subject.conducted_hours,
            subject.attended_hours,
            subject.attendance_percentage,
            subject.remarks,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Owning student of a semester row, for write authorization.
pub fn owner_of(conn: &Connection, semester_id: i64) -> rusqlite::Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT student_id FROM semesters WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![semester_id], |row| row.get::<_, i64>(0))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}
