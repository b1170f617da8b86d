use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub student_id: i64,
    pub semester: i64,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub mentor: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectForm {
    pub semester: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub mentor: String,
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let technologies: String = row.get("technologies")?;
    Ok(Project {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        semester: row.get("semester")?,
        title: row.get("title")?,
        description: row.get("description")?,
        technologies: serde_json::from_str(&technologies).unwrap_or_default(),
        mentor: row.get("mentor")?,
    })
}

pub fn list_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester, title, description, technologies, mentor \
         FROM projects WHERE student_id = ?1 ORDER BY semester, id",
    )?;
    let rows = stmt.query_map(params![student_id], row_to_project)?;
    rows.collect()
}

pub fn create(conn: &Connection, student_id: i64, form: &ProjectForm) -> rusqlite::Result<i64> {
    let technologies = serde_json::to_string(&form.technologies).unwrap_or_else(|_| "[]".into());
    conn.execute(
        "INSERT INTO projects (student_id, semester, title, description, technologies, mentor) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student_id,
            form.semester,
            form.title,
            form.description,
            technologies,
            form.mentor,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    id: i64,
    student_id: i64,
    form: &ProjectForm,
) -> rusqlite::Result<bool> {
    let technologies = serde_json::to_string(&form.technologies).unwrap_or_else(|_| "[]".into());
    let changed = conn.execute(
        "UPDATE projects SET semester = ?1, title = ?2, description = ?3, \
             technologies = ?4, mentor = ?5, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?6 AND student_id = ?7",
        params![
            form.semester,
            form.title,
            form.description,
            technologies,
            form.mentor,
            id,
            student_id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64, student_id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM projects WHERE id = ?1 AND student_id = ?2",
        params![id, student_id],
    )?;
    Ok(changed > 0)
}
