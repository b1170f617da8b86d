use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::auth::policy::ScopeSet;

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: i64,
    pub roll_number: i64,
    pub registration_number: i64,
    pub name: String,
    pub college_email: String,
    pub personal_email: String,
    pub phone: String,
    pub dob: String,
    pub address: String,
    pub department: String,
    pub program: String,
    pub branch: String,
    pub blood_group: String,
    pub day_scholar: bool,
    pub father_name: String,
    pub father_occupation: Option<String>,
    pub mother_name: String,
    pub mother_occupation: Option<String>,
    pub gender: String,
    pub community: String,
    pub x_marks: f64,
    pub xii_marks: f64,
    pub jee_mains: f64,
    pub jee_advanced: Option<f64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

const SELECT_STUDENT: &str = "\
    SELECT s.id, s.roll_number, s.registration_number, s.name, s.college_email, \
           s.personal_email, s.phone, s.dob, s.address, s.department, s.program, \
           s.branch, s.blood_group, s.day_scholar, s.father_name, s.father_occupation, \
           s.mother_name, s.mother_occupation, s.gender, s.community, s.x_marks, \
           s.xii_marks, s.jee_mains, s.jee_advanced, s.status, s.created_at, s.updated_at \
    FROM students s";

fn row_to_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        roll_number: row.get("roll_number")?,
        registration_number: row.get("registration_number")?,
        name: row.get("name")?,
        college_email: row.get("college_email")?,
        personal_email: row.get("personal_email")?,
        phone: row.get("phone")?,
        dob: row.get("dob")?,
        address: row.get("address")?,
        department: row.get("department")?,
        program: row.get("program")?,
        branch: row.get("branch")?,
        blood_group: row.get("blood_group")?,
        day_scholar: row.get("day_scholar")?,
        father_name: row.get("father_name")?,
        father_occupation: row.get("father_occupation")?,
        mother_name: row.get("mother_name")?,
        mother_occupation: row.get("mother_occupation")?,
        gender: row.get("gender")?,
        community: row.get("community")?,
        x_marks: row.get("x_marks")?,
        xii_marks: row.get("xii_marks")?,
        jee_mains: row.get("jee_mains")?,
        jee_advanced: row.get("jee_advanced")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Student>> {
    let sql = format!("{SELECT_STUDENT} WHERE s.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_student)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_by_roll(conn: &Connection, roll_number: i64) -> rusqlite::Result<Option<Student>> {
    let sql = format!("{SELECT_STUDENT} WHERE s.roll_number = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![roll_number], row_to_student)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Whether a student id falls inside the given scope set. The scope predicate
/// is the only filter, so a caller cannot substitute a wider one.
pub fn in_scope(conn: &Connection, id: i64, scopes: &ScopeSet) -> rusqlite::Result<bool> {
    let (pred, mut values) = scopes.student_predicate("s");
    let sql = format!("SELECT COUNT(*) FROM students s WHERE {pred} AND s.id = ?");
    values.push(Value::Integer(id));
    conn.query_row(&sql, params_from_iter(values), |row| {
        row.get::<_, i64>(0).map(|n| n > 0)
    })
}

/// Pagination envelope for scoped student listings.
pub struct StudentPage {
    pub students: Vec<Student>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// List students visible to the scope set, ordered by roll number. The scope
/// predicate is applied before pagination so counts never leak out-of-scope rows.
pub fn find_paginated(
    conn: &Connection,
    scopes: &ScopeSet,
    page: i64,
    per_page: i64,
) -> rusqlite::Result<StudentPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (pred, values) = scopes.student_predicate("s");

    let count_sql = format!("SELECT COUNT(*) FROM students s WHERE {pred}");
    let total_count: i64 =
        conn.query_row(&count_sql, params_from_iter(values.clone()), |row| row.get(0))?;
    let total_pages = (total_count as f64 / per_page as f64).ceil() as i64;

    let sql = format!("{SELECT_STUDENT} WHERE {pred} ORDER BY s.roll_number LIMIT ? OFFSET ?");
    let mut all_values = values;
    all_values.push(Value::Integer(per_page));
    all_values.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&sql)?;
    let students = stmt
        .query_map(params_from_iter(all_values), row_to_student)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StudentPage {
        students,
        page,
        per_page,
        total_count,
        total_pages,
    })
}

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    pub roll_number: i64,
    pub registration_number: i64,
    pub name: String,
    pub college_email: String,
    #[serde(default)]
    pub personal_email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub address: String,
    pub department: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub day_scholar: bool,
    #[serde(default)]
    pub father_name: String,
    pub father_occupation: Option<String>,
    #[serde(default)]
    pub mother_name: String,
    pub mother_occupation: Option<String>,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default = "default_community")]
    pub community: String,
    #[serde(default)]
    pub x_marks: f64,
    #[serde(default)]
    pub xii_marks: f64,
    #[serde(default)]
    pub jee_mains: f64,
    pub jee_advanced: Option<f64>,
}

fn default_gender() -> String {
    "Male".to_string()
}

fn default_community() -> String {
    "General".to_string()
}

pub fn create(conn: &Connection, new: &NewStudent) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO students (roll_number, registration_number, name, college_email, \
             personal_email, phone, dob, address, department, program, branch, \
             blood_group, day_scholar, father_name, father_occupation, mother_name, \
             mother_occupation, gender, community, x_marks, xii_marks, jee_mains, jee_advanced) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
             ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
        params![
            new.roll_number,
            new.registration_number,
            new.name,
            new.college_email,
            new.personal_email,
            new.phone,
            new.dob,
            new.address,
            new.department,
            new.program,
            new.branch,
            new.blood_group,
            new.day_scholar,
            new.father_name,
            new.father_occupation,
            new.mother_name,
            new.mother_occupation,
            new.gender,
            new.community,
            new.x_marks,
            new.xii_marks,
            new.jee_mains,
            new.jee_advanced,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fields a student may change on their own record.
#[derive(Debug, Deserialize)]
pub struct SelfUpdate {
    pub personal_email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub day_scholar: bool,
    #[serde(default)]
    pub father_name: String,
    pub father_occupation: Option<String>,
    #[serde(default)]
    pub mother_name: String,
    pub mother_occupation: Option<String>,
}

pub fn update_self(conn: &Connection, id: i64, upd: &SelfUpdate) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE students SET personal_email = ?1, phone = ?2, address = ?3, \
             blood_group = ?4, day_scholar = ?5, father_name = ?6, father_occupation = ?7, \
             mother_name = ?8, mother_occupation = ?9, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?10",
        params![
            upd.personal_email,
            upd.phone,
            upd.address,
            upd.blood_group,
            upd.day_scholar,
            upd.father_name,
            upd.father_occupation,
            upd.mother_name,
            upd.mother_occupation,
            id,
        ],
    )?;
    Ok(())
}

/// Fields only faculty/HOD/admin may change.
#[derive(Debug, Deserialize)]
pub struct AdministrativeUpdate {
    pub name: String,
    pub college_email: String,
    pub department: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub branch: String,
    pub status: String,
}

pub fn update_administrative(
    conn: &Connection,
    id: i64,
    upd: &AdministrativeUpdate,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE students SET name = ?1, college_email = ?2, department = ?3, \
             program = ?4, branch = ?5, status = ?6, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?7",
        params![
            upd.name,
            upd.college_email,
            upd.department,
            upd.program,
            upd.branch,
            upd.status,
            id,
        ],
    )?;
    Ok(())
}
