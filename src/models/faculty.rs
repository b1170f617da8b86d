use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::auth::policy::ScopeSet;

#[derive(Debug, Clone, Serialize)]
pub struct Faculty {
    pub id: i64,
    pub employee_id: String,
    pub name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub personal_email: String,
    pub college_email: String,
    pub department: String,
    pub mtech: Option<String>,
    pub phd: Option<String>,
    pub office: String,
    pub office_hours: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Public subset a mentee is allowed to see of their mentor.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyPublic {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub college_email: String,
    pub office: String,
    pub office_hours: String,
}

impl From<Faculty> for FacultyPublic {
    fn from(f: Faculty) -> Self {
        FacultyPublic {
            id: f.id,
            name: f.name,
            department: f.department,
            college_email: f.college_email,
            office: f.office,
            office_hours: f.office_hours,
        }
    }
}

const SELECT_FACULTY: &str = "\
    SELECT f.id, f.employee_id, f.name, f.phone1, f.phone2, f.personal_email, \
           f.college_email, f.department, f.mtech, f.phd, f.office, f.office_hours, \
           f.created_at, f.updated_at \
    FROM faculty f";

fn row_to_faculty(row: &rusqlite::Row<'_>) -> rusqlite::Result<Faculty> {
    Ok(Faculty {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        name: row.get("name")?,
        phone1: row.get("phone1")?,
        phone2: row.get("phone2")?,
        personal_email: row.get("personal_email")?,
        college_email: row.get("college_email")?,
        department: row.get("department")?,
        mtech: row.get("mtech")?,
        phd: row.get("phd")?,
        office: row.get("office")?,
        office_hours: row.get("office_hours")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Faculty>> {
    let sql = format!("{SELECT_FACULTY} WHERE f.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_faculty)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_by_employee_id(conn: &Connection, employee_id: &str) -> rusqlite::Result<Option<Faculty>> {
    let sql = format!("{SELECT_FACULTY} WHERE f.employee_id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![employee_id], row_to_faculty)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn in_scope(conn: &Connection, id: i64, scopes: &ScopeSet) -> rusqlite::Result<bool> {
    let (pred, mut values) = scopes.faculty_predicate("f");
    let sql = format!("SELECT COUNT(*) FROM faculty f WHERE {pred} AND f.id = ?");
    values.push(Value::Integer(id));
    conn.query_row(&sql, params_from_iter(values), |row| {
        row.get::<_, i64>(0).map(|n| n > 0)
    })
}

/// List faculty visible to the scope set, ordered by employee id.
pub fn list_scoped(conn: &Connection, scopes: &ScopeSet) -> rusqlite::Result<Vec<Faculty>> {
    let (pred, values) = scopes.faculty_predicate("f");
    let sql = format!("{SELECT_FACULTY} WHERE {pred} ORDER BY f.employee_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), row_to_faculty)?;
    rows.collect()
}

#[derive(Debug, Deserialize)]
pub struct NewFaculty {
    pub employee_id: String,
    pub name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub personal_email: String,
    pub college_email: String,
    pub department: String,
    pub mtech: Option<String>,
    pub phd: Option<String>,
    #[serde(default)]
    pub office: String,
    #[serde(default)]
    pub office_hours: String,
}

pub fn create(conn: &Connection, new: &NewFaculty) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO faculty (employee_id, name, phone1, phone2, personal_email, \
             college_email, department, mtech, phd, office, office_hours) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            new.employee_id,
            new.name,
            new.phone1,
            new.phone2,
            new.personal_email,
            new.college_email,
            new.department,
            new.mtech,
            new.phd,
            new.office,
            new.office_hours,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Profile fields a faculty member may edit on their own record. Department
/// changes go through HOD/admin, not here.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub phone1: String,
    pub phone2: Option<String>,
    pub personal_email: String,
    pub mtech: Option<String>,
    pub phd: Option<String>,
    #[serde(default)]
    pub office: String,
    #[serde(default)]
    pub office_hours: String,
}

pub fn update_profile(conn: &Connection, id: i64, upd: &ProfileUpdate) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE faculty SET phone1 = ?1, phone2 = ?2, personal_email = ?3, \
             mtech = ?4, phd = ?5, office = ?6, office_hours = ?7, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?8",
        params![
            upd.phone1,
            upd.phone2,
            upd.personal_email,
            upd.mtech,
            upd.phd,
            upd.office,
            upd.office_hours,
            id,
        ],
    )?;
    Ok(())
}

/// Administrative fields (HOD/admin surface).
#[derive(Debug, Deserialize)]
pub struct AdministrativeUpdate {
    pub name: String,
    pub college_email: String,
    pub department: String,
}

pub fn update_administrative(
    conn: &Connection,
    id: i64,
    upd: &AdministrativeUpdate,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE faculty SET name = ?1, college_email = ?2, department = ?3, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?4",
        params![upd.name, upd.college_email, upd.department, id],
    )?;
    Ok(())
}
