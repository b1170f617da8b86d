use rusqlite::{Connection, params};
use serde::Serialize;

/// Role of an authenticated actor, carrying the linked record id. Modeled as
/// a tagged union so an ADMIN row can never hold a student link and so on;
/// the `principals` table enforces the same shape with a CHECK constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Hod { faculty_id: i64 },
    Faculty { faculty_id: i64 },
    Student { student_id: i64 },
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hod { .. } => "HOD",
            Role::Faculty { .. } => "FACULTY",
            Role::Student { .. } => "STUDENT",
        }
    }

    pub fn faculty_id(&self) -> Option<i64> {
        match self {
            Role::Hod { faculty_id } | Role::Faculty { faculty_id } => Some(*faculty_id),
            _ => None,
        }
    }

    pub fn student_id(&self) -> Option<i64> {
        match self {
            Role::Student { student_id } => Some(*student_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub account_status: String,
}

/// Internal struct for authentication — includes the password hash.
#[derive(Debug, Clone)]
pub struct PrincipalAuth {
    pub principal: Principal,
    pub password: String,
}

/// Safe projection for API responses — no hash.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalDisplay {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub faculty_id: Option<i64>,
    pub student_id: Option<i64>,
    pub account_status: String,
}

impl From<&Principal> for PrincipalDisplay {
    fn from(p: &Principal) -> Self {
        PrincipalDisplay {
            id: p.id,
            email: p.email.clone(),
            role: p.role.as_str().to_string(),
            faculty_id: p.role.faculty_id(),
            student_id: p.role.student_id(),
            account_status: p.account_status.clone(),
        }
    }
}

fn role_from_columns(
    role: &str,
    faculty_id: Option<i64>,
    student_id: Option<i64>,
) -> rusqlite::Result<Role> {
    match (role, faculty_id, student_id) {
        ("ADMIN", None, None) => Ok(Role::Admin),
        ("HOD", Some(f), None) => Ok(Role::Hod { faculty_id: f }),
        ("FACULTY", Some(f), None) => Ok(Role::Faculty { faculty_id: f }),
        ("STUDENT", None, Some(s)) => Ok(Role::Student { student_id: s }),
        _ => Err(rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("invalid role/link combination for role '{role}'").into(),
        )),
    }
}

fn row_to_principal(row: &rusqlite::Row<'_>) -> rusqlite::Result<Principal> {
    let role: String = row.get("role")?;
    let faculty_id: Option<i64> = row.get("faculty_id")?;
    let student_id: Option<i64> = row.get("student_id")?;
    Ok(Principal {
        id: row.get("id")?,
        email: row.get("email")?,
        role: role_from_columns(&role, faculty_id, student_id)?,
        account_status: row.get("account_status")?,
    })
}

const SELECT_PRINCIPAL: &str = "\
    SELECT id, email, password, role, faculty_id, student_id, account_status \
    FROM principals";

/// Find a principal by email for authentication. Returns the hash as well.
pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<PrincipalAuth>> {
    let sql = format!("{SELECT_PRINCIPAL} WHERE email = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![email], |row| {
        Ok(PrincipalAuth {
            principal: row_to_principal(row)?,
            password: row.get("password")?,
        })
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Principal>> {
    let sql = format!("{SELECT_PRINCIPAL} WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_principal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Find the STUDENT principal linked to a student record.
pub fn find_by_student_id(conn: &Connection, student_id: i64) -> rusqlite::Result<Option<Principal>> {
    let sql = format!("{SELECT_PRINCIPAL} WHERE role = 'STUDENT' AND student_id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![student_id], row_to_principal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Find the FACULTY/HOD principal linked to a faculty record.
pub fn find_by_faculty_id(conn: &Connection, faculty_id: i64) -> rusqlite::Result<Option<Principal>> {
    let sql = format!("{SELECT_PRINCIPAL} WHERE role IN ('FACULTY','HOD') AND faculty_id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![faculty_id], row_to_principal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub struct NewPrincipal {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

pub fn create(conn: &Connection, new: &NewPrincipal) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO principals (email, password, role, faculty_id, student_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.email,
            new.password_hash,
            new.role.as_str(),
            new.role.faculty_id(),
            new.role.student_id(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_password_hash_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT password FROM principals WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
    match rows.next() {
        Some(val) => Ok(Some(val?)),
        None => Ok(None),
    }
}

pub fn update_password(conn: &Connection, id: i64, password_hash: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE principals SET password = ?1, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') WHERE id = ?2",
        params![password_hash, id],
    )?;
    Ok(())
}

/// Flip the account lifecycle flag; principals are never deleted.
pub fn set_account_status(conn: &Connection, id: i64, status: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE principals SET account_status = ?1, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') WHERE id = ?2",
        params![status, id],
    )?;
    Ok(())
}
