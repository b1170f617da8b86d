//! Shared test infrastructure for model and policy layer tests.
//!
//! `setup_test_db()` creates a temporary SQLite database with the full
//! schema. The seed helpers insert the minimum rows each test needs; the
//! TempDir must be kept alive for the Connection to remain valid.

use rusqlite::{Connection, params};
use tempfile::TempDir;

use mentorlink::auth::password;
use mentorlink::db::MIGRATIONS;
use mentorlink::models::principal::{self, NewPrincipal, Role};

pub const TEST_PASSWORD: &str = "correct-horse-9";

pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");

    (dir, conn)
}

#[allow(dead_code)]
pub fn create_faculty(conn: &Connection, employee_id: &str, name: &str, department: &str) -> i64 {
    conn.execute(
        "INSERT INTO faculty (employee_id, name, phone1, personal_email, college_email, department) \
         VALUES (?1, ?2, '9000000001', ?3, ?4, ?5)",
        params![
            employee_id,
            name,
            format!("{employee_id}@gmail.com"),
            format!("{employee_id}@nitap.ac.in"),
            department,
        ],
    )
    .expect("Failed to insert faculty");
    conn.last_insert_rowid()
}

#[allow(dead_code)]
pub fn create_student(conn: &Connection, roll: i64, name: &str, department: &str) -> i64 {
    conn.execute(
        "INSERT INTO students (roll_number, registration_number, name, college_email, department) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![roll, roll + 100_000, name, format!("b{roll}@nitap.ac.in"), department],
    )
    .expect("Failed to insert student");
    conn.last_insert_rowid()
}

#[allow(dead_code)]
pub fn create_principal(conn: &Connection, email: &str, role: Role) -> i64 {
    let hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash test password");
    principal::create(
        conn,
        &NewPrincipal {
            email: email.to_string(),
            password_hash: hash,
            role,
        },
    )
    .expect("Failed to insert principal")
}

#[allow(dead_code)]
pub fn load_principal(conn: &Connection, id: i64) -> principal::Principal {
    principal::find_by_id(conn, id)
        .expect("Query failed")
        .expect("Principal not found")
}

#[allow(dead_code)]
pub fn appoint_hod(conn: &mut Connection, faculty_id: i64, department: &str) -> i64 {
    mentorlink::models::hod::appoint(conn, faculty_id, department, "2026-01-01")
        .expect("Failed to appoint HOD")
}

#[allow(dead_code)]
pub fn assign_mentor(conn: &Connection, faculty_id: i64, student_id: i64) {
    mentorlink::models::mentorship::assign(conn, faculty_id, student_id)
        .expect("Failed to assign mentor");
}
