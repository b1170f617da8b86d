mod common;

use std::time::Duration;

use common::*;
use mentorlink::auth::session;
use mentorlink::errors::AppError;
use mentorlink::models::principal::{self, Role};
use rusqlite::params;

fn session_count(conn: &rusqlite::Connection, principal_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM sessions WHERE principal_id = ?1",
        params![principal_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn login_happy_path_returns_faculty_role_and_session() {
    let (_dir, conn) = setup_test_db();
    let faculty_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    create_principal(&conn, "prof@nitap.ac.in", Role::Faculty { faculty_id });

    let authed = session::authenticate(&conn, "prof@nitap.ac.in", TEST_PASSWORD)
        .expect("Login should succeed");
    assert_eq!(authed.role, Role::Faculty { faculty_id });

    let token = session::issue(&conn, authed.id, Duration::from_secs(3600)).unwrap();
    let resolved = session::resolve(&conn, &token).expect("Token should resolve");
    assert_eq!(resolved.id, authed.id);
    assert_eq!(resolved.role.as_str(), "FACULTY");
}

#[test]
fn wrong_password_fails_and_leaves_no_session() {
    let (_dir, conn) = setup_test_db();
    let faculty_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let pid = create_principal(&conn, "prof@nitap.ac.in", Role::Faculty { faculty_id });

    let result = session::authenticate(&conn, "prof@nitap.ac.in", "wrong-password");
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
    assert_eq!(session_count(&conn, pid), 0);
}

#[test]
fn unknown_email_fails_with_same_error() {
    let (_dir, conn) = setup_test_db();
    let result = session::authenticate(&conn, "nobody@nitap.ac.in", TEST_PASSWORD);
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[test]
fn inactive_account_cannot_login_and_sessions_stop_resolving() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let token = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    principal::set_account_status(&conn, pid, "INACTIVE").unwrap();

    assert!(matches!(
        session::authenticate(&conn, "b1001@nitap.ac.in", TEST_PASSWORD),
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        session::resolve(&conn, &token),
        Err(AppError::Unauthenticated)
    ));
}

#[test]
fn expired_token_fails_closed_and_is_removed() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });

    let token = session::issue(&conn, pid, Duration::from_secs(0)).unwrap();
    assert!(matches!(
        session::resolve(&conn, &token),
        Err(AppError::Unauthenticated)
    ));
    // Expired row is deleted on sight.
    assert_eq!(session_count(&conn, pid), 0);
}

#[test]
fn revoke_is_immediately_visible() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });

    let token = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();
    session::resolve(&conn, &token).expect("Fresh token should resolve");
    session::revoke(&conn, &token).unwrap();
    assert!(matches!(
        session::resolve(&conn, &token),
        Err(AppError::Unauthenticated)
    ));
}

#[test]
fn garbage_token_fails_closed() {
    let (_dir, conn) = setup_test_db();
    assert!(matches!(
        session::resolve(&conn, "not-a-real-token"),
        Err(AppError::Unauthenticated)
    ));
}

#[test]
fn change_password_rejects_wrong_current_password() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let p = load_principal(&conn, pid);
    let token = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    let result = session::change_password(&conn, &p, &token, "wrong-current", "new-password-1", true);
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    // Old password still works.
    session::authenticate(&conn, "b1001@nitap.ac.in", TEST_PASSWORD)
        .expect("Old password must survive a failed change");
}

#[test]
fn change_password_revokes_other_sessions_when_policy_set() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let p = load_principal(&conn, pid);

    let acting = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();
    let other = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    session::change_password(&conn, &p, &acting, TEST_PASSWORD, "new-password-1", true)
        .expect("Password change should succeed");

    session::resolve(&conn, &acting).expect("Acting session must survive");
    assert!(matches!(
        session::resolve(&conn, &other),
        Err(AppError::Unauthenticated)
    ));
    session::authenticate(&conn, "b1001@nitap.ac.in", "new-password-1")
        .expect("New password should authenticate");
}

#[test]
fn change_password_keeps_other_sessions_when_policy_unset() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let p = load_principal(&conn, pid);

    let acting = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();
    let other = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    session::change_password(&conn, &p, &acting, TEST_PASSWORD, "new-password-1", false)
        .expect("Password change should succeed");

    session::resolve(&conn, &acting).expect("Acting session must survive");
    session::resolve(&conn, &other).expect("Other session survives under the lax policy");
}

#[test]
fn change_password_enforces_minimum_length() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let p = load_principal(&conn, pid);
    let token = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    let result = session::change_password(&conn, &p, &token, TEST_PASSWORD, "short", true);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn purge_expired_removes_only_stale_rows() {
    let (_dir, conn) = setup_test_db();
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });

    let _stale = session::issue(&conn, pid, Duration::from_secs(0)).unwrap();
    let fresh = session::issue(&conn, pid, Duration::from_secs(3600)).unwrap();

    let removed = session::purge_expired(&conn).unwrap();
    assert_eq!(removed, 1);
    session::resolve(&conn, &fresh).expect("Fresh session must survive the purge");
}
