mod common;

use common::*;
use mentorlink::models::hod;

#[test]
fn appointment_closes_previous_open_record() {
    let (_dir, mut conn) = setup_test_db();
    let first = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let second = create_faculty(&conn, "F002", "Prof. Verma", "CSE");

    let first_record = hod::appoint(&mut conn, first, "CSE", "2025-07-01").unwrap();
    assert_eq!(
        hod::current_for_department(&conn, "CSE").unwrap().unwrap().faculty_id,
        first
    );

    let second_record = hod::appoint(&mut conn, second, "CSE", "2026-07-01").unwrap();

    let current = hod::current_for_department(&conn, "CSE").unwrap().unwrap();
    assert_eq!(current.id, second_record);
    assert_eq!(current.faculty_id, second);

    // The departing head's window is closed at the handover date.
    let closed = hod::find_by_id(&conn, first_record).unwrap().unwrap();
    assert_eq!(closed.end_date.as_deref(), Some("2026-07-01"));
    assert!(hod::active_for_faculty(&conn, first).unwrap().is_none());
    assert!(hod::active_for_faculty(&conn, second).unwrap().is_some());
}

#[test]
fn one_faculty_can_head_only_the_appointed_department() {
    let (_dir, mut conn) = setup_test_db();
    let head = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    hod::appoint(&mut conn, head, "CSE", "2026-01-01").unwrap();

    assert!(hod::current_for_department(&conn, "ECE").unwrap().is_none());
    let record = hod::active_for_faculty(&conn, head).unwrap().unwrap();
    assert_eq!(record.department, "CSE");
}

#[test]
fn close_without_successor_leaves_department_headless() {
    let (_dir, mut conn) = setup_test_db();
    let head = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let record = hod::appoint(&mut conn, head, "CSE", "2026-01-01").unwrap();

    hod::close(&conn, record, "2026-06-30").unwrap();
    assert!(hod::current_for_department(&conn, "CSE").unwrap().is_none());

    // Closing twice is a no-op.
    hod::close(&conn, record, "2026-07-15").unwrap();
    let found = hod::find_by_id(&conn, record).unwrap().unwrap();
    assert_eq!(found.end_date.as_deref(), Some("2026-06-30"));
}
