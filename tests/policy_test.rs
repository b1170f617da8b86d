mod common;

use common::*;
use mentorlink::auth::policy;
use mentorlink::errors::AppError;
use mentorlink::models::principal::Role;
use mentorlink::models::{faculty, student};

#[test]
fn non_mentor_faculty_cannot_read_student() {
    let (_dir, conn) = setup_test_db();
    let mentor_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let other_id = create_faculty(&conn, "F002", "Prof. Verma", "CSE");
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    assign_mentor(&conn, mentor_id, student_id);

    let other_pid = create_principal(&conn, "verma@nitap.ac.in", Role::Faculty { faculty_id: other_id });
    let other = load_principal(&conn, other_pid);

    let result = policy::require_student(&conn, &other, student_id);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[test]
fn mentor_reads_own_mentee() {
    let (_dir, conn) = setup_test_db();
    let mentor_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    assign_mentor(&conn, mentor_id, student_id);

    let pid = create_principal(&conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id: mentor_id });
    let p = load_principal(&conn, pid);

    let found = policy::require_student(&conn, &p, student_id).expect("Mentee must be in scope");
    assert_eq!(found.roll_number, 1001);
}

#[test]
fn hod_listing_never_crosses_departments() {
    let (_dir, mut conn) = setup_test_db();
    let head_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    appoint_hod(&mut conn, head_id, "CSE");
    create_student(&conn, 1001, "A. Kumar", "CSE");
    create_student(&conn, 1002, "B. Singh", "CSE");
    // An out-of-department mentee must not leak into the department listing.
    let outside = create_student(&conn, 2001, "C. Das", "ECE");
    assign_mentor(&conn, head_id, outside);

    let pid = create_principal(&conn, "hod.cse@nitap.ac.in", Role::Hod { faculty_id: head_id });
    let p = load_principal(&conn, pid);

    let record = policy::require_acting_hod(&conn, &p).unwrap();
    let scopes = policy::ScopeSet::new(vec![policy::Scope::Department(record.department)]);
    let page = student::find_paginated(&conn, &scopes, 1, 50).unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.students.iter().all(|s| s.department == "CSE"));
}

#[test]
fn student_reads_own_profile_and_no_others() {
    let (_dir, conn) = setup_test_db();
    let own_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let other_id = create_student(&conn, 1002, "B. Singh", "CSE");

    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id: own_id });
    let p = load_principal(&conn, pid);

    let own = policy::require_student(&conn, &p, own_id).expect("Own profile must be readable");
    assert_eq!(own.id, own_id);

    let result = policy::require_student(&conn, &p, other_id);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[test]
fn missing_student_is_not_found_not_forbidden() {
    let (_dir, conn) = setup_test_db();
    let own_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id: own_id });
    let p = load_principal(&conn, pid);

    let result = policy::require_student(&conn, &p, 99_999);
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[test]
fn acting_hod_gets_union_of_mentees_and_department() {
    let (_dir, mut conn) = setup_test_db();
    let head_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    appoint_hod(&mut conn, head_id, "CSE");

    // Mentee from another department stays in scope alongside the department.
    let outside_mentee = create_student(&conn, 2001, "C. Das", "ECE");
    let dept_student = create_student(&conn, 1001, "A. Kumar", "CSE");
    assign_mentor(&conn, head_id, outside_mentee);

    let pid = create_principal(&conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id: head_id });
    let p = load_principal(&conn, pid);

    policy::require_student(&conn, &p, outside_mentee).expect("Mentee must stay in scope");
    policy::require_student(&conn, &p, dept_student).expect("Department student must be in scope");
}

#[test]
fn hod_record_department_wins_on_divergence() {
    let (_dir, mut conn) = setup_test_db();
    // Faculty record says CSE, but the appointment is for ECE.
    let head_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    appoint_hod(&mut conn, head_id, "ECE");

    let cse_student = create_student(&conn, 1001, "A. Kumar", "CSE");
    let ece_student = create_student(&conn, 2001, "C. Das", "ECE");

    let pid = create_principal(&conn, "hod@nitap.ac.in", Role::Hod { faculty_id: head_id });
    let p = load_principal(&conn, pid);

    policy::require_student(&conn, &p, ece_student).expect("Appointment department governs");
    let result = policy::require_student(&conn, &p, cse_student);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[test]
fn closed_hod_record_loses_department_scope() {
    let (_dir, mut conn) = setup_test_db();
    let head_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let record_id = appoint_hod(&mut conn, head_id, "CSE");
    let dept_student = create_student(&conn, 1001, "A. Kumar", "CSE");

    mentorlink::models::hod::close(&conn, record_id, "2026-06-30").unwrap();

    let pid = create_principal(&conn, "hod@nitap.ac.in", Role::Hod { faculty_id: head_id });
    let p = load_principal(&conn, pid);

    let result = policy::require_student(&conn, &p, dept_student);
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(matches!(
        policy::require_acting_hod(&conn, &p),
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn admin_sees_everything() {
    let (_dir, conn) = setup_test_db();
    create_student(&conn, 1001, "A. Kumar", "CSE");
    create_student(&conn, 2001, "C. Das", "ECE");

    let pid = create_principal(&conn, "admin@nitap.ac.in", Role::Admin);
    let p = load_principal(&conn, pid);

    let scopes = policy::student_scope(&conn, &p).unwrap();
    let page = student::find_paginated(&conn, &scopes, 1, 50).unwrap();
    assert_eq!(page.total_count, 2);
}

#[test]
fn student_sees_only_mentor_in_faculty_scope() {
    let (_dir, conn) = setup_test_db();
    let mentor_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let other_id = create_faculty(&conn, "F002", "Prof. Verma", "CSE");
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    assign_mentor(&conn, mentor_id, student_id);

    let pid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });
    let p = load_principal(&conn, pid);

    policy::require_faculty(&conn, &p, mentor_id).expect("Mentor profile must be readable");
    let result = policy::require_faculty(&conn, &p, other_id);
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let scopes = policy::faculty_scope(&conn, &p).unwrap();
    let visible = faculty::list_scoped(&conn, &scopes).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mentor_id);
}

#[test]
fn scope_filter_cannot_be_widened_by_pagination_params() {
    let (_dir, conn) = setup_test_db();
    let mentor_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let mentee = create_student(&conn, 1001, "A. Kumar", "CSE");
    create_student(&conn, 1002, "B. Singh", "CSE");
    assign_mentor(&conn, mentor_id, mentee);

    let pid = create_principal(&conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id: mentor_id });
    let p = load_principal(&conn, pid);

    let scopes = policy::student_scope(&conn, &p).unwrap();
    // Oversized page limits are clamped; the scope predicate still binds.
    let page = student::find_paginated(&conn, &scopes, 1, 10_000).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.students[0].id, mentee);
}
