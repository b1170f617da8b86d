mod common;

use common::*;
use mentorlink::auth::policy;
use mentorlink::errors::AppError;
use mentorlink::models::meeting::{self, NewMeeting};
use mentorlink::models::principal::Role;

fn meeting_count(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM meetings", [], |row| row.get(0))
        .unwrap()
}

/// Faculty + two mentees, with principals, ready for meeting tests.
fn setup_mentoring(
    conn: &rusqlite::Connection,
) -> (mentorlink::models::principal::Principal, i64, Vec<i64>) {
    let faculty_id = create_faculty(conn, "F001", "Prof. Sharma", "CSE");
    let s1 = create_student(conn, 1001, "A. Kumar", "CSE");
    let s2 = create_student(conn, 1002, "B. Singh", "CSE");
    assign_mentor(conn, faculty_id, s1);
    assign_mentor(conn, faculty_id, s2);
    let pid = create_principal(conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id });
    (load_principal(conn, pid), faculty_id, vec![s1, s2])
}

#[test]
fn create_meeting_persists_participants() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);

    let participants = policy::require_participants(&conn, &p, &mentees).unwrap();
    assert_eq!(participants.len(), 2);

    let meeting_id = meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2026-09-01".to_string(),
            meeting_time: "14:30".to_string(),
            description: "progress review".to_string(),
        },
        &mentees,
    )
    .unwrap();

    let found = meeting::find_by_id(&conn, meeting_id).unwrap().unwrap();
    assert_eq!(found.status, "scheduled");
    assert_eq!(meeting::participants(&conn, meeting_id).unwrap(), mentees);
}

#[test]
fn out_of_scope_participant_fails_and_persists_nothing() {
    let (_dir, conn) = setup_test_db();
    let (p, _, mentees) = setup_mentoring(&conn);
    let outsider = create_student(&conn, 3001, "D. Roy", "CSE");

    let ids = vec![mentees[0], outsider];
    let result = policy::require_participants(&conn, &p, &ids);
    assert!(matches!(result, Err(AppError::InvalidParticipant(_))));
    assert_eq!(meeting_count(&conn), 0);
}

#[test]
fn unknown_participant_fails_and_persists_nothing() {
    let (_dir, conn) = setup_test_db();
    let (p, _, _) = setup_mentoring(&conn);

    let result = policy::require_participants(&conn, &p, &[99_999]);
    assert!(matches!(result, Err(AppError::InvalidParticipant(_))));
    assert_eq!(meeting_count(&conn), 0);
}

#[test]
fn cancel_twice_succeeds_once_then_terminal() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);
    let meeting_id = meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2026-09-01".to_string(),
            meeting_time: "10:00".to_string(),
            description: String::new(),
        },
        &mentees,
    )
    .unwrap();

    assert!(meeting::mark_cancelled(&conn, meeting_id, Some("clash")).unwrap());
    assert!(!meeting::mark_cancelled(&conn, meeting_id, None).unwrap());

    let found = meeting::find_by_id(&conn, meeting_id).unwrap().unwrap();
    assert_eq!(found.status, "cancelled");
    assert_eq!(found.cancel_reason.as_deref(), Some("clash"));
}

#[test]
fn terminal_states_reject_further_transitions() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);
    let meeting_id = meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2026-09-01".to_string(),
            meeting_time: "10:00".to_string(),
            description: String::new(),
        },
        &mentees,
    )
    .unwrap();

    assert!(meeting::mark_completed(&conn, meeting_id).unwrap());
    assert!(!meeting::mark_cancelled(&conn, meeting_id, None).unwrap());
    assert!(!meeting::mark_completed(&conn, meeting_id).unwrap());
}

#[test]
fn cancel_only_touches_status_never_membership() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);
    let meeting_id = meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2026-09-01".to_string(),
            meeting_time: "10:00".to_string(),
            description: String::new(),
        },
        &mentees,
    )
    .unwrap();

    let before = meeting::participants(&conn, meeting_id).unwrap();
    meeting::mark_cancelled(&conn, meeting_id, None).unwrap();
    let after = meeting::participants(&conn, meeting_id).unwrap();
    assert_eq!(before, after);
}

#[test]
fn listing_is_newest_scheduled_first_and_scoped() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);

    for (date, time) in [("2026-04-01", "09:00"), ("2026-04-08", "09:00"), ("2026-03-01", "16:00")] {
        meeting::create(
            &mut conn,
            &NewMeeting {
                created_by: p.id,
                faculty_id: Some(faculty_id),
                hod_id: None,
                meeting_date: date.to_string(),
                meeting_time: time.to_string(),
                description: String::new(),
            },
            &mentees[..1],
        )
        .unwrap();
    }

    let listed = meeting::list_for_principal(&conn, &p).unwrap();
    let dates: Vec<&str> = listed.iter().map(|m| m.meeting_date.as_str()).collect();
    assert_eq!(dates, vec!["2026-04-08", "2026-04-01", "2026-03-01"]);

    // The participant sees the same meetings through their own scope.
    let spid = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id: mentees[0] });
    let sp = load_principal(&conn, spid);
    assert_eq!(meeting::list_for_principal(&conn, &sp).unwrap().len(), 3);

    // A non-participant student sees none of them.
    let other = create_student(&conn, 4001, "E. Bora", "CSE");
    let opid = create_principal(&conn, "b4001@nitap.ac.in", Role::Student { student_id: other });
    let op = load_principal(&conn, opid);
    assert!(meeting::list_for_principal(&conn, &op).unwrap().is_empty());
}

#[test]
fn past_scheduled_meeting_reads_completed_in_view() {
    let (_dir, mut conn) = setup_test_db();
    let (p, faculty_id, mentees) = setup_mentoring(&conn);
    let meeting_id = meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2024-01-10".to_string(),
            meeting_time: "10:00".to_string(),
            description: String::new(),
        },
        &mentees,
    )
    .unwrap();

    let found = meeting::find_by_id(&conn, meeting_id).unwrap().unwrap();
    let view = meeting::to_view(&conn, &found, "2026-01-01").unwrap();
    assert_eq!(view.status, "completed");
    // The stored status is untouched: cancel is still possible.
    assert!(meeting::mark_cancelled(&conn, meeting_id, None).unwrap());
}

#[test]
fn hod_sees_department_meetings_alongside_own() {
    let (_dir, mut conn) = setup_test_db();
    let (faculty_p, faculty_id, mentees) = setup_mentoring(&conn);

    let head_id = create_faculty(&conn, "F010", "Prof. Head", "CSE");
    appoint_hod(&mut conn, head_id, "CSE");
    let hod_pid = create_principal(&conn, "hod.cse@nitap.ac.in", Role::Hod { faculty_id: head_id });
    let hod_p = load_principal(&conn, hod_pid);

    meeting::create(
        &mut conn,
        &NewMeeting {
            created_by: faculty_p.id,
            faculty_id: Some(faculty_id),
            hod_id: None,
            meeting_date: "2026-05-01".to_string(),
            meeting_time: "10:00".to_string(),
            description: String::new(),
        },
        &mentees,
    )
    .unwrap();

    // The department faculty's meeting is visible to the acting HOD.
    let listed = meeting::list_for_principal(&conn, &hod_p).unwrap();
    assert_eq!(listed.len(), 1);
}
