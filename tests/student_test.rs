mod common;

use common::*;
use mentorlink::models::{
    career, cocurricular, internship, mentorship, message, principal, project, semester, student,
};
use mentorlink::models::principal::Role;

#[test]
fn create_and_find_by_roll() {
    let (_dir, conn) = setup_test_db();
    let id = create_student(&conn, 1001, "A. Kumar", "CSE");

    let found = student::find_by_roll(&conn, 1001).unwrap().unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.status, "PURSUING");
    assert!(student::find_by_roll(&conn, 9999).unwrap().is_none());
}

#[test]
fn self_update_never_touches_administrative_fields() {
    let (_dir, conn) = setup_test_db();
    let id = create_student(&conn, 1001, "A. Kumar", "CSE");

    student::update_self(
        &conn,
        id,
        &student::SelfUpdate {
            personal_email: "kumar.a@gmail.com".to_string(),
            phone: "9876543210".to_string(),
            address: "Hostel B, Room 12".to_string(),
            blood_group: "B+".to_string(),
            day_scholar: false,
            father_name: "R. Kumar".to_string(),
            father_occupation: Some("Farmer".to_string()),
            mother_name: "S. Kumar".to_string(),
            mother_occupation: None,
        },
    )
    .unwrap();

    let updated = student::find_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(updated.personal_email, "kumar.a@gmail.com");
    assert_eq!(updated.phone, "9876543210");
    // Administrative fields survive untouched.
    assert_eq!(updated.department, "CSE");
    assert_eq!(updated.status, "PURSUING");
    assert_eq!(updated.roll_number, 1001);
}

#[test]
fn administrative_update_moves_lifecycle() {
    let (_dir, conn) = setup_test_db();
    let id = create_student(&conn, 1001, "A. Kumar", "CSE");

    student::update_administrative(
        &conn,
        id,
        &student::AdministrativeUpdate {
            name: "A. Kumar".to_string(),
            college_email: "b1001@nitap.ac.in".to_string(),
            department: "CSE".to_string(),
            program: "B.Tech".to_string(),
            branch: "CSE".to_string(),
            status: "GRADUATED".to_string(),
        },
    )
    .unwrap();

    let updated = student::find_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(updated.status, "GRADUATED");
    assert_eq!(updated.program, "B.Tech");
}

#[test]
fn mentorship_is_single_active_mentor() {
    let (_dir, conn) = setup_test_db();
    let f1 = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let f2 = create_faculty(&conn, "F002", "Prof. Verma", "CSE");
    let s = create_student(&conn, 1001, "A. Kumar", "CSE");

    mentorship::assign(&conn, f1, s).unwrap();
    assert_eq!(mentorship::mentor_of(&conn, s).unwrap(), Some(f1));
    assert!(mentorship::is_mentor(&conn, f1, s).unwrap());

    // Reassignment moves, never duplicates.
    mentorship::assign(&conn, f2, s).unwrap();
    assert_eq!(mentorship::mentor_of(&conn, s).unwrap(), Some(f2));
    assert_eq!(mentorship::mentee_ids(&conn, f1).unwrap().len(), 0);
    assert_eq!(mentorship::mentee_ids(&conn, f2).unwrap(), vec![s]);

    mentorship::remove(&conn, s).unwrap();
    assert_eq!(mentorship::mentor_of(&conn, s).unwrap(), None);
}

#[test]
fn internship_crud_honors_ownership() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");
    let other = create_student(&conn, 1002, "B. Singh", "CSE");

    let form = internship::InternshipForm {
        semester: 5,
        kind: "Summer".to_string(),
        organisation: "ISRO".to_string(),
        stipend: 15000.0,
        duration: "8 weeks".to_string(),
        location: "Bengaluru".to_string(),
    };
    let id = internship::create(&conn, owner, &form).unwrap();
    assert_eq!(internship::list_for_student(&conn, owner).unwrap().len(), 1);

    // Another student can neither update nor delete it.
    assert!(!internship::update(&conn, id, other, &form).unwrap());
    assert!(!internship::delete(&conn, id, other).unwrap());

    let mut changed = form;
    changed.location = "Thiruvananthapuram".to_string();
    assert!(internship::update(&conn, id, owner, &changed).unwrap());
    let listed = internship::list_for_student(&conn, owner).unwrap();
    assert_eq!(listed[0].location, "Thiruvananthapuram");

    assert!(internship::delete(&conn, id, owner).unwrap());
    assert!(internship::list_for_student(&conn, owner).unwrap().is_empty());
}

#[test]
fn project_technologies_round_trip_as_json() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");

    let form = project::ProjectForm {
        semester: 6,
        title: "Attendance tracker".to_string(),
        description: "RFID based".to_string(),
        technologies: vec!["Rust".to_string(), "SQLite".to_string()],
        mentor: "Prof. Sharma".to_string(),
    };
    project::create(&conn, owner, &form).unwrap();

    let listed = project::list_for_student(&conn, owner).unwrap();
    assert_eq!(listed[0].technologies, vec!["Rust", "SQLite"]);
}

#[test]
fn cocurricular_create_and_delete() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");

    let id = cocurricular::create(
        &conn,
        owner,
        &cocurricular::CoCurricularForm {
            semester: 4,
            event_date: "2026-02-20".to_string(),
            event_details: "Inter-NIT hackathon".to_string(),
            participation_details: "Team lead".to_string(),
            awards: "Runner-up".to_string(),
        },
    )
    .unwrap();

    assert_eq!(cocurricular::list_for_student(&conn, owner).unwrap().len(), 1);
    assert!(cocurricular::delete(&conn, id, owner).unwrap());
    assert!(cocurricular::list_for_student(&conn, owner).unwrap().is_empty());
}

#[test]
fn career_details_upsert_round_trip() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");
    assert!(career::find_for_student(&conn, owner).unwrap().is_none());

    let mut details = career::CareerDetails::default();
    details.hobbies = vec!["chess".to_string()];
    details.higher_education = vec!["M.Tech".to_string(), "MS abroad".to_string()];
    career::upsert(&conn, owner, &details).unwrap();

    let found = career::find_for_student(&conn, owner).unwrap().unwrap();
    assert_eq!(found.hobbies, vec!["chess"]);
    assert_eq!(found.higher_education.len(), 2);

    // Second upsert replaces, not duplicates.
    details.hobbies = vec!["chess".to_string(), "cricket".to_string()];
    career::upsert(&conn, owner, &details).unwrap();
    let again = career::find_for_student(&conn, owner).unwrap().unwrap();
    assert_eq!(again.hobbies.len(), 2);
}

#[test]
fn personal_problem_survey_round_trip() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");

    let survey = mentorlink::models::problem::PersonalProblem {
        examination_anxiety: true,
        time_management_problem: true,
        ..Default::default()
    };
    mentorlink::models::problem::upsert(&conn, owner, &survey).unwrap();

    let found = mentorlink::models::problem::find_for_student(&conn, owner)
        .unwrap()
        .unwrap();
    assert!(found.examination_anxiety);
    assert!(found.time_management_problem);
    assert!(!found.stress);

    // A later submission clears flags it omits.
    let cleared = mentorlink::models::problem::PersonalProblem::default();
    mentorlink::models::problem::upsert(&conn, owner, &cleared).unwrap();
    let after = mentorlink::models::problem::find_for_student(&conn, owner)
        .unwrap()
        .unwrap();
    assert!(!after.examination_anxiety);
}

#[test]
fn semester_records_nest_subjects() {
    let (_dir, conn) = setup_test_db();
    let owner = create_student(&conn, 1001, "A. Kumar", "CSE");

    let sem_id = semester::upsert(&conn, owner, 3, 8.4, 8.1).unwrap();
    semester::add_subject(
        &conn,
        sem_id,
        &semester::NewSubject {
            subject_name: "Operating Systems".to_string(),
            subject_code: "CS301".to_string(),
            minor1: 18.0,
            mid_exam: 22.0,
            minor2: 17.0,
            end_exam: 48.0,
            total: 105.0,
            conducted_hours: 40,
            attended_hours: 36,
            attendance_percentage: 90.0,
            remarks: "Good".to_string(),
        },
    )
    .unwrap();

    assert_eq!(semester::owner_of(&conn, sem_id).unwrap(), Some(owner));

    let listed = semester::list_for_student(&conn, owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].subjects.len(), 1);
    assert_eq!(listed[0].subjects[0].subject_code, "CS301");

    // Upsert refreshes the GPA without duplicating the semester row.
    semester::upsert(&conn, owner, 3, 8.6, 8.2).unwrap();
    let again = semester::list_for_student(&conn, owner).unwrap();
    assert_eq!(again.len(), 1);
    assert!((again[0].sgpa - 8.6).abs() < f64::EPSILON);
}

#[test]
fn messages_are_append_only_and_directed() {
    let (_dir, conn) = setup_test_db();
    let faculty_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let sender = create_principal(&conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id });
    let receiver = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });

    message::create(&conn, sender, "Prof. Sharma", receiver, "See me after class").unwrap();
    message::create(&conn, sender, "Prof. Sharma", receiver, "Bring your report").unwrap();

    assert_eq!(message::list_for_receiver(&conn, receiver).unwrap().len(), 2);
    assert_eq!(message::list_for_sender(&conn, sender).unwrap().len(), 2);
    assert!(message::list_for_receiver(&conn, sender).unwrap().is_empty());
}

#[test]
fn principal_lookup_by_linked_record() {
    let (_dir, conn) = setup_test_db();
    let faculty_id = create_faculty(&conn, "F001", "Prof. Sharma", "CSE");
    let student_id = create_student(&conn, 1001, "A. Kumar", "CSE");
    let fp = create_principal(&conn, "sharma@nitap.ac.in", Role::Faculty { faculty_id });
    let sp = create_principal(&conn, "b1001@nitap.ac.in", Role::Student { student_id });

    assert_eq!(principal::find_by_faculty_id(&conn, faculty_id).unwrap().unwrap().id, fp);
    assert_eq!(principal::find_by_student_id(&conn, student_id).unwrap().unwrap().id, sp);
    assert!(principal::find_by_student_id(&conn, 999).unwrap().is_none());
}
