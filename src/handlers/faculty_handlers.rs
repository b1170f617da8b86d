//! Faculty surface: own profile, mentees (read + administrative writes),
//! requests targeted at them, and notes to mentees. Meeting endpoints live
//! in `meeting_handlers`.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::policy;
use crate::auth::session as auth_session;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::{created_json, ok_json};
use crate::models::principal::Principal;
use crate::models::{faculty, mentorship, message, principal, request, student};

fn own_faculty_id(
    conn: &rusqlite::Connection,
    session: &Session,
) -> Result<(Principal, i64), AppError> {
    let p = auth_session::require_principal(conn, session)?;
    let faculty_id = policy::require_faculty_role(&p)?;
    Ok((p, faculty_id))
}

/// GET /faculty/profile
pub async fn profile(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, faculty_id) = own_faculty_id(&conn, &session)?;
    let found = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(found))
}

/// PUT /faculty/profile — contact and qualification fields only.
pub async fn update_profile(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<faculty::ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, faculty_id) = own_faculty_id(&conn, &session)?;

    if let Some(err) = validate::validate_email(&form.personal_email) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_required(&form.phone1, "Phone number", 50) {
        return Err(AppError::Validation(err));
    }

    faculty::update_profile(&conn, faculty_id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "faculty.profile_updated", "faculty", faculty_id, serde_json::json!({}));
    let updated = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

/// GET /faculty/mentees — the mentoring list, as full student records.
pub async fn mentees(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, faculty_id) = own_faculty_id(&conn, &session)?;
    let mut out = Vec::new();
    for student_id in mentorship::mentee_ids(&conn, faculty_id)? {
        if let Some(s) = student::find_by_id(&conn, student_id)? {
            out.push(s);
        }
    }
    Ok(ok_json(out))
}

/// GET /faculty/mentees/{id} — scoped read of one student.
pub async fn mentee(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_faculty_role(&principal)?;
    let found = policy::require_student(&conn, &principal, path.into_inner())?;
    Ok(ok_json(found))
}

/// PUT /faculty/mentees/{id} — administrative fields of a mentee.
pub async fn update_mentee(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<student::AdministrativeUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_faculty_role(&principal)?;
    let student_id = path.into_inner();
    policy::require_student(&conn, &principal, student_id)?;

    if let Some(err) = validate::validate_required(&form.name, "Name", 255) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_email(&form.college_email) {
        return Err(AppError::Validation(err));
    }

    student::update_administrative(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "student.updated", "student", student_id, serde_json::json!({}));
    let updated = student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

/// GET /faculty/mentees/{id}/record — the full dossier of one mentee:
/// profile plus every owned collection, in a single response.
pub async fn mentee_record(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_faculty_role(&principal)?;
    let found = policy::require_student(&conn, &principal, path.into_inner())?;
    let student_id = found.id;

    Ok(ok_json(serde_json::json!({
        "student": found,
        "internships": crate::models::internship::list_for_student(&conn, student_id)?,
        "projects": crate::models::project::list_for_student(&conn, student_id)?,
        "cocurriculars": crate::models::cocurricular::list_for_student(&conn, student_id)?,
        "semesters": crate::models::semester::list_for_student(&conn, student_id)?,
        "career_details": crate::models::career::find_for_student(&conn, student_id)?,
        "personal_problems": crate::models::problem::find_for_student(&conn, student_id)?,
    })))
}

#[derive(Deserialize)]
pub struct SemesterForm {
    pub semester: i64,
    #[serde(default)]
    pub sgpa: f64,
    #[serde(default)]
    pub cgpa: f64,
}

/// POST /faculty/mentees/{id}/semesters — record or refresh a semester
/// result for a mentee.
pub async fn upsert_semester(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<SemesterForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_faculty_role(&principal)?;
    let student_id = path.into_inner();
    policy::require_student(&conn, &principal, student_id)?;

    if !(1..=10).contains(&form.semester) {
        return Err(AppError::Validation("semester must be between 1 and 10".to_string()));
    }

    let id = crate::models::semester::upsert(&conn, student_id, form.semester, form.sgpa, form.cgpa)?;
    let _ = crate::audit::log(&conn, principal.id, "semester.recorded", "semester", id, serde_json::json!({
        "student_id": student_id,
        "semester": form.semester,
    }));
    Ok(ok_json(serde_json::json!({ "id": id })))
}

/// POST /faculty/semesters/{semester_id}/subjects — add a subject row to a
/// mentee's semester record.
pub async fn add_subject(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<crate::models::semester::NewSubject>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_faculty_role(&principal)?;
    let semester_id = path.into_inner();
    let student_id = crate::models::semester::owner_of(&conn, semester_id)?.ok_or(AppError::NotFound)?;
    policy::require_student(&conn, &principal, student_id)?;

    if let Some(err) = validate::validate_required(&form.subject_name, "Subject name", 255) {
        return Err(AppError::Validation(err));
    }

    let id = crate::models::semester::add_subject(&conn, semester_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "subject.recorded", "subject", id, serde_json::json!({
        "semester_id": semester_id,
    }));
    Ok(created_json(serde_json::json!({ "id": id })))
}

#[derive(Deserialize)]
pub struct DecideForm {
    pub approve: bool,
    pub review_notes: Option<String>,
}

/// GET /faculty/requests — requests targeted at this faculty member, plus
/// their own filed requests.
pub async fn requests(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, _) = own_faculty_id(&conn, &session)?;
    let mut targeted = request::list_targeted_at(&conn, p.id)?;
    let own = request::list_for_requester(&conn, p.id)?;
    targeted.extend(own);
    Ok(ok_json(targeted))
}

/// POST /faculty/requests — a faculty member files a request (e.g. to the HOD).
pub async fn create_request(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<request::NewRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, _) = own_faculty_id(&conn, &session)?;
    if let Some(err) = validate::validate_required(&form.request_type, "Request type", 50) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_required(&form.description, "Description", 2000) {
        return Err(AppError::Validation(err));
    }
    let id = request::create(&conn, p.id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "request.created", "request", id, serde_json::json!({
        "type": form.request_type,
    }));
    let created = request::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

/// POST /faculty/requests/{id}/decide — decide a request targeted at self.
pub async fn decide_request(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<DecideForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let request_id = path.into_inner();
    let found = request::find_by_id(&conn, request_id)?.ok_or(AppError::NotFound)?;
    policy::can_decide_request(&conn, &principal, &found)?;

    if !request::decide(&conn, request_id, principal.id, form.approve, form.review_notes.as_deref())? {
        return Err(AppError::AlreadyTerminal(format!(
            "request is already {}",
            found.status
        )));
    }

    let _ = crate::audit::log(&conn, principal.id, "request.decided", "request", request_id, serde_json::json!({
        "approve": form.approve,
    }));
    let updated = request::find_by_id(&conn, request_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

#[derive(Deserialize)]
pub struct MessageForm {
    pub student_id: i64,
    pub body: String,
}

/// POST /faculty/messages — send a note to a student in scope.
pub async fn send_message(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<MessageForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let faculty_id = policy::require_faculty_role(&principal)?;
    policy::require_student(&conn, &principal, form.student_id)?;

    if let Some(err) = validate::validate_required(&form.body, "Message", 2000) {
        return Err(AppError::Validation(err));
    }

    let receiver = principal::find_by_student_id(&conn, form.student_id)?
        .ok_or_else(|| AppError::Validation("student has no account".to_string()))?;
    let sender = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;

    let id = message::create(&conn, principal.id, &sender.name, receiver.id, &form.body)?;
    let _ = crate::audit::log(&conn, principal.id, "message.sent", "message", id, serde_json::json!({}));
    Ok(created_json(serde_json::json!({ "id": id })))
}

/// GET /faculty/messages — notes this faculty member has sent.
pub async fn messages(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, _) = own_faculty_id(&conn, &session)?;
    Ok(ok_json(message::list_for_sender(&conn, p.id)?))
}
