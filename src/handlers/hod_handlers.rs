//! HOD surface: department-scoped student and faculty administration,
//! mentorship assignment, and request decisions. Authority always derives
//! from the open-ended HOD record, so a closed appointment loses these
//! endpoints immediately.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::policy;
use crate::auth::session as auth_session;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::faculty_handlers::DecideForm;
use crate::handlers::{created_json, ok_json};
use crate::models::{faculty, mentorship, request, student};

/// GET /hod/students — paginated department listing.
/// Query params: page (default 1), per_page (default 25).
pub async fn students(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;

    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(25);

    // The department listing is strictly the department, even when the HOD
    // also mentors students enrolled elsewhere.
    let scopes = policy::ScopeSet::new(vec![policy::Scope::Department(record.department)]);
    let result = student::find_paginated(&conn, &scopes, page, per_page)?;
    Ok(ok_json(serde_json::json!({
        "items": result.students,
        "page": result.page,
        "per_page": result.per_page,
        "total": result.total_count,
        "total_pages": result.total_pages,
    })))
}

/// POST /hod/students — enrol a student into the HOD's own department.
pub async fn create_student(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<student::NewStudent>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;

    if form.department != record.department {
        return Err(AppError::Forbidden(
            "cannot enrol students outside your department".to_string(),
        ));
    }
    if let Some(err) = validate::validate_required(&form.name, "Name", 255) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_email(&form.college_email) {
        return Err(AppError::Validation(err));
    }
    if student::find_by_roll(&conn, form.roll_number)?.is_some() {
        return Err(AppError::Validation("roll number already enrolled".to_string()));
    }

    let id = student::create(&conn, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "student.created", "student", id, serde_json::json!({
        "roll_number": form.roll_number,
        "department": form.department,
    }));
    let created = student::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

/// GET /hod/students/{id}
pub async fn student_detail(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_acting_hod(&conn, &principal)?;
    let found = policy::require_student(&conn, &principal, path.into_inner())?;
    Ok(ok_json(found))
}

/// PUT /hod/students/{id} — administrative update within the department.
pub async fn update_student(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<student::AdministrativeUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;
    let student_id = path.into_inner();
    policy::require_student(&conn, &principal, student_id)?;

    // Moving a student out of the department would move them out of scope.
    if form.department != record.department {
        return Err(AppError::Forbidden(
            "cannot move students outside your department".to_string(),
        ));
    }

    student::update_administrative(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "student.updated", "student", student_id, serde_json::json!({}));
    let updated = student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

/// GET /hod/faculty — department faculty listing.
pub async fn faculty_list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_acting_hod(&conn, &principal)?;
    let scopes = policy::faculty_scope(&conn, &principal)?;
    Ok(ok_json(faculty::list_scoped(&conn, &scopes)?))
}

/// GET /hod/faculty/{id}
pub async fn faculty_detail(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_acting_hod(&conn, &principal)?;
    let found = policy::require_faculty(&conn, &principal, path.into_inner())?;
    Ok(ok_json(found))
}

/// PUT /hod/faculty/{id} — administrative fields of a department colleague.
pub async fn update_faculty(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<faculty::AdministrativeUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;
    let faculty_id = path.into_inner();
    policy::require_faculty(&conn, &principal, faculty_id)?;

    if form.department != record.department {
        return Err(AppError::Forbidden(
            "cannot move faculty outside your department".to_string(),
        ));
    }
    if let Some(err) = validate::validate_email(&form.college_email) {
        return Err(AppError::Validation(err));
    }

    faculty::update_administrative(&conn, faculty_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "faculty.updated", "faculty", faculty_id, serde_json::json!({}));
    let updated = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

#[derive(Deserialize)]
pub struct MentorshipForm {
    pub faculty_id: i64,
    pub student_id: i64,
}

/// POST /hod/mentorships — assign (or move) a mentee to a mentor. Both sides
/// must be inside the department.
pub async fn assign_mentorship(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<MentorshipForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_acting_hod(&conn, &principal)?;

    policy::require_student(&conn, &principal, form.student_id)?;
    policy::require_faculty(&conn, &principal, form.faculty_id)?;

    let previous = mentorship::mentor_of(&conn, form.student_id)?;
    mentorship::assign(&conn, form.faculty_id, form.student_id)?;

    let _ = crate::audit::log(&conn, principal.id, "mentorship.assigned", "student", form.student_id, serde_json::json!({
        "faculty_id": form.faculty_id,
        "previous_faculty_id": previous,
    }));
    Ok(ok_json(serde_json::json!({ "message": "Mentor assigned" })))
}

/// DELETE /hod/mentorships/{student_id} — release a student from mentoring.
pub async fn remove_mentorship(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    policy::require_acting_hod(&conn, &principal)?;
    let student_id = path.into_inner();
    policy::require_student(&conn, &principal, student_id)?;

    mentorship::remove(&conn, student_id)?;
    let _ = crate::audit::log(&conn, principal.id, "mentorship.removed", "student", student_id, serde_json::json!({}));
    Ok(ok_json(serde_json::json!({ "message": "Mentor removed" })))
}

/// GET /hod/requests — requests from the department's members.
pub async fn requests(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;
    Ok(ok_json(request::list_for_department(&conn, &record.department)?))
}

/// POST /hod/requests/{id}/decide
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
