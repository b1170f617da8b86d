//! Admin surface: unscoped student/faculty administration, principal account
//! creation, HOD appointments, request decisions, and the audit trail.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::password;
use crate::auth::policy;
use crate::auth::session as auth_session;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::faculty_handlers::DecideForm;
use crate::handlers::{created_json, ok_json};
use crate::models::principal::{self, NewPrincipal, Principal, PrincipalDisplay, Role};
use crate::models::{faculty, hod, request, student};

fn require_admin(conn: &rusqlite::Connection, session: &Session) -> Result<Principal, AppError> {
    let p = auth_session::require_principal(conn, session)?;
    policy::require_admin(&p)?;
    Ok(p)
}

// --- Students ---

pub async fn students(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;

    let page = query.get("page").and_then(|p| p.parse::<i64>().ok()).unwrap_or(1);
    let per_page = query.get("per_page").and_then(|p| p.parse::<i64>().ok()).unwrap_or(25);

    let scopes = policy::student_scope(&conn, &principal)?;
    let result = student::find_paginated(&conn, &scopes, page, per_page)?;
    Ok(ok_json(serde_json::json!({
        "items": result.students,
        "page": result.page,
        "per_page": result.per_page,
        "total": result.total_count,
        "total_pages": result.total_pages,
    })))
}

pub async fn create_student(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<student::NewStudent>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;

    if let Some(err) = validate::validate_required(&form.name, "Name", 255) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_email(&form.college_email) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_required(&form.department, "Department", 255) {
        return Err(AppError::Validation(err));
    }
    if student::find_by_roll(&conn, form.roll_number)?.is_some() {
        return Err(AppError::Validation("roll number already enrolled".to_string()));
    }

    let id = student::create(&conn, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "student.created", "student", id, serde_json::json!({
        "roll_number": form.roll_number,
    }));
    let created = student::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

pub async fn student_detail(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    require_admin(&conn, &session)?;
    let found = student::find_by_id(&conn, path.into_inner())?.ok_or(AppError::NotFound)?;
    Ok(ok_json(found))
}

pub async fn update_student(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<student::AdministrativeUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;
    let student_id = path.into_inner();
    student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;

    student::update_administrative(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "student.updated", "student", student_id, serde_json::json!({}));
    let updated = student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

// --- Faculty ---

pub async fn faculty_list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;
    let scopes = policy::faculty_scope(&conn, &principal)?;
    Ok(ok_json(faculty::list_scoped(&conn, &scopes)?))
}

pub async fn create_faculty(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<faculty::NewFaculty>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;

    if let Some(err) = validate::validate_required(&form.employee_id, "Employee id", 50) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_required(&form.name, "Name", 255) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_email(&form.college_email) {
        return Err(AppError::Validation(err));
    }
    if faculty::find_by_employee_id(&conn, &form.employee_id)?.is_some() {
        return Err(AppError::Validation("employee id already registered".to_string()));
    }

    let id = faculty::create(&conn, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "faculty.created", "faculty", id, serde_json::json!({
        "employee_id": form.employee_id,
    }));
    let created = faculty::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

pub async fn faculty_detail(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    require_admin(&conn, &session)?;
    let found = faculty::find_by_id(&conn, path.into_inner())?.ok_or(AppError::NotFound)?;
    Ok(ok_json(found))
}

pub async fn update_faculty(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<faculty::AdministrativeUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;
    let faculty_id = path.into_inner();
    faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;

    faculty::update_administrative(&conn, faculty_id, &form)?;
    let _ = crate::audit::log(&conn, principal.id, "faculty.updated", "faculty", faculty_id, serde_json::json!({}));
    let updated = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

// --- Principals ---

#[derive(Deserialize)]
pub struct NewPrincipalForm {
    pub email: String,
    pub password: String,
    pub role: String,
    pub faculty_id: Option<i64>,
    pub student_id: Option<i64>,
}

/// POST /admin/principals — create a login account linked to an existing
/// student or faculty record (or another admin).
pub async fn create_principal(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<NewPrincipalForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let acting = require_admin(&conn, &session)?;

    if let Some(err) = validate::validate_email(&form.email) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_password(&form.password) {
        return Err(AppError::Validation(err));
    }

    let role = match (form.role.as_str(), form.faculty_id, form.student_id) {
        ("ADMIN", None, None) => Role::Admin,
        ("HOD", Some(faculty_id), None) => Role::Hod { faculty_id },
        ("FACULTY", Some(faculty_id), None) => Role::Faculty { faculty_id },
        ("STUDENT", None, Some(student_id)) => Role::Student { student_id },
        _ => {
            return Err(AppError::Validation(
                "role must be ADMIN, HOD (faculty_id), FACULTY (faculty_id), or STUDENT (student_id)"
                    .to_string(),
            ));
        }
    };

    // The linked record must exist before an account can point at it.
    if let Some(faculty_id) = role.faculty_id() {
        faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;
    }
    if let Some(student_id) = role.student_id() {
        student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    }

    let hash = password::hash_password(&form.password).map_err(AppError::Hash)?;
    let id = principal::create(&conn, &NewPrincipal {
        email: form.email.clone(),
        password_hash: hash,
        role,
    })?;

    let _ = crate::audit::log(&conn, acting.id, "principal.created", "principal", id, serde_json::json!({
        "role": form.role,
    }));
    let created = principal::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(PrincipalDisplay::from(&created)))
}

// --- HOD appointments ---

#[derive(Deserialize)]
pub struct AppointHodForm {
    pub faculty_id: i64,
    pub department: String,
    pub start_date: String,
}

/// POST /admin/hods — appoint a department head. The previous open-ended
/// record for the department, if any, is closed in the same transaction.
pub async fn appoint_hod(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<AppointHodForm>,
) -> Result<HttpResponse, AppError> {
    let mut conn = pool.get()?;
    let acting = require_admin(&conn, &session)?;

    if let Some(err) = validate::validate_date(&form.start_date, "Start date") {
        return Err(AppError::Validation(err));
    }
    faculty::find_by_id(&conn, form.faculty_id)?.ok_or(AppError::NotFound)?;

    let id = hod::appoint(&mut conn, form.faculty_id, &form.department, &form.start_date)?;
    let _ = crate::audit::log(&conn, acting.id, "hod.appointed", "hod_record", id, serde_json::json!({
        "faculty_id": form.faculty_id,
        "department": form.department,
    }));
    let created = hod::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

// --- Requests & audit ---

pub async fn requests(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    require_admin(&conn, &session)?;
    Ok(ok_json(request::list_all(&conn)?))
}

pub async fn decide_request(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<DecideForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = require_admin(&conn, &session)?;
    let request_id = path.into_inner();
    let found = request::find_by_id(&conn, request_id)?.ok_or(AppError::NotFound)?;

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

pub async fn audit_trail(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    require_admin(&conn, &session)?;
    let limit = query.get("limit").and_then(|l| l.parse::<i64>().ok()).unwrap_or(100);
    Ok(ok_json(crate::audit::recent(&conn, limit)?))
}
