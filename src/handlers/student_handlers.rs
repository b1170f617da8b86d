//! Student self-service surface. Every handler resolves the calling
//! principal to its own student id; there is no path here to any other
//! student's data.

use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::policy;
use crate::auth::session as auth_session;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::{created_json, ok_json};
use crate::models::{
    career, cocurricular, faculty, internship, mentorship, message, principal, problem, project,
    request, semester, student,
};

fn own_student_id(
    conn: &rusqlite::Connection,
    session: &Session,
) -> Result<(principal::Principal, i64), AppError> {
    let p = auth_session::require_principal(conn, session)?;
    let student_id = policy::require_student_role(&p)?;
    Ok((p, student_id))
}

/// GET /student/profile
pub async fn profile(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    let found = student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(found))
}

/// PUT /student/profile — self-reported fields only.
pub async fn update_profile(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<student::SelfUpdate>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;

    if let Some(err) = validate::validate_email(&form.personal_email) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_optional(&form.address, "Address", 500) {
        return Err(AppError::Validation(err));
    }

    student::update_self(&conn, student_id, &form)?;
    let _ = crate::audit::log(
        &conn,
        p.id,
        "student.self_updated",
        "student",
        student_id,
        serde_json::json!({}),
    );
    let updated = student::find_by_id(&conn, student_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(updated))
}

/// GET /student/mentor — public profile of the current mentor, if assigned.
pub async fn mentor(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    let view = match mentorship::mentor_of(&conn, student_id)? {
        Some(faculty_id) => faculty::find_by_id(&conn, faculty_id)?.map(faculty::FacultyPublic::from),
        None => None,
    };
    Ok(ok_json(view))
}

/// GET /student/semesters — academic record with subjects.
pub async fn semesters(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(semester::list_for_student(&conn, student_id)?))
}

// --- Internships ---

pub async fn internships(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(internship::list_for_student(&conn, student_id)?))
}

pub async fn add_internship(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<internship::InternshipForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    if let Some(err) = validate::validate_required(&form.organisation, "Organisation", 255) {
        return Err(AppError::Validation(err));
    }
    let id = internship::create(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "internship.created", "internship", id, serde_json::json!({}));
    Ok(created_json(serde_json::json!({ "id": id })))
}

pub async fn update_internship(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<internship::InternshipForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    if !internship::update(&conn, path.into_inner(), student_id, &form)? {
        return Err(AppError::NotFound);
    }
    Ok(ok_json(serde_json::json!({ "message": "Internship updated" })))
}

pub async fn delete_internship(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    if !internship::delete(&conn, path.into_inner(), student_id)? {
        return Err(AppError::NotFound);
    }
    Ok(ok_json(serde_json::json!({ "message": "Internship deleted" })))
}

// --- Projects ---

pub async fn projects(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(project::list_for_student(&conn, student_id)?))
}

pub async fn add_project(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<project::ProjectForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    if let Some(err) = validate::validate_required(&form.title, "Title", 255) {
        return Err(AppError::Validation(err));
    }
    let id = project::create(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "project.created", "project", id, serde_json::json!({}));
    Ok(created_json(serde_json::json!({ "id": id })))
}

pub async fn update_project(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<project::ProjectForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    if !project::update(&conn, path.into_inner(), student_id, &form)? {
        return Err(AppError::NotFound);
    }
    Ok(ok_json(serde_json::json!({ "message": "Project updated" })))
}

pub async fn delete_project(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    if !project::delete(&conn, path.into_inner(), student_id)? {
        return Err(AppError::NotFound);
    }
    Ok(ok_json(serde_json::json!({ "message": "Project deleted" })))
}

// --- Co-curricular activities ---

pub async fn cocurriculars(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(cocurricular::list_for_student(&conn, student_id)?))
}

pub async fn add_cocurricular(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<cocurricular::CoCurricularForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    if let Some(err) = validate::validate_date(&form.event_date, "Event date") {
        return Err(AppError::Validation(err));
    }
    let id = cocurricular::create(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "cocurricular.created", "cocurricular", id, serde_json::json!({}));
    Ok(created_json(serde_json::json!({ "id": id })))
}

pub async fn delete_cocurricular(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    if !cocurricular::delete(&conn, path.into_inner(), student_id)? {
        return Err(AppError::NotFound);
    }
    Ok(ok_json(serde_json::json!({ "message": "Activity deleted" })))
}

// --- Career details & personal problems (one record each) ---

pub async fn career_details(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(career::find_for_student(&conn, student_id)?))
}

pub async fn save_career_details(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<career::CareerDetails>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    career::upsert(&conn, student_id, &form)?;
    let _ = crate::audit::log(&conn, p.id, "career.saved", "student", student_id, serde_json::json!({}));
    Ok(ok_json(serde_json::json!({ "message": "Career details saved" })))
}

pub async fn personal_problems(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (_, student_id) = own_student_id(&conn, &session)?;
    Ok(ok_json(problem::find_for_student(&conn, student_id)?))
}

pub async fn save_personal_problems(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<problem::PersonalProblem>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    problem::upsert(&conn, student_id, &form)?;
    // Survey contents stay out of the audit trail.
    let _ = crate::audit::log(&conn, p.id, "problems.saved", "student", student_id, serde_json::json!({}));
    Ok(ok_json(serde_json::json!({ "message": "Survey saved" })))
}

// --- Requests & messages ---

/// POST /student/requests — file a request; defaults to targeting the
/// student's mentor when no explicit target is given.
pub async fn create_request(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<request::NewRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, student_id) = own_student_id(&conn, &session)?;
    if let Some(err) = validate::validate_required(&form.request_type, "Request type", 50) {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_required(&form.description, "Description", 2000) {
        return Err(AppError::Validation(err));
    }

    let mut new = form.into_inner();
    if new.target_id.is_none() {
        if let Some(faculty_id) = mentorship::mentor_of(&conn, student_id)? {
            new.target_id = principal::find_by_faculty_id(&conn, faculty_id)?.map(|m| m.id);
        }
    }

    let id = request::create(&conn, p.id, &new)?;
    let _ = crate::audit::log(&conn, p.id, "request.created", "request", id, serde_json::json!({
        "type": new.request_type,
    }));
    let created = request::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(created))
}

/// GET /student/requests — own requests only.
pub async fn list_requests(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, _) = own_student_id(&conn, &session)?;
    Ok(ok_json(request::list_for_requester(&conn, p.id)?))
}

/// GET /student/messages — notes received from mentors.
pub async fn messages(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let (p, _) = own_student_id(&conn, &session)?;
    Ok(ok_json(message::list_for_receiver(&conn, p.id)?))
}
