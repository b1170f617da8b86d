//! Meeting workflow: creation (faculty and HOD flavors), scoped listing, and
//! the scheduled → completed/cancelled transitions. Creation validates every
//! participant against the creator's student scope before anything is
//! persisted, then fires the notification collaborator without blocking the
//! response on delivery.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::policy;
use crate::auth::session as auth_session;
use crate::auth::validate;
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::{created_json, ok_json};
use crate::models::meeting::{self, NewMeeting};
use crate::models::principal::Principal;
use crate::models::{faculty, hod, student};
use crate::notify::{MeetingNotice, Notifier, Recipient};

#[derive(Deserialize)]
pub struct MeetingForm {
    pub student_ids: Vec<i64>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub description: String,
    /// Faculty flow: also bind the department's current HOD.
    #[serde(default)]
    pub include_hod: bool,
    /// HOD flow: the faculty member conducting the meeting.
    pub faculty_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CancelForm {
    pub reason: Option<String>,
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn validate_form(form: &MeetingForm) -> Result<(), AppError> {
    if let Some(err) = validate::validate_date(&form.date, "date") {
        return Err(AppError::Validation(err));
    }
    if let Some(err) = validate::validate_time(&form.time, "time") {
        return Err(AppError::Validation(err));
    }
    if form.student_ids.is_empty() {
        return Err(AppError::Validation(
            "At least one participant student is required".to_string(),
        ));
    }
    Ok(())
}

fn best_email(college: &str, personal: &str) -> String {
    if college.is_empty() {
        personal.to_string()
    } else {
        college.to_string()
    }
}

fn student_recipients(students: &[student::Student]) -> Vec<Recipient> {
    students
        .iter()
        .map(|s| Recipient {
            name: s.name.clone(),
            role: "Student".to_string(),
            email: best_email(&s.college_email, &s.personal_email),
        })
        .collect()
}

fn dispatch_notice(
    notifier: web::Data<dyn Notifier>,
    config: &Config,
    meeting_id: i64,
    organizer: &faculty::Faculty,
    form: &MeetingForm,
    mut recipients: Vec<Recipient>,
) {
    recipients.push(Recipient {
        name: organizer.name.clone(),
        role: "Faculty".to_string(),
        email: best_email(&organizer.college_email, &organizer.personal_email),
    });
    let notice = MeetingNotice {
        meeting_id,
        organizer_name: organizer.name.clone(),
        meeting_date: form.date.clone(),
        meeting_time: form.time.clone(),
        description: form.description.clone(),
        recipients,
    };
    crate::notify::dispatch_meeting(notifier.into_inner(), notice, config.notify_timeout);
}

/// POST /faculty/meeting/new — a faculty member schedules a meeting with
/// their mentees, optionally binding the department's current HOD.
pub async fn create_for_faculty(
    pool: web::Data<DbPool>,
    session: Session,
    config: web::Data<Config>,
    notifier: web::Data<dyn Notifier>,
    form: web::Json<MeetingForm>,
) -> Result<HttpResponse, AppError> {
    let mut conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let faculty_id = policy::require_faculty_role(&principal)?;
    let organizer = faculty::find_by_id(&conn, faculty_id)?.ok_or(AppError::NotFound)?;

    validate_form(&form)?;
    let students = policy::require_participants(&conn, &principal, &form.student_ids)?;

    let hod_record = if form.include_hod {
        let record = hod::current_for_department(&conn, &organizer.department)?.ok_or_else(|| {
            AppError::Validation(format!(
                "No active HOD found for department: {}",
                organizer.department
            ))
        })?;
        Some(record)
    } else {
        None
    };

    let new = NewMeeting {
        created_by: principal.id,
        faculty_id: Some(organizer.id),
        hod_id: hod_record.as_ref().map(|r| r.id),
        meeting_date: form.date.clone(),
        meeting_time: form.time.clone(),
        description: form.description.clone(),
    };
    let participant_ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let meeting_id = meeting::create(&mut conn, &new, &participant_ids)?;

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "meeting.created",
        "meeting",
        meeting_id,
        serde_json::json!({
            "date": form.date,
            "participants": participant_ids,
            "include_hod": form.include_hod,
        }),
    );

    let mut recipients = student_recipients(&students);
    if let Some(record) = &hod_record {
        if let Some(head) = faculty::find_by_id(&conn, record.faculty_id)? {
            recipients.push(Recipient {
                name: head.name.clone(),
                role: "HOD".to_string(),
                email: best_email(&head.college_email, &head.personal_email),
            });
        }
    }
    dispatch_notice(notifier, &config, meeting_id, &organizer, &form, recipients);

    let created = meeting::find_by_id(&conn, meeting_id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(meeting::to_view(&conn, &created, &today())?))
}

/// POST /hod/meeting/new — the HOD schedules a department meeting, optionally
/// naming the conducting faculty member.
pub async fn create_for_hod(
    pool: web::Data<DbPool>,
    session: Session,
    config: web::Data<Config>,
    notifier: web::Data<dyn Notifier>,
    form: web::Json<MeetingForm>,
) -> Result<HttpResponse, AppError> {
    let mut conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let record = policy::require_acting_hod(&conn, &principal)?;
    let organizer = faculty::find_by_id(&conn, record.faculty_id)?.ok_or(AppError::NotFound)?;

    validate_form(&form)?;
    let students = policy::require_participants(&conn, &principal, &form.student_ids)?;

    let conducting = match form.faculty_id {
        Some(id) => {
            let found = faculty::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
            if found.department != record.department {
                return Err(AppError::Forbidden(
                    "faculty is outside your department".to_string(),
                ));
            }
            Some(found)
        }
        None => None,
    };

    let new = NewMeeting {
        created_by: principal.id,
        faculty_id: conducting.as_ref().map(|f| f.id),
        hod_id: Some(record.id),
        meeting_date: form.date.clone(),
        meeting_time: form.time.clone(),
        description: form.description.clone(),
    };
    let participant_ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let meeting_id = meeting::create(&mut conn, &new, &participant_ids)?;

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "meeting.created",
        "meeting",
        meeting_id,
        serde_json::json!({
            "date": form.date,
            "participants": participant_ids,
            "department": record.department,
        }),
    );

    let mut recipients = student_recipients(&students);
    if let Some(f) = &conducting {
        recipients.push(Recipient {
            name: f.name.clone(),
            role: "Faculty".to_string(),
            email: best_email(&f.college_email, &f.personal_email),
        });
    }
    dispatch_notice(notifier, &config, meeting_id, &organizer, &form, recipients);

    let created = meeting::find_by_id(&conn, meeting_id)?.ok_or(AppError::NotFound)?;
    Ok(created_json(meeting::to_view(&conn, &created, &today())?))
}

/// GET meetings for the calling principal, newest-scheduled-first, scoped by
/// role. Shared by every role's route table.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let meetings = meeting::list_for_principal(&conn, &principal)?;
    let today = today();
    let views = meetings
        .iter()
        .map(|m| meeting::to_view(&conn, m, &today))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ok_json(views))
}

/// Fetch a meeting and check the caller created it. Out-of-creator access is
/// `Forbidden` regardless of the meeting's visibility for reads.
fn require_creator(
    conn: &rusqlite::Connection,
    session: &Session,
    meeting_id: i64,
) -> Result<(Principal, meeting::Meeting), AppError> {
    let principal = auth_session::require_principal(conn, session)?;
    let found = meeting::find_by_id(conn, meeting_id)?.ok_or(AppError::NotFound)?;
    if found.created_by != principal.id {
        return Err(AppError::Forbidden(
            "only the meeting's creator may change it".to_string(),
        ));
    }
    Ok((principal, found))
}

/// POST .../meetings/{id}/cancel — scheduled → cancelled, creator only.
/// A second cancel (or cancel after complete) is `AlreadyTerminal`.
pub async fn cancel(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Json<CancelForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let meeting_id = path.into_inner();
    let (principal, found) = require_creator(&conn, &session, meeting_id)?;

    if !meeting::mark_cancelled(&conn, meeting_id, form.reason.as_deref())? {
        return Err(AppError::AlreadyTerminal(format!(
            "meeting is already {}",
            found.status
        )));
    }

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "meeting.cancelled",
        "meeting",
        meeting_id,
        serde_json::json!({ "reason": form.reason }),
    );

    let updated = meeting::find_by_id(&conn, meeting_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(meeting::to_view(&conn, &updated, &today())?))
}

/// POST .../meetings/{id}/complete — scheduled → completed, creator only.
pub async fn complete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let meeting_id = path.into_inner();
    let (principal, found) = require_creator(&conn, &session, meeting_id)?;

    if !meeting::mark_completed(&conn, meeting_id)? {
        return Err(AppError::AlreadyTerminal(format!(
            "meeting is already {}",
            found.status
        )));
    }

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "meeting.completed",
        "meeting",
        meeting_id,
        serde_json::json!({}),
    );

    let updated = meeting::find_by_id(&conn, meeting_id)?.ok_or(AppError::NotFound)?;
    Ok(ok_json(meeting::to_view(&conn, &updated, &today())?))
}
