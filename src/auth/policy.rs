//! Role-based access scoping.
//!
//! Every data-fetching operation first resolves the principal's scope set,
//! then applies it as a mandatory SQL filter ahead of any caller-supplied
//! condition. Out-of-scope access to an existing resource is `Forbidden`,
//! never `NotFound`; 404 is reserved for ids that do not exist at all.

use rusqlite::Connection;
use rusqlite::types::Value;

use crate::errors::AppError;
use crate::models::principal::{Principal, Role};
use crate::models::request::Request;
use crate::models::{faculty, hod, student};

/// One branch of a scope predicate. A principal's effective scope is a
/// non-empty union of these (`ScopeSet`).
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    All,
    /// Rows whose department matches.
    Department(String),
    /// Students mentored by this faculty id.
    Mentees(i64),
    /// The student's own row.
    SelfStudent(i64),
    /// The faculty member's own row.
    SelfFaculty(i64),
    /// The faculty currently mentoring this student (public-profile read).
    MentorOf(i64),
}

#[derive(Debug, Clone)]
pub struct ScopeSet(Vec<Scope>);

impl ScopeSet {
    pub fn new(scopes: Vec<Scope>) -> Self {
        ScopeSet(scopes)
    }

    pub fn all() -> Self {
        ScopeSet(vec![Scope::All])
    }

    /// Predicate over the `students` table. Variants that do not apply to
    /// this table contribute a false branch, so a misrouted scope can only
    /// narrow, never widen. An empty set yields an always-false predicate.
    pub fn student_predicate(&self, alias: &str) -> (String, Vec<Value>) {
        self.predicate(|scope, parts, values| match scope {
            Scope::All => parts.push("1=1".to_string()),
            Scope::Department(dept) => {
                parts.push(format!("{alias}.department = ?"));
                values.push(Value::Text(dept.clone()));
            }
            Scope::Mentees(faculty_id) => {
                parts.push(format!(
                    "{alias}.id IN (SELECT student_id FROM mentorships WHERE faculty_id = ?)"
                ));
                values.push(Value::Integer(*faculty_id));
            }
            Scope::SelfStudent(student_id) => {
                parts.push(format!("{alias}.id = ?"));
                values.push(Value::Integer(*student_id));
            }
            Scope::SelfFaculty(_) | Scope::MentorOf(_) => parts.push("1=0".to_string()),
        })
    }

    /// Predicate over the `faculty` table.
    pub fn faculty_predicate(&self, alias: &str) -> (String, Vec<Value>) {
        self.predicate(|scope, parts, values| match scope {
            Scope::All => parts.push("1=1".to_string()),
            Scope::Department(dept) => {
                parts.push(format!("{alias}.department = ?"));
                values.push(Value::Text(dept.clone()));
            }
            Scope::SelfFaculty(faculty_id) => {
                parts.push(format!("{alias}.id = ?"));
                values.push(Value::Integer(*faculty_id));
            }
            Scope::MentorOf(student_id) => {
                parts.push(format!(
                    "{alias}.id IN (SELECT faculty_id FROM mentorships WHERE student_id = ?)"
                ));
                values.push(Value::Integer(*student_id));
            }
            Scope::Mentees(_) | Scope::SelfStudent(_) => parts.push("1=0".to_string()),
        })
    }

    fn predicate<F>(&self, mut branch: F) -> (String, Vec<Value>)
    where
        F: FnMut(&Scope, &mut Vec<String>, &mut Vec<Value>),
    {
        let mut parts: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for scope in &self.0 {
            branch(scope, &mut parts, &mut values);
        }
        if parts.is_empty() {
            return ("(1=0)".to_string(), values);
        }
        (format!("({})", parts.join(" OR ")), values)
    }
}

/// Which students a principal may see (and, for faculty/HOD/admin, write).
///
/// A faculty holding an open-ended HOD record gets the union of mentee and
/// department scope for the duration of the appointment; the department is
/// read from the HOD record, which wins if it diverges from the faculty's
/// own. An HOD-role principal whose record has been closed falls back to
/// plain mentee scope.
pub fn student_scope(conn: &Connection, principal: &Principal) -> Result<ScopeSet, AppError> {
    match &principal.role {
        Role::Admin => Ok(ScopeSet::all()),
        Role::Hod { faculty_id } | Role::Faculty { faculty_id } => {
            let mut scopes = vec![Scope::Mentees(*faculty_id)];
            if let Some(record) = hod::active_for_faculty(conn, *faculty_id)? {
                scopes.push(Scope::Department(record.department));
            }
            Ok(ScopeSet::new(scopes))
        }
        Role::Student { student_id } => Ok(ScopeSet::new(vec![Scope::SelfStudent(*student_id)])),
    }
}

/// Which faculty records a principal may see.
pub fn faculty_scope(conn: &Connection, principal: &Principal) -> Result<ScopeSet, AppError> {
    match &principal.role {
        Role::Admin => Ok(ScopeSet::all()),
        Role::Hod { faculty_id } | Role::Faculty { faculty_id } => {
            let mut scopes = vec![Scope::SelfFaculty(*faculty_id)];
            if let Some(record) = hod::active_for_faculty(conn, *faculty_id)? {
                scopes.push(Scope::Department(record.department));
            }
            Ok(ScopeSet::new(scopes))
        }
        Role::Student { student_id } => Ok(ScopeSet::new(vec![Scope::MentorOf(*student_id)])),
    }
}

/// Fetch a student, enforcing scope. Missing id → `NotFound`; existing but
/// out of scope → `Forbidden`.
pub fn require_student(
    conn: &Connection,
    principal: &Principal,
    student_id: i64,
) -> Result<student::Student, AppError> {
    let found = student::find_by_id(conn, student_id)?.ok_or(AppError::NotFound)?;
    let scopes = student_scope(conn, principal)?;
    if !student::in_scope(conn, student_id, &scopes)? {
        return Err(AppError::Forbidden("student is outside your scope".to_string()));
    }
    Ok(found)
}

/// Resolve and scope-check a meeting's participant set. Duplicate ids are
/// collapsed; any id that does not exist or falls outside the creator's
/// student scope aborts the whole operation with `InvalidParticipant`.
pub fn require_participants(
    conn: &Connection,
    principal: &Principal,
    ids: &[i64],
) -> Result<Vec<student::Student>, AppError> {
    let scopes = student_scope(conn, principal)?;
    let mut seen = std::collections::HashSet::new();
    let mut participants = Vec::new();
    for &id in ids {
        if !seen.insert(id) {
            continue;
        }
        let found = student::find_by_id(conn, id)?
            .ok_or_else(|| AppError::InvalidParticipant(format!("student {id} does not exist")))?;
        if !student::in_scope(conn, id, &scopes)? {
            return Err(AppError::InvalidParticipant(format!(
                "student {id} is not within your mentoring scope"
            )));
        }
        participants.push(found);
    }
    Ok(participants)
}

pub fn require_faculty(
    conn: &Connection,
    principal: &Principal,
    faculty_id: i64,
) -> Result<faculty::Faculty, AppError> {
    let found = faculty::find_by_id(conn, faculty_id)?.ok_or(AppError::NotFound)?;
    let scopes = faculty_scope(conn, principal)?;
    if !faculty::in_scope(conn, faculty_id, &scopes)? {
        return Err(AppError::Forbidden("faculty is outside your scope".to_string()));
    }
    Ok(found)
}

/// The student id of a STUDENT principal.
pub fn require_student_role(principal: &Principal) -> Result<i64, AppError> {
    principal
        .role
        .student_id()
        .ok_or_else(|| AppError::Forbidden("student role required".to_string()))
}

/// The faculty id of a FACULTY or HOD principal.
pub fn require_faculty_role(principal: &Principal) -> Result<i64, AppError> {
    principal
        .role
        .faculty_id()
        .ok_or_else(|| AppError::Forbidden("faculty role required".to_string()))
}

/// The open-ended HOD record backing this principal's department authority.
/// Fails closed when the appointment has been closed.
pub fn require_acting_hod(
    conn: &Connection,
    principal: &Principal,
) -> Result<hod::HodRecord, AppError> {
    let faculty_id = principal
        .role
        .faculty_id()
        .ok_or_else(|| AppError::Forbidden("HOD role required".to_string()))?;
    hod::active_for_faculty(conn, faculty_id)?
        .ok_or_else(|| AppError::Forbidden("no active HOD appointment".to_string()))
}

pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    match principal.role {
        Role::Admin => Ok(()),
        _ => Err(AppError::Forbidden("admin role required".to_string())),
    }
}

/// Department a principal belongs to (membership, not authority): a
/// student's own department, or the faculty record's department.
pub fn principal_department(
    conn: &Connection,
    principal: &Principal,
) -> Result<Option<String>, AppError> {
    match &principal.role {
        Role::Admin => Ok(None),
        Role::Hod { faculty_id } | Role::Faculty { faculty_id } => {
            Ok(faculty::find_by_id(conn, *faculty_id)?.map(|f| f.department))
        }
        Role::Student { student_id } => {
            Ok(student::find_by_id(conn, *student_id)?.map(|s| s.department))
        }
    }
}

/// Whether a principal may decide (approve/reject) a request: ADMIN anywhere,
/// an acting HOD when the requester belongs to their department, a FACULTY
/// member when the request targets them.
pub fn can_decide_request(
    conn: &Connection,
    principal: &Principal,
    request: &Request,
) -> Result<(), AppError> {
    match &principal.role {
        Role::Admin => Ok(()),
        Role::Hod { .. } | Role::Faculty { .. } => {
            if request.target_id == Some(principal.id) {
                return Ok(());
            }
            // Department authority requires an open HOD record.
            if let Ok(record) = require_acting_hod(conn, principal) {
                let requester = crate::models::principal::find_by_id(conn, request.requester_id)?
                    .ok_or(AppError::NotFound)?;
                if principal_department(conn, &requester)?.as_deref() == Some(record.department.as_str()) {
                    return Ok(());
                }
            }
            Err(AppError::Forbidden("request is outside your scope".to_string()))
        }
        Role::Student { .. } => {
            Err(AppError::Forbidden("students cannot decide requests".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_set_fails_closed() {
        let (pred, values) = ScopeSet::new(vec![]).student_predicate("s");
        assert_eq!(pred, "(1=0)");
        assert!(values.is_empty());
    }

    #[test]
    fn union_renders_or_branches() {
        let scopes = ScopeSet::new(vec![Scope::Mentees(7), Scope::Department("CSE".into())]);
        let (pred, values) = scopes.student_predicate("s");
        assert!(pred.contains(" OR "));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn student_only_scopes_are_false_for_faculty_table() {
        let scopes = ScopeSet::new(vec![Scope::Mentees(7)]);
        let (pred, values) = scopes.faculty_predicate("f");
        assert_eq!(pred, "(1=0)");
        assert!(values.is_empty());
    }
}
