use std::collections::HashSet;

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::models::principal::{Principal, Role};
use crate::models::hod;

#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: i64,
    pub created_by: i64,
    pub faculty_id: Option<i64>,
    pub hod_id: Option<i64>,
    pub meeting_date: String,
    pub meeting_time: String,
    pub description: String,
    pub status: String,
    pub cancel_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// API projection: includes the participant set and the date-inferred status.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingView {
    pub id: i64,
    pub created_by: i64,
    pub faculty_id: Option<i64>,
    pub hod_id: Option<i64>,
    pub meeting_date: String,
    pub meeting_time: String,
    pub description: String,
    pub status: String,
    pub cancel_reason: Option<String>,
    pub student_ids: Vec<i64>,
}

const SELECT_MEETING: &str = "\
    SELECT m.id, m.created_by, m.faculty_id, m.hod_id, m.meeting_date, \
           m.meeting_time, m.description, m.status, m.cancel_reason, \
           m.created_at, m.updated_at \
    FROM meetings m";

fn row_to_meeting(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
    Ok(Meeting {
        id: row.get("id")?,
        created_by: row.get("created_by")?,
        faculty_id: row.get("faculty_id")?,
        hod_id: row.get("hod_id")?,
        meeting_date: row.get("meeting_date")?,
        meeting_time: row.get("meeting_time")?,
        description: row.get("description")?,
        status: row.get("status")?,
        cancel_reason: row.get("cancel_reason")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub struct NewMeeting {
    pub created_by: i64,
    pub faculty_id: Option<i64>,
    pub hod_id: Option<i64>,
    pub meeting_date: String,
    pub meeting_time: String,
    pub description: String,
}

/// Persist a meeting and its participant set in one transaction. The
/// participant rows are written exactly once here; no update path exists.
pub fn create(
    conn: &mut Connection,
    new: &NewMeeting,
    participant_student_ids: &[i64],
) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO meetings (created_by, faculty_id, hod_id, meeting_date, \
             meeting_time, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.created_by,
            new.faculty_id,
            new.hod_id,
            new.meeting_date,
            new.meeting_time,
            new.description,
        ],
    )?;
    let meeting_id = tx.last_insert_rowid();
    for student_id in participant_student_ids {
        tx.execute(
            "INSERT INTO meeting_participants (meeting_id, student_id) VALUES (?1, ?2)",
            params![meeting_id, student_id],
        )?;
    }
    tx.commit()?;
    Ok(meeting_id)
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Meeting>> {
    let sql = format!("{SELECT_MEETING} WHERE m.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_meeting)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn participants(conn: &Connection, meeting_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT student_id FROM meeting_participants WHERE meeting_id = ?1 ORDER BY student_id",
    )?;
    let rows = stmt.query_map(params![meeting_id], |row| row.get(0))?;
    rows.collect()
}

/// A scheduled meeting whose date has passed reads as completed; explicit
/// terminal states are reported as stored.
pub fn effective_status(status: &str, meeting_date: &str, today: &str) -> String {
    if status == "scheduled" && meeting_date < today {
        "completed".to_string()
    } else {
        status.to_string()
    }
}

pub fn to_view(conn: &Connection, meeting: &Meeting, today: &str) -> rusqlite::Result<MeetingView> {
    Ok(MeetingView {
        id: meeting.id,
        created_by: meeting.created_by,
        faculty_id: meeting.faculty_id,
        hod_id: meeting.hod_id,
        meeting_date: meeting.meeting_date.clone(),
        meeting_time: meeting.meeting_time.clone(),
        description: meeting.description.clone(),
        status: effective_status(&meeting.status, &meeting.meeting_date, today),
        cancel_reason: meeting.cancel_reason.clone(),
        student_ids: participants(conn, meeting.id)?,
    })
}

/// Meetings a student participates in, newest-scheduled-first.
pub fn find_for_student(conn: &Connection, student_id: i64) -> rusqlite::Result<Vec<Meeting>> {
    let sql = format!(
        "{SELECT_MEETING} \
         JOIN meeting_participants mp ON mp.meeting_id = m.id \
         WHERE mp.student_id = ?1 \
         ORDER BY m.meeting_date DESC, m.meeting_time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![student_id], row_to_meeting)?;
    rows.collect()
}

/// Meetings created by a principal, newest-scheduled-first.
pub fn find_created_by(conn: &Connection, principal_id: i64) -> rusqlite::Result<Vec<Meeting>> {
    let sql = format!(
        "{SELECT_MEETING} WHERE m.created_by = ?1 \
         ORDER BY m.meeting_date DESC, m.meeting_time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![principal_id], row_to_meeting)?;
    rows.collect()
}

/// Meetings involving a department, through either the organizing faculty or
/// the bound HOD record.
pub fn find_for_department(conn: &Connection, department: &str) -> rusqlite::Result<Vec<Meeting>> {
    let sql = format!(
        "{SELECT_MEETING} \
         LEFT JOIN faculty f ON m.faculty_id = f.id \
         LEFT JOIN hod_records h ON m.hod_id = h.id \
         WHERE f.department = ?1 OR h.department = ?1 \
         ORDER BY m.meeting_date DESC, m.meeting_time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![department], row_to_meeting)?;
    rows.collect()
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Meeting>> {
    let sql = format!("{SELECT_MEETING} ORDER BY m.meeting_date DESC, m.meeting_time DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![], row_to_meeting)?;
    rows.collect()
}

/// Scoped listing per role. Faculty see their own meetings; an acting HOD
/// additionally sees the department's.
pub fn list_for_principal(conn: &Connection, principal: &Principal) -> rusqlite::Result<Vec<Meeting>> {
    match &principal.role {
        Role::Admin => find_all(conn),
        Role::Student { student_id } => find_for_student(conn, *student_id),
        Role::Hod { faculty_id } | Role::Faculty { faculty_id } => {
            let mut meetings = find_created_by(conn, principal.id)?;
            if let Some(record) = hod::active_for_faculty(conn, *faculty_id)? {
                let mut seen: HashSet<i64> = meetings.iter().map(|m| m.id).collect();
                for m in find_for_department(conn, &record.department)? {
                    if seen.insert(m.id) {
                        meetings.push(m);
                    }
                }
                meetings.sort_by(|a, b| {
                    (&b.meeting_date, &b.meeting_time).cmp(&(&a.meeting_date, &a.meeting_time))
                });
            }
            Ok(meetings)
        }
    }
}

/// Cancel a scheduled meeting. Returns false when the stored status is
/// already terminal; the WHERE guard makes the transition atomic.
pub fn mark_cancelled(conn: &Connection, id: i64, reason: Option<&str>) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE meetings SET status = 'cancelled', cancel_reason = ?1, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?2 AND status = 'scheduled'",
        params![reason, id],
    )?;
    Ok(changed > 0)
}

/// Mark a scheduled meeting completed. Same terminal guard as cancel.
pub fn mark_completed(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE meetings SET status = 'completed', \
             updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?1 AND status = 'scheduled'",
        params![id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::effective_status;

    #[test]
    fn past_scheduled_reads_completed() {
        assert_eq!(effective_status("scheduled", "2024-01-10", "2024-02-01"), "completed");
        assert_eq!(effective_status("scheduled", "2024-03-10", "2024-02-01"), "scheduled");
    }

    #[test]
    fn terminal_states_are_reported_as_stored() {
        assert_eq!(effective_status("cancelled", "2024-01-10", "2024-02-01"), "cancelled");
        assert_eq!(effective_status("completed", "2024-03-10", "2024-02-01"), "completed");
    }
}
