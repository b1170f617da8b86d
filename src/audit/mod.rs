use rusqlite::{Connection, params};
use serde_json::Value;

/// Days of audit history kept by the startup cleanup.
const RETENTION_DAYS: i64 = 90;

/// Append an audit entry. Call sites ignore the result (`let _ =`): a failed
/// audit write must never fail the operation being audited.
pub fn log(
    conn: &Connection,
    principal_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO audit_log (principal_id, action, target_type, target_id, details) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![principal_id, action, target_type, target_id, details.to_string()],
    )?;
    Ok(())
}

/// Delete audit entries older than the retention window. Run at startup.
pub fn cleanup_old_entries(conn: &Connection) {
    let cutoff = format!("-{RETENTION_DAYS} days");
    match conn.execute(
        "DELETE FROM audit_log WHERE created_at < strftime('%Y-%m-%dT%H:%M:%S','now', ?1)",
        params![cutoff],
    ) {
        Ok(0) => {}
        Ok(n) => log::info!("Audit cleanup removed {n} entries older than {RETENTION_DAYS} days"),
        Err(e) => log::warn!("Audit cleanup failed: {e}"),
    }
}

/// A recent slice of the audit trail (admin surface).
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub principal_id: i64,
    pub action: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: String,
    pub created_at: String,
}

pub fn recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, principal_id, action, target_type, target_id, details, created_at \
         FROM audit_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit.clamp(1, 500)], |row| {
        Ok(AuditEntry {
            id: row.get(0)?,
            principal_id: row.get(1)?,
            action: row.get(2)?,
            target_type: row.get(3)?,
            target_id: row.get(4)?,
            details: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;
    rows.collect()
}
