use std::sync::OnceLock;
use std::time::Duration;

use actix_session::Session;
use chrono::Utc;
use rand::Rng;
use rusqlite::{Connection, params};

use crate::auth::password;
use crate::errors::AppError;
use crate::models::principal::{self, Principal};

/// Cookie key holding the opaque session token. The cookie carries nothing
/// else; the authoritative state lives in the `sessions` table.
pub const TOKEN_KEY: &str = "token";

fn now_plus(ttl: Duration) -> String {
    (Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// A throwaway hash verified against when the email is unknown, so login
/// timing does not reveal whether an account exists.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        password::hash_password("dummy-timing-password").unwrap_or_default()
    })
}

/// Verify an email/password pair against the unified principals table.
/// Unknown email, wrong password, and inactive accounts all produce the same
/// `InvalidCredentials`.
pub fn authenticate(conn: &Connection, email: &str, pass: &str) -> Result<Principal, AppError> {
    match principal::find_by_email(conn, email)? {
        Some(auth) => {
            let ok = password::verify_password(pass, &auth.password).unwrap_or(false);
            if ok && auth.principal.account_status == "ACTIVE" {
                Ok(auth.principal)
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        None => {
            let _ = password::verify_password(pass, dummy_hash());
            Err(AppError::InvalidCredentials)
        }
    }
}

/// Issue a session token for a principal.
pub fn issue(conn: &Connection, principal_id: i64, ttl: Duration) -> Result<String, AppError> {
    let token = generate_token();
    conn.execute(
        "INSERT INTO sessions (token, principal_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token, principal_id, now_plus(ttl)],
    )?;
    Ok(token)
}

/// Resolve a token to its principal. Unknown or expired tokens fail closed;
/// expired rows are deleted on sight. An INACTIVE principal's sessions stop
/// resolving immediately.
pub fn resolve(conn: &Connection, token: &str) -> Result<Principal, AppError> {
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT principal_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(AppError::Db(other)),
        })?;

    let (principal_id, expires_at) = row.ok_or(AppError::Unauthenticated)?;
    if expires_at <= now_iso() {
        revoke(conn, token)?;
        return Err(AppError::Unauthenticated);
    }

    let found = principal::find_by_id(conn, principal_id)?.ok_or(AppError::Unauthenticated)?;
    if found.account_status != "ACTIVE" {
        return Err(AppError::Unauthenticated);
    }
    Ok(found)
}

/// Resolve the principal for the current request from the session cookie.
pub fn require_principal(conn: &Connection, session: &Session) -> Result<Principal, AppError> {
    let token = session
        .get::<String>(TOKEN_KEY)
        .unwrap_or(None)
        .ok_or(AppError::Unauthenticated)?;
    resolve(conn, &token)
}

pub fn revoke(conn: &Connection, token: &str) -> Result<(), AppError> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Revoke every session of a principal except the one making the change.
pub fn revoke_others(conn: &Connection, principal_id: i64, keep_token: &str) -> Result<usize, AppError> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE principal_id = ?1 AND token != ?2",
        params![principal_id, keep_token],
    )?;
    Ok(removed)
}

pub fn purge_expired(conn: &Connection) -> Result<usize, AppError> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![now_iso()],
    )?;
    Ok(removed)
}

/// Change a principal's password after verifying the current one. When
/// `invalidate_others` is set, every other session of the principal is
/// revoked; the acting session survives.
pub fn change_password(
    conn: &Connection,
    principal: &Principal,
    acting_token: &str,
    current_password: &str,
    new_password: &str,
    invalidate_others: bool,
) -> Result<(), AppError> {
    let stored = principal::find_password_hash_by_id(conn, principal.id)?
        .ok_or(AppError::Unauthenticated)?;
    match password::verify_password(current_password, &stored) {
        Ok(true) => {}
        _ => return Err(AppError::InvalidCredentials),
    }

    if let Some(err) = crate::auth::validate::validate_password(new_password) {
        return Err(AppError::Validation(err));
    }

    let new_hash = password::hash_password(new_password).map_err(AppError::Hash)?;
    principal::update_password(conn, principal.id, &new_hash)?;

    if invalidate_others {
        let removed = revoke_others(conn, principal.id, acting_token)?;
        if removed > 0 {
            log::info!(
                "Password change revoked {removed} other session(s) for principal {}",
                principal.id
            );
        }
    }
    Ok(())
}
