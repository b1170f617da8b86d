use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::session as auth_session;
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::ok_json;
use crate::models::principal::PrincipalDisplay;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
}

/// POST /auth/login — verify credentials, issue a session token into the
/// HTTP-only cookie. Failed attempts are rate-limited per IP before any
/// database access.
pub async fn login(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    session: Session,
    config: web::Data<Config>,
    limiter: web::Data<RateLimiter>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return Err(AppError::Validation(
            "Too many failed login attempts. Please try again later.".to_string(),
        ));
    }

    let conn = pool.get()?;
    let principal = match auth_session::authenticate(&conn, &form.email, &form.password) {
        Ok(p) => {
            limiter.clear(ip);
            p
        }
        Err(e) => {
            limiter.record_failure(ip);
            return Err(e);
        }
    };

    let token = auth_session::issue(&conn, principal.id, config.session_ttl)?;
    session.renew();
    let _ = session.insert(auth_session::TOKEN_KEY, &token);

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "auth.login",
        "principal",
        principal.id,
        serde_json::json!({ "role": principal.role.as_str() }),
    );

    Ok(ok_json(PrincipalDisplay::from(&principal)))
}

/// POST /auth/logout — revoke the session server-side and drop the cookie.
/// Visible immediately to any concurrent `resolve` call.
pub async fn logout(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    if let Ok(Some(token)) = session.get::<String>(auth_session::TOKEN_KEY) {
        auth_session::revoke(&conn, &token)?;
    }
    session.purge();
    Ok(ok_json(serde_json::json!({ "message": "Logged out" })))
}

/// POST /auth/change-password — verify the current password, store the new
/// hash, and (per the configured policy) revoke the principal's other
/// sessions.
pub async fn change_password(
    pool: web::Data<DbPool>,
    session: Session,
    config: web::Data<Config>,
    form: web::Json<ChangePasswordForm>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let principal = auth_session::require_principal(&conn, &session)?;
    let token = session
        .get::<String>(auth_session::TOKEN_KEY)
        .unwrap_or(None)
        .ok_or(AppError::Unauthenticated)?;

    auth_session::change_password(
        &conn,
        &principal,
        &token,
        &form.current_password,
        &form.new_password,
        config.invalidate_sessions_on_password_change,
    )?;

    let _ = crate::audit::log(
        &conn,
        principal.id,
        "auth.password_changed",
        "principal",
        principal.id,
        serde_json::json!({}),
    );

    Ok(ok_json(serde_json::json!({ "message": "Password changed" })))
}
