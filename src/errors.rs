use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    Pool(r2d2::Error),
    Hash(String),
    /// No session, or the token is expired/unknown.
    Unauthenticated,
    /// Bad email/password pair. The response message never reveals which.
    InvalidCredentials,
    /// Authenticated, but the resource lies outside the principal's scope.
    Forbidden(String),
    NotFound,
    Validation(String),
    /// A meeting participant does not resolve to a student in the creator's scope.
    InvalidParticipant(String),
    /// Attempted transition out of a completed/cancelled/decided state.
    AlreadyTerminal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Pool(e) => write!(f, "Pool error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Unauthenticated => write!(f, "Not authenticated"),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::Forbidden(what) => write!(f, "Forbidden: {what}"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Validation(e) => write!(f, "Validation failed: {e}"),
            AppError::InvalidParticipant(e) => write!(f, "Invalid participant: {e}"),
            AppError::AlreadyTerminal(e) => write!(f, "Already terminal: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidParticipant(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyTerminal(_) => StatusCode::CONFLICT,
            AppError::Db(_) | AppError::Pool(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Backend failures are logged in full but reported generically.
            AppError::Db(_) | AppError::Pool(_) | AppError::Hash(_) => {
                log::error!("{self}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "success": false, "error": message }))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Pool(e)
    }
}
