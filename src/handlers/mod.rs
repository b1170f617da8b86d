pub mod admin_handlers;
pub mod auth_handlers;
pub mod faculty_handlers;
pub mod hod_handlers;
pub mod meeting_handlers;
pub mod student_handlers;

use actix_web::HttpResponse;
use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}`.
pub fn ok_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data }))
}

pub fn created_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(serde_json::json!({ "success": true, "data": data }))
}
