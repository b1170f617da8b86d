use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// Middleware for protected scopes: rejects requests without a session token
/// with 401 JSON. Full token resolution (expiry, revocation) happens in the
/// handlers via `auth::session::require_principal`.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let has_token = session
        .get::<String>(crate::auth::session::TOKEN_KEY)
        .unwrap_or(None)
        .is_some();

    if !has_token {
        let body = serde_json::json!({ "success": false, "error": "Not authenticated" });
        let response = HttpResponse::Unauthorized().json(body);
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// CSRF protection for the JSON mutation endpoints.
///
/// Rejects POST/PUT/DELETE requests that don't have Content-Type:
/// application/json. Browsers cannot send cross-origin JSON with cookies via
/// simple form POST, so the Content-Type check acts as a CSRF guard without
/// requiring tokens. GET requests are exempt.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "success": false,
                "error": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
