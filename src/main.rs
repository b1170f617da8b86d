use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use mentorlink::auth::middleware::{require_auth, require_json_content_type};
use mentorlink::auth::rate_limit::RateLimiter;
use mentorlink::config::Config;
use mentorlink::handlers::{
    admin_handlers, auth_handlers, faculty_handlers, hod_handlers, meeting_handlers,
    student_handlers,
};
use mentorlink::notify::{LogNotifier, Notifier};
use mentorlink::{audit, auth, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // Ensure the data directory exists for the default database path
    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }

    // Initialize database
    let pool = db::init_pool(&config.database_path);
    db::run_migrations(&pool);

    // Seed the bootstrap admin if the store is empty
    let admin_hash = auth::password::hash_password(
        &std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
    )
    .expect("Failed to hash bootstrap admin password");
    db::seed_admin(&pool, &config.admin_email, &admin_hash);

    // Startup housekeeping: expired sessions and old audit entries
    {
        let conn = pool.get().expect("Failed to get connection for startup cleanup");
        match auth::session::purge_expired(&conn) {
            Ok(0) => {}
            Ok(n) => log::info!("Purged {n} expired session(s)"),
            Err(e) => log::warn!("Session purge failed: {e}"),
        }
        audit::cleanup_old_entries(&conn);
    }

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let limiter = RateLimiter::new();
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    log::info!("Starting server at http://{}", config.bind_addr);
    let bind_addr = config.bind_addr.clone();

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .app_data(web::Data::from(notifier.clone()))
            // Public routes
            .route("/auth/login", web::post().to(auth_handlers::login))
            // Protected scopes
            .service(
                web::scope("/auth")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/logout", web::post().to(auth_handlers::logout))
                    .route("/change-password", web::post().to(auth_handlers::change_password)),
            )
            .service(
                web::scope("/student")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/profile", web::get().to(student_handlers::profile))
                    .route("/profile", web::put().to(student_handlers::update_profile))
                    .route("/mentor", web::get().to(student_handlers::mentor))
                    .route("/meetings", web::get().to(meeting_handlers::list))
                    .route("/semesters", web::get().to(student_handlers::semesters))
                    .route("/internships", web::get().to(student_handlers::internships))
                    .route("/internships", web::post().to(student_handlers::add_internship))
                    .route("/internships/{id}", web::put().to(student_handlers::update_internship))
                    .route("/internships/{id}", web::delete().to(student_handlers::delete_internship))
                    .route("/projects", web::get().to(student_handlers::projects))
                    .route("/projects", web::post().to(student_handlers::add_project))
                    .route("/projects/{id}", web::put().to(student_handlers::update_project))
                    .route("/projects/{id}", web::delete().to(student_handlers::delete_project))
                    .route("/cocurriculars", web::get().to(student_handlers::cocurriculars))
                    .route("/cocurriculars", web::post().to(student_handlers::add_cocurricular))
                    .route("/cocurriculars/{id}", web::delete().to(student_handlers::delete_cocurricular))
                    .route("/career-details", web::get().to(student_handlers::career_details))
                    .route("/career-details", web::put().to(student_handlers::save_career_details))
                    .route("/personal-problems", web::get().to(student_handlers::personal_problems))
                    .route("/personal-problems", web::put().to(student_handlers::save_personal_problems))
                    .route("/requests", web::get().to(student_handlers::list_requests))
                    .route("/requests", web::post().to(student_handlers::create_request))
                    .route("/messages", web::get().to(student_handlers::messages)),
            )
            .service(
                web::scope("/faculty")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/profile", web::get().to(faculty_handlers::profile))
                    .route("/profile", web::put().to(faculty_handlers::update_profile))
                    .route("/mentees", web::get().to(faculty_handlers::mentees))
                    .route("/mentees/{id}", web::get().to(faculty_handlers::mentee))
                    .route("/mentees/{id}", web::put().to(faculty_handlers::update_mentee))
                    .route("/mentees/{id}/record", web::get().to(faculty_handlers::mentee_record))
                    .route("/mentees/{id}/semesters", web::post().to(faculty_handlers::upsert_semester))
                    .route("/semesters/{id}/subjects", web::post().to(faculty_handlers::add_subject))
                    .route("/meeting/new", web::post().to(meeting_handlers::create_for_faculty))
                    .route("/meetings", web::get().to(meeting_handlers::list))
                    .route("/meetings/{id}/cancel", web::post().to(meeting_handlers::cancel))
                    .route("/meetings/{id}/complete", web::post().to(meeting_handlers::complete))
                    .route("/requests", web::get().to(faculty_handlers::requests))
                    .route("/requests", web::post().to(faculty_handlers::create_request))
                    .route("/requests/{id}/decide", web::post().to(faculty_handlers::decide_request))
                    .route("/messages", web::get().to(faculty_handlers::messages))
                    .route("/messages", web::post().to(faculty_handlers::send_message)),
            )
            .service(
                web::scope("/hod")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/students", web::get().to(hod_handlers::students))
                    .route("/students", web::post().to(hod_handlers::create_student))
                    .route("/students/{id}", web::get().to(hod_handlers::student_detail))
                    .route("/students/{id}", web::put().to(hod_handlers::update_student))
                    .route("/faculty", web::get().to(hod_handlers::faculty_list))
                    .route("/faculty/{id}", web::get().to(hod_handlers::faculty_detail))
                    .route("/faculty/{id}", web::put().to(hod_handlers::update_faculty))
                    .route("/mentorships", web::post().to(hod_handlers::assign_mentorship))
                    .route("/mentorships/{student_id}", web::delete().to(hod_handlers::remove_mentorship))
                    .route("/meeting/new", web::post().to(meeting_handlers::create_for_hod))
                    .route("/meetings", web::get().to(meeting_handlers::list))
                    .route("/meetings/{id}/cancel", web::post().to(meeting_handlers::cancel))
                    .route("/meetings/{id}/complete", web::post().to(meeting_handlers::complete))
                    .route("/requests", web::get().to(hod_handlers::requests))
                    .route("/requests/{id}/decide", web::post().to(hod_handlers::decide_request)),
            )
            .service(
                web::scope("/admin")
                    .wrap(actix_web::middleware::from_fn(require_auth))
                    .route("/students", web::get().to(admin_handlers::students))
                    .route("/students", web::post().to(admin_handlers::create_student))
                    .route("/students/{id}", web::get().to(admin_handlers::student_detail))
                    .route("/students/{id}", web::put().to(admin_handlers::update_student))
                    .route("/faculty", web::get().to(admin_handlers::faculty_list))
                    .route("/faculty", web::post().to(admin_handlers::create_faculty))
                    .route("/faculty/{id}", web::get().to(admin_handlers::faculty_detail))
                    .route("/faculty/{id}", web::put().to(admin_handlers::update_faculty))
                    .route("/principals", web::post().to(admin_handlers::create_principal))
                    .route("/hods", web::post().to(admin_handlers::appoint_hod))
                    .route("/meetings", web::get().to(meeting_handlers::list))
                    .route("/requests", web::get().to(admin_handlers::requests))
                    .route("/requests/{id}/decide", web::post().to(admin_handlers::decide_request))
                    .route("/audit", web::get().to(admin_handlers::audit_trail)),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound().json(serde_json::json!({
                    "success": false,
                    "error": "Not found"
                }))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
