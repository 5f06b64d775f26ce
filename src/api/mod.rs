pub mod health;
pub mod swagger;
pub mod users;
pub mod workouts;

use actix_web::{web, HttpResponse};

use crate::utils::{AppError, UNKNOWN_ROUTE_MESSAGE};

const JSON_LIMIT_BYTES: usize = 1024 * 1024;

/// Body parsing config, health endpoints and resource routers.
/// The catch-all is registered on the `App` with `default_service(not_found)`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Health
        .route("/api/status", web::get().to(health::status))
        .route("/api/test-db", web::get().to(health::test_db))
        // Users
        .service(
            web::scope("/users")
                .route("", web::get().to(users::list_users))
                .route("", web::post().to(users::create_user))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}", web::put().to(users::update_user))
                .route("/{id}", web::delete().to(users::delete_user))
                .route("/{id}/password", web::put().to(users::update_password))
                .route("/{id}/last-login", web::put().to(users::update_last_login))
                .route(
                    "/{id}/workouts-completed",
                    web::put().to(users::increment_workouts_completed),
                ),
        )
        // Workouts
        .service(
            web::scope("/workouts")
                .route("", web::get().to(workouts::list_workouts))
                .route("", web::post().to(workouts::create_workout))
                .route("/{id}", web::get().to(workouts::get_workout))
                .route("/{id}", web::put().to(workouts::update_workout))
                .route("/{id}", web::delete().to(workouts::delete_workout)),
        );
}

/// Malformed or mistyped JSON bodies become a 400 with the parser message.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": UNKNOWN_ROUTE_MESSAGE }))
}
