use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::{
    CreateUserRequest, UpdateLastLoginRequest, UpdatePasswordRequest, UpdateUserRequest,
    UserResponse,
};
use crate::services::user_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = [UserResponse])
    )
)]
pub async fn list_users(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let users = user_service::list_users(&db).await?;

    Ok(HttpResponse::Ok().json(
        users.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::get_user(&db, &path).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already used")
    )
)]
pub async fn create_user(
    db: web::Data<MongoDB>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::create_user(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already used")
    )
)]
pub async fn update_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::update_user(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}/password",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = UserResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_password(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::update_password(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// The body is optional; without one the last login is set to now.
#[utoipa::path(
    put,
    path = "/users/{id}/last-login",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body(content = UpdateLastLoginRequest, description = "Optional"),
    responses(
        (status = 200, description = "Last login recorded", body = UserResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_last_login(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let last_login = UpdateLastLoginRequest::from_body(&body)?.last_login;
    let user = user_service::update_last_login(&db, &path, last_login).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}/workouts-completed",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "Counter incremented", body = UserResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn increment_workouts_completed(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = user_service::increment_workouts_completed(&db, &path).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    user_service::delete_user(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Utilisateur supprimé"
    })))
}
