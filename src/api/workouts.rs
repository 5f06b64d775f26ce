use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutResponse};
use crate::services::workout_service;
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/workouts",
    tag = "Workouts",
    responses(
        (status = 200, description = "All workouts, most recent first", body = [WorkoutResponse])
    )
)]
pub async fn list_workouts(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let workouts = workout_service::list_workouts(&db).await?;

    Ok(HttpResponse::Ok().json(
        workouts.into_iter().map(WorkoutResponse::from).collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/workouts/{id}",
    tag = "Workouts",
    params(("id" = String, Path, description = "Workout ObjectId")),
    responses(
        (status = 200, description = "Workout found", body = WorkoutResponse),
        (status = 404, description = "No such workout")
    )
)]
pub async fn get_workout(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let workout = workout_service::get_workout(&db, &path).await?;
    Ok(HttpResponse::Ok().json(WorkoutResponse::from(workout)))
}

#[utoipa::path(
    post,
    path = "/workouts",
    tag = "Workouts",
    request_body = CreateWorkoutRequest,
    responses(
        (status = 201, description = "Workout created", body = WorkoutResponse),
        (status = 400, description = "Missing name or duration")
    )
)]
pub async fn create_workout(
    db: web::Data<MongoDB>,
    body: web::Json<CreateWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    let workout = workout_service::create_workout(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(WorkoutResponse::from(workout)))
}

#[utoipa::path(
    put,
    path = "/workouts/{id}",
    tag = "Workouts",
    params(("id" = String, Path, description = "Workout ObjectId")),
    request_body = UpdateWorkoutRequest,
    responses(
        (status = 200, description = "Workout updated", body = WorkoutResponse),
        (status = 404, description = "No such workout")
    )
)]
pub async fn update_workout(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<UpdateWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    let workout = workout_service::update_workout(&db, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(WorkoutResponse::from(workout)))
}

#[utoipa::path(
    delete,
    path = "/workouts/{id}",
    tag = "Workouts",
    params(("id" = String, Path, description = "Workout ObjectId")),
    responses(
        (status = 200, description = "Workout deleted"),
        (status = 404, description = "No such workout")
    )
)]
pub async fn delete_workout(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    workout_service::delete_workout(&db, &path).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Séance supprimée"
    })))
}
