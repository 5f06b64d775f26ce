use crate::{
    database::{MongoDB, WORKOUTS},
    models::{parse_object_id, CreateWorkoutRequest, UpdateWorkoutRequest, Workout},
    utils::AppError,
};
use chrono::Utc;
use futures::stream::StreamExt;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;
use mongodb::Collection;

const WORKOUT_NOT_FOUND: &str = "Séance introuvable";

fn collection(db: &MongoDB) -> Collection<Workout> {
    db.collection::<Workout>(WORKOUTS)
}

/// Most recent first.
pub async fn list_workouts(db: &MongoDB) -> Result<Vec<Workout>, AppError> {
    let mut cursor = collection(db)
        .find(doc! {})
        .sort(doc! { "date": -1, "_id": -1 })
        .await?;

    let mut workouts = Vec::new();
    while let Some(result) = cursor.next().await {
        workouts.push(result?);
    }

    Ok(workouts)
}

pub async fn get_workout(db: &MongoDB, id: &str) -> Result<Workout, AppError> {
    let object_id = parse_object_id(id)?;

    collection(db)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.to_string()))
}

pub async fn create_workout(db: &MongoDB, request: CreateWorkoutRequest) -> Result<Workout, AppError> {
    let mut workout = request.into_workout(Utc::now())?;

    let result = collection(db).insert_one(&workout).await?;
    workout.id = Some(
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Internal("Inserted id is not an ObjectId".to_string()))?,
    );

    log::info!("🏋️  Workout created: {} ({} min)", workout.name, workout.duration);
    Ok(workout)
}

pub async fn update_workout(
    db: &MongoDB,
    id: &str,
    request: UpdateWorkoutRequest,
) -> Result<Workout, AppError> {
    let object_id = parse_object_id(id)?;
    let update_doc = request.into_update_doc(Utc::now())?;

    collection(db)
        .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": update_doc })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound(WORKOUT_NOT_FOUND.to_string()))
}

/// Referenced exercises are left untouched.
pub async fn delete_workout(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id)?;

    let result = collection(db).delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(WORKOUT_NOT_FOUND.to_string()));
    }

    log::info!("🗑️  Workout deleted: {}", id);
    Ok(())
}
