use crate::{
    database::{MongoDB, USERS},
    models::{
        parse_object_id, CreateUserRequest, UpdatePasswordRequest, UpdateUserRequest, User,
    },
    utils::{chrono_to_bson, AppError},
};
use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

const USER_NOT_FOUND: &str = "Utilisateur introuvable";
const EMAIL_TAKEN: &str = "Cet email est déjà utilisé";

fn collection(db: &MongoDB) -> Collection<User> {
    db.collection::<User>(USERS)
}

pub async fn list_users(db: &MongoDB) -> Result<Vec<User>, AppError> {
    let mut cursor = collection(db).find(doc! {}).await?;

    let mut users = Vec::new();
    while let Some(result) = cursor.next().await {
        users.push(result?);
    }

    Ok(users)
}

pub async fn get_user(db: &MongoDB, id: &str) -> Result<User, AppError> {
    let object_id = parse_object_id(id)?;

    collection(db)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

pub async fn create_user(db: &MongoDB, request: CreateUserRequest) -> Result<User, AppError> {
    let new_user = request.validate()?;
    ensure_email_available(db, &new_user.email, None).await?;

    let password_hash = hash_password(new_user.password.clone()).await?;
    let mut user = new_user.into_user(password_hash, Utc::now());

    let result = collection(db)
        .insert_one(&user)
        .await
        .map_err(duplicate_email_or)?;

    user.id = Some(
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Internal("Inserted id is not an ObjectId".to_string()))?,
    );

    log::info!("✅ User created: {}", user.email);
    Ok(user)
}

pub async fn update_user(db: &MongoDB, id: &str, request: UpdateUserRequest) -> Result<User, AppError> {
    let object_id = parse_object_id(id)?;
    let update_doc = request.into_update_doc(Utc::now())?;

    if let Ok(email) = update_doc.get_str("email") {
        ensure_email_available(db, email, Some(object_id)).await?;
    }

    set_fields(db, object_id, update_doc).await
}

pub async fn update_password(
    db: &MongoDB,
    id: &str,
    request: UpdatePasswordRequest,
) -> Result<User, AppError> {
    let object_id = parse_object_id(id)?;
    let password = request.validate()?;
    let password_hash = hash_password(password).await?;

    let user = set_fields(
        db,
        object_id,
        doc! { "password": password_hash, "updatedAt": chrono_to_bson(Utc::now()) },
    )
    .await?;

    log::info!("🔑 Password updated for user {}", id);
    Ok(user)
}

pub async fn update_last_login(
    db: &MongoDB,
    id: &str,
    last_login: Option<DateTime<Utc>>,
) -> Result<User, AppError> {
    let object_id = parse_object_id(id)?;
    let now = Utc::now();

    set_fields(
        db,
        object_id,
        doc! {
            "lastLogin": chrono_to_bson(last_login.unwrap_or(now)),
            "updatedAt": chrono_to_bson(now),
        },
    )
    .await
}

/// Server-side `$inc`, so concurrent calls never lose an update.
pub async fn increment_workouts_completed(db: &MongoDB, id: &str) -> Result<User, AppError> {
    let object_id = parse_object_id(id)?;

    collection(db)
        .find_one_and_update(
            doc! { "_id": object_id },
            doc! {
                "$inc": { "workoutsCompleted": 1_i64 },
                "$set": { "updatedAt": chrono_to_bson(Utc::now()) },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

pub async fn delete_user(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let object_id = parse_object_id(id)?;

    let result = collection(db).delete_one(doc! { "_id": object_id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    log::info!("🗑️  User deleted: {}", id);
    Ok(())
}

async fn set_fields(db: &MongoDB, object_id: ObjectId, fields: Document) -> Result<User, AppError> {
    collection(db)
        .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await
        .map_err(duplicate_email_or)?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

async fn ensure_email_available(
    db: &MongoDB,
    email: &str,
    except: Option<ObjectId>,
) -> Result<(), AppError> {
    let mut filter = doc! { "email": email };
    if let Some(id) = except {
        filter.insert("_id", doc! { "$ne": id });
    }

    match collection(db).find_one(filter).await? {
        Some(_) => Err(AppError::Conflict(EMAIL_TAKEN.to_string())),
        None => Ok(()),
    }
}

/// bcrypt is CPU bound, so it runs on the blocking pool.
async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST)).await??;
    Ok(hashed)
}

/// The unique email index can still fire when two creates race.
fn duplicate_email_or(err: mongodb::error::Error) -> AppError {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000 => {
            AppError::Conflict(EMAIL_TAKEN.to_string())
        }
        ErrorKind::Command(ref command_error) if command_error.code == 11000 => {
            AppError::Conflict(EMAIL_TAKEN.to_string())
        }
        _ => AppError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{live_db, unreachable_db};

    fn unique_request() -> CreateUserRequest {
        CreateUserRequest {
            username: Some("tester".into()),
            email: Some(format!("{}@example.com", ObjectId::new().to_hex())),
            password: Some("first-password".into()),
        }
    }

    #[tokio::test]
    async fn test_hash_password_verifies() {
        let hashed = hash_password("hunter2".to_string()).await.unwrap();
        assert_ne!(hashed, "hunter2");
        assert!(bcrypt::verify("hunter2", &hashed).unwrap());
    }

    #[tokio::test]
    async fn test_invalid_id_fails_before_any_query() {
        let db = unreachable_db().await;
        assert!(matches!(get_user(&db, "nope").await, Err(AppError::InvalidId(_))));
        assert!(matches!(
            increment_workouts_completed(&db, "nope").await,
            Err(AppError::InvalidId(_))
        ));
        assert!(matches!(delete_user(&db, "123").await, Err(AppError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_validation_fails_before_any_query() {
        let db = unreachable_db().await;
        let result = create_user(&db, CreateUserRequest::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_connection_error() {
        let db = unreachable_db().await;
        let result = list_users(&db).await;
        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_user_lifecycle() {
        let db = live_db().await;

        let user = create_user(&db, unique_request()).await.unwrap();
        let id = user.id.unwrap().to_hex();
        assert!(bcrypt::verify("first-password", &user.password).unwrap());

        let fetched = get_user(&db, &id).await.unwrap();
        assert_eq!(fetched.email, user.email);

        let updated = update_user(
            &db,
            &id,
            UpdateUserRequest { username: Some("renamed".into()), email: None },
        )
        .await
        .unwrap();
        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.email, user.email);

        let updated = update_password(
            &db,
            &id,
            UpdatePasswordRequest { password: Some("second-password".into()) },
        )
        .await
        .unwrap();
        assert!(bcrypt::verify("second-password", &updated.password).unwrap());

        let updated = update_last_login(&db, &id, None).await.unwrap();
        assert!(updated.last_login.is_some());

        increment_workouts_completed(&db, &id).await.unwrap();
        let updated = increment_workouts_completed(&db, &id).await.unwrap();
        assert_eq!(updated.workouts_completed, 2);

        delete_user(&db, &id).await.unwrap();
        assert!(matches!(get_user(&db, &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_user(&db, &id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_concurrent_increments_are_not_lost() {
        let db = live_db().await;
        let user = create_user(&db, unique_request()).await.unwrap();
        let id = user.id.unwrap().to_hex();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let db = db.clone();
                let id = id.clone();
                tokio::spawn(async move { increment_workouts_completed(&db, &id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(get_user(&db, &id).await.unwrap().workouts_completed, 10);
        delete_user(&db, &id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_email_is_a_conflict() {
        let db = live_db().await;
        let request = unique_request();
        let email = request.email.clone();

        let user = create_user(&db, request).await.unwrap();
        let duplicate = CreateUserRequest { email, ..unique_request() };
        assert!(matches!(create_user(&db, duplicate).await, Err(AppError::Conflict(_))));

        delete_user(&db, &user.id.unwrap().to_hex()).await.unwrap();
    }
}
