use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::{bson_to_iso, chrono_to_bson, deserialize_optional_date, AppError};

/// User document (collection: users)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never sent to clients
    pub password: String,
    #[serde(default)]
    pub last_login: Option<BsonDateTime>,
    #[serde(default)]
    pub workouts_completed: i64,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "marie")]
    pub username: Option<String>,
    #[schema(example = "marie@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile fields only; the password has its own route
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdatePasswordRequest {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLastLoginRequest {
    /// Defaults to now
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UpdateLastLoginRequest {
    /// The body is optional: an empty payload means "now", anything else
    /// must be valid JSON.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub last_login: Option<String>,
    pub workouts_completed: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username,
            email: user.email,
            last_login: user.last_login.map(bson_to_iso),
            workouts_completed: user.workouts_completed,
            created_at: bson_to_iso(user.created_at),
            updated_at: bson_to_iso(user.updated_at),
        }
    }
}

/// A create request that passed validation; the password is still plain text.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl NewUser {
    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        let now = chrono_to_bson(now);
        User {
            id: None,
            username: self.username,
            email: self.email,
            password: password_hash,
            last_login: None,
            workouts_completed: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let mut errors = Vec::new();

        let username = required(self.username, "username", &mut errors);
        let email = required(self.email, "email", &mut errors).map(|email| email.to_lowercase());
        if let Some(email) = &email {
            if let Err(msg) = check_email(email) {
                errors.push(msg);
            }
        }
        let password = match self.password {
            Some(password) if !password.is_empty() => Some(password),
            _ => {
                errors.push("password: Path `password` is required.".to_string());
                None
            }
        };

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(NewUser {
                username,
                email,
                password,
            }),
            _ => Err(validation_failed(&errors)),
        }
    }
}

impl UpdateUserRequest {
    pub fn into_update_doc(self, now: DateTime<Utc>) -> Result<Document, AppError> {
        let mut errors = Vec::new();
        let mut update_doc = doc! { "updatedAt": chrono_to_bson(now) };

        if let Some(username) = self.username {
            let username = username.trim();
            if username.is_empty() {
                errors.push("username: Path `username` is required.".to_string());
            } else {
                update_doc.insert("username", username);
            }
        }
        if let Some(email) = self.email {
            let email = email.trim().to_lowercase();
            match check_email(&email) {
                Ok(()) => {
                    update_doc.insert("email", email);
                }
                Err(msg) => errors.push(msg),
            }
        }

        if errors.is_empty() {
            Ok(update_doc)
        } else {
            Err(validation_failed(&errors))
        }
    }
}

impl UpdatePasswordRequest {
    pub fn validate(self) -> Result<String, AppError> {
        match self.password {
            Some(password) if !password.is_empty() => Ok(password),
            _ => Err(validation_failed(&["password: Path `password` is required.".to_string()])),
        }
    }
}

fn required(value: Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.push(format!("{}: Path `{}` is required.", field, field));
            None
        }
    }
}

fn check_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(format!("email: `{}` is not a valid email address.", email)),
    }
}

fn validation_failed(errors: &[String]) -> AppError {
    AppError::Validation(format!("User validation failed: {}", errors.join(", ")))
}
