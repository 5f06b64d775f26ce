use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

/// Body returned for every failure the client is not allowed to see.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne serveur";
/// Body returned by the catch-all route.
pub const UNKNOWN_ROUTE_MESSAGE: &str = "Route inconnue";

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidId(String),
    NotFound(String),
    Conflict(String),
    Connection(String),
    Database(String),
    Internal(String),
    Config(String),
}

impl AppError {
    /// Errors whose detail stays in the server log.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Connection(_) | AppError::Database(_) | AppError::Internal(_) | AppError::Config(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::InvalidId(id) => write!(f, "Invalid id: {}", id),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::Connection(msg) => write!(f, "{}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InvalidId(_) => "Identifiant invalide".to_string(),
            e if e.is_internal() => {
                log::error!("❌ Server error: {}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            e => e.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match *err.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
                AppError::Connection(err.to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Task join error: {}", err))
    }
}
