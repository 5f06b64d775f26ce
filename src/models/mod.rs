pub mod user;
pub mod workout;

pub use user::*;
pub use workout::*;

use crate::utils::AppError;
use mongodb::bson::oid::ObjectId;

/// Parses a path id, rejecting anything that is not a 24-char hex ObjectId.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidId(id.to_string()))
}
