use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

use crate::utils::{bson_to_iso, chrono_to_bson, deserialize_optional_date, AppError};

/// Workout document (collection: workouts)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub duration: f64,
    pub date: BsonDateTime,
    /// Exercise ids. Not owned: deleting a workout leaves them alone and
    /// a missing exercise is not an error.
    #[serde(default)]
    pub exercises: Vec<ObjectId>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Request to create a workout
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateWorkoutRequest {
    #[schema(example = "Leg day")]
    pub name: Option<String>,
    /// Duration in minutes
    #[schema(example = 45)]
    pub duration: Option<f64>,
    /// Defaults to the creation time. RFC 3339, `YYYY-MM-DD` or epoch millis.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// Request to update a workout; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateWorkoutRequest {
    pub name: Option<String>,
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
    pub exercises: Option<Vec<String>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub duration: f64,
    pub date: String,
    pub exercises: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Workout> for WorkoutResponse {
    fn from(workout: Workout) -> Self {
        WorkoutResponse {
            id: workout.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: workout.name,
            duration: workout.duration,
            date: bson_to_iso(workout.date),
            exercises: workout.exercises.iter().map(|id| id.to_hex()).collect(),
            created_at: bson_to_iso(workout.created_at),
            updated_at: bson_to_iso(workout.updated_at),
        }
    }
}

impl CreateWorkoutRequest {
    /// Checks required fields and builds the document to insert.
    pub fn into_workout(self, now: DateTime<Utc>) -> Result<Workout, AppError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push("name: Path `name` is required.".to_string());
                None
            }
        };

        let duration = match self.duration {
            Some(duration) => match check_duration(duration) {
                Ok(()) => Some(duration),
                Err(msg) => {
                    errors.push(msg);
                    None
                }
            },
            None => {
                errors.push("duration: Path `duration` is required.".to_string());
                None
            }
        };

        let exercises = match parse_exercise_ids(&self.exercises) {
            Ok(ids) => ids,
            Err(msg) => {
                errors.push(msg);
                Vec::new()
            }
        };

        match (name, duration) {
            (Some(name), Some(duration)) if errors.is_empty() => {
                let now = chrono_to_bson(now);
                Ok(Workout {
                    id: None,
                    name,
                    duration,
                    date: self.date.map(chrono_to_bson).unwrap_or(now),
                    exercises,
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(validation_failed(&errors)),
        }
    }
}

impl UpdateWorkoutRequest {
    /// Builds the `$set` document, always touching `updatedAt`.
    pub fn into_update_doc(self, now: DateTime<Utc>) -> Result<Document, AppError> {
        let mut errors = Vec::new();
        let mut update_doc = doc! { "updatedAt": chrono_to_bson(now) };

        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                errors.push("name: Path `name` is required.".to_string());
            } else {
                update_doc.insert("name", name);
            }
        }
        if let Some(duration) = self.duration {
            match check_duration(duration) {
                Ok(()) => {
                    update_doc.insert("duration", duration);
                }
                Err(msg) => errors.push(msg),
            }
        }
        if let Some(date) = self.date {
            update_doc.insert("date", chrono_to_bson(date));
        }
        if let Some(exercises) = self.exercises {
            match parse_exercise_ids(&exercises) {
                Ok(ids) => {
                    update_doc.insert("exercises", ids);
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

fn check_duration(duration: f64) -> Result<(), String> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(())
    } else {
        Err(format!("duration: Path `duration` ({}) must be a non-negative number.", duration))
    }
}

fn parse_exercise_ids(raw: &[String]) -> Result<Vec<ObjectId>, String> {
    raw.iter()
        .map(|id| {
            ObjectId::parse_str(id)
                .map_err(|_| format!("exercises: Cast to ObjectId failed for value \"{}\".", id))
        })
        .collect()
}

fn validation_failed(errors: &[String]) -> AppError {
    AppError::Validation(format!("Workout validation failed: {}", errors.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_requires_name() {
        let request = CreateWorkoutRequest {
            duration: Some(30.0),
            ..Default::default()
        };
        let msg = validation_message(request.into_workout(now()).unwrap_err());
        assert!(msg.contains("`name` is required"));
        assert!(!msg.contains("`duration` is required"));
    }

    #[test]
    fn test_create_requires_duration() {
        let request = CreateWorkoutRequest {
            name: Some("Push".into()),
            ..Default::default()
        };
        let msg = validation_message(request.into_workout(now()).unwrap_err());
        assert!(msg.contains("`duration` is required"));
    }

    #[test]
    fn test_blank_name_is_missing() {
        let request = CreateWorkoutRequest {
            name: Some("   ".into()),
            duration: Some(10.0),
            ..Default::default()
        };
        assert!(request.into_workout(now()).is_err());
    }

    #[test]
    fn test_reports_every_missing_field() {
        let msg = validation_message(CreateWorkoutRequest::default().into_workout(now()).unwrap_err());
        assert!(msg.starts_with("Workout validation failed"));
        assert!(msg.contains("`name` is required"));
        assert!(msg.contains("`duration` is required"));
    }

    #[test]
    fn test_date_defaults_to_creation_time() {
        let request = CreateWorkoutRequest {
            name: Some("Run".into()),
            duration: Some(25.5),
            ..Default::default()
        };
        let workout = request.into_workout(now()).unwrap();
        assert_eq!(workout.date, chrono_to_bson(now()));
        assert_eq!(workout.created_at, workout.updated_at);
        assert!(workout.id.is_none());
        assert!(workout.exercises.is_empty());
    }

    #[test]
    fn test_explicit_date_and_exercises_are_kept_in_order() {
        let date = Utc.with_ymd_and_hms(2024, 4, 28, 7, 30, 0).unwrap();
        let first = ObjectId::new();
        let second = ObjectId::new();
        let request = CreateWorkoutRequest {
            name: Some("Pull".into()),
            duration: Some(50.0),
            date: Some(date),
            exercises: vec![second.to_hex(), first.to_hex()],
        };
        let workout = request.into_workout(now()).unwrap();
        assert_eq!(workout.date, chrono_to_bson(date));
        assert_eq!(workout.exercises, vec![second, first]);
    }

    #[test]
    fn test_malformed_exercise_id_is_rejected() {
        let request = CreateWorkoutRequest {
            name: Some("Pull".into()),
            duration: Some(50.0),
            exercises: vec!["not-an-id".into()],
            ..Default::default()
        };
        let msg = validation_message(request.into_workout(now()).unwrap_err());
        assert!(msg.contains("not-an-id"));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let request = CreateWorkoutRequest {
            name: Some("Swim".into()),
            duration: Some(-5.0),
            ..Default::default()
        };
        assert!(request.into_workout(now()).is_err());
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let request: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "name": "Cardio",
            "duration": 20,
            "date": "2024-04-30T18:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(request.duration, Some(20.0));
        assert!(request.date.is_some());
        assert!(request.exercises.is_empty());
    }

    #[test]
    fn test_date_only_string_is_midnight_utc() {
        let request: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "name": "Cardio",
            "duration": 20,
            "date": "2024-05-01"
        }))
        .unwrap();
        assert_eq!(request.date, Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()));

        let err = serde_json::from_value::<UpdateWorkoutRequest>(serde_json::json!({
            "date": "next tuesday"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_update_doc_only_sets_present_fields() {
        let update = UpdateWorkoutRequest {
            duration: Some(60.0),
            ..Default::default()
        };
        let update_doc = update.into_update_doc(now()).unwrap();
        assert_eq!(update_doc.get_f64("duration").unwrap(), 60.0);
        assert!(update_doc.contains_key("updatedAt"));
        assert!(!update_doc.contains_key("name"));
        assert!(!update_doc.contains_key("exercises"));
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let update = UpdateWorkoutRequest {
            name: Some("".into()),
            ..Default::default()
        };
        assert!(matches!(update.into_update_doc(now()), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_response_uses_hex_ids_and_iso_dates() {
        let exercise = ObjectId::new();
        let workout = CreateWorkoutRequest {
            name: Some("Run".into()),
            duration: Some(30.0),
            exercises: vec![exercise.to_hex()],
            ..Default::default()
        }
        .into_workout(now())
        .unwrap();
        let id = ObjectId::new();
        let response = WorkoutResponse::from(Workout { id: Some(id), ..workout });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["date"], "2024-05-01T10:00:00.000Z");
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(json["exercises"][0], exercise.to_hex());
    }
}
