pub mod user_service;
pub mod workout_service;
