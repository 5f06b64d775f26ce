use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workout API",
        version = "1.0.0",
        description = "REST API for users and workouts stored in MongoDB.\n\nErrors are JSON objects of the form `{\"error\": \"...\"}`; unexpected failures always answer `Erreur interne serveur`."
    ),
    paths(
        // Health
        crate::api::health::status,
        crate::api::health::test_db,

        // Users
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::update_password,
        crate::api::users::update_last_login,
        crate::api::users::increment_workouts_completed,
        crate::api::users::delete_user,

        // Workouts
        crate::api::workouts::list_workouts,
        crate::api::workouts::get_workout,
        crate::api::workouts::create_workout,
        crate::api::workouts::update_workout,
        crate::api::workouts::delete_workout,
    ),
    components(
        schemas(
            crate::api::health::StatusResponse,
            crate::api::health::DatabaseStatusResponse,
            crate::models::CreateUserRequest,
            crate::models::UpdateUserRequest,
            crate::models::UpdatePasswordRequest,
            crate::models::UpdateLastLoginRequest,
            crate::models::UserResponse,
            crate::models::CreateWorkoutRequest,
            crate::models::UpdateWorkoutRequest,
            crate::models::WorkoutResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity checks."),
        (name = "Users", description = "User records: profile, password, last login and completed-workout counter."),
        (name = "Workouts", description = "Workout records referencing exercises by id."),
    )
)]
pub struct ApiDoc;
